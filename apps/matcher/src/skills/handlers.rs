use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::skill::{SkillCategory, SkillDemandSnapshot};
use crate::state::AppState;

/// GET /api/v1/skills/demand
pub async fn handle_skill_demand(
    State(state): State<AppState>,
) -> Result<Json<SkillDemandSnapshot>, AppError> {
    state
        .store
        .current_snapshot()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Skill statistics have not been computed yet".to_string()))
}

/// GET /api/v1/skills/categories
pub async fn handle_skill_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<SkillCategory>>, AppError> {
    Ok(Json(state.store.list_categories().await?))
}
