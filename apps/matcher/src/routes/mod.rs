pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::harvest::handlers as harvest;
use crate::skills::handlers as skills;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/analyze", post(analysis::handle_analyze))
        .route("/api/v1/analyses", get(analysis::handle_list_analyses))
        .route(
            "/api/v1/analyses/:resume_id",
            get(analysis::handle_get_analysis),
        )
        .route("/api/v1/harvest/run", post(harvest::handle_run_harvest))
        .route("/api/v1/skills/demand", get(skills::handle_skill_demand))
        .route(
            "/api/v1/skills/categories",
            get(skills::handle_skill_categories),
        )
        .with_state(state)
}
