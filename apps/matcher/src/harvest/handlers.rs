use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HarvestRunResponse {
    pub status: &'static str,
    pub new_postings: usize,
    pub processed_postings: usize,
    pub statistics_updated: bool,
    pub pruned_postings: u64,
}

/// POST /api/v1/harvest/run
/// Runs one cycle synchronously, waiting behind any scheduled cycle in progress.
/// Board fetch failures are absorbed by the harvester; only store errors surface here.
pub async fn handle_run_harvest(
    State(state): State<AppState>,
) -> Result<Json<HarvestRunResponse>, AppError> {
    let report = state.pipeline.run_cycle(&state.shutdown).await?;

    Ok(Json(HarvestRunResponse {
        status: "success",
        new_postings: report.new_postings,
        processed_postings: report.processed_postings,
        statistics_updated: report.statistics_updated,
        pruned_postings: report.pruned_postings,
    }))
}
