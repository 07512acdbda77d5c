use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::analysis::document::TextExtractor;
use crate::analysis::service::AnalysisSettings;
use crate::harvest::pipeline::HarvestPipeline;
use crate::skills::extractor::SkillExtractor;
use crate::store::SkillStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SkillStore>,
    pub extractor: Arc<SkillExtractor>,
    /// Pluggable document reader. Default: StandardTextExtractor.
    pub text_extractor: Arc<dyn TextExtractor>,
    pub pipeline: Arc<HarvestPipeline>,
    pub analysis: AnalysisSettings,
    /// Cancelled on Ctrl-C; stops the scheduler and any in-flight harvest.
    pub shutdown: CancellationToken,
}
