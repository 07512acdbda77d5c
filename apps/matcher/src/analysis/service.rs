use anyhow::Result;
use tracing::{debug, info};

use crate::models::analysis::ResumeAnalysis;
use crate::skills::demand;
use crate::skills::extractor::SkillExtractor;
use crate::skills::recommend::recommend;
use crate::store::SkillStore;

const MAX_MATCHING_TITLES: usize = 3;

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    /// Minimum demand for a skill to be reported as missing.
    pub missing_threshold: f64,
    pub missing_limit: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            missing_threshold: 75.0,
            missing_limit: 5,
        }
    }
}

/// Runs the full pipeline over already-extracted resume text and records the result.
/// Either the whole analysis succeeds or an error is returned; nothing partial is stored.
pub async fn analyze_resume(
    resume_id: String,
    text: &str,
    extractor: &SkillExtractor,
    store: &dyn SkillStore,
    settings: &AnalysisSettings,
) -> Result<ResumeAnalysis> {
    let identified = extractor.extract(text);

    let demand_table = store
        .current_snapshot()
        .await?
        .map(|s| s.skill_demand)
        .unwrap_or_default();
    if demand_table.is_empty() {
        debug!("No skill demand data yet, scoring with the cold-start heuristic");
    }

    let match_score = demand::score(&identified, &demand_table);
    let missing_skills = demand::missing(
        &identified,
        &demand_table,
        settings.missing_threshold,
        settings.missing_limit,
    );

    let skills_identified: Vec<String> = identified.iter().cloned().collect();
    let matching_titles = if skills_identified.is_empty() {
        Vec::new()
    } else {
        store
            .recent_titles_matching(&skills_identified, MAX_MATCHING_TITLES)
            .await?
    };

    let recommendations = recommend(&identified, &missing_skills, &matching_titles);

    let analysis = ResumeAnalysis {
        resume_id,
        match_score,
        skills_identified,
        missing_skills,
        recommendations,
    };
    store.insert_analysis(&analysis).await?;

    info!(
        resume_id = %analysis.resume_id,
        score = analysis.match_score,
        skills = analysis.skills_identified.len(),
        "Resume analysis completed"
    );
    Ok(analysis)
}
