//! Demand Calculator: scores identified skills against market demand and ranks the
//! high-demand skills a resume lacks.

use std::collections::BTreeSet;

use crate::models::skill::DemandTable;

/// Cold-start points awarded per identified skill when no demand data applies.
const COLD_START_POINTS_PER_SKILL: f64 = 10.0;
const MAX_SCORE: f64 = 100.0;

/// Match score in [0, 100].
///
/// Mean demand over the identified skills that have a demand entry. Falls back to
/// `min(|identified| * 10, 100)` when there is no demand data or none of the skills
/// appear in it.
pub fn score(identified: &BTreeSet<String>, demand: &DemandTable) -> f64 {
    if identified.is_empty() {
        return 0.0;
    }

    let known: Vec<f64> = identified
        .iter()
        .filter_map(|skill| demand.get(skill).copied())
        .collect();

    if known.is_empty() {
        return cold_start_score(identified.len());
    }

    let mean = known.iter().sum::<f64>() / known.len() as f64;
    mean.clamp(0.0, MAX_SCORE)
}

fn cold_start_score(identified: usize) -> f64 {
    (identified as f64 * COLD_START_POINTS_PER_SKILL).min(MAX_SCORE)
}

/// Skills with demand ≥ `min_demand` that are not in `identified`, highest demand first,
/// at most `limit` of them. Equal demands keep table order. Empty without demand data.
pub fn missing(
    identified: &BTreeSet<String>,
    demand: &DemandTable,
    min_demand: f64,
    limit: usize,
) -> Vec<(String, f64)> {
    let mut candidates: Vec<(String, f64)> = demand
        .iter()
        .filter(|(skill, &d)| d >= min_demand && !identified.contains(*skill))
        .map(|(skill, &d)| (skill.clone(), d))
        .collect();

    // sort_by is stable
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    candidates.truncate(limit);
    candidates
}
