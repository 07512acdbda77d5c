//! Recommendation Generator: deterministic, rule-based suggestions.

use std::collections::BTreeSet;

/// Below this many identified skills the resume is considered thin.
const FEW_SKILLS_THRESHOLD: usize = 5;
const MAX_NAMED_SKILLS: usize = 3;
const MAX_NAMED_TITLES: usize = 3;

pub const ADD_SKILLS_MESSAGE: &str =
    "Consider adding more specific technical skills to your resume.";
pub const QUANTIFY_MESSAGE: &str = "Quantify your achievements with metrics and specific outcomes.";
pub const TAILOR_MESSAGE: &str =
    "Tailor your resume to match the specific job descriptions you're applying for.";

/// Suggestions in fixed order:
/// 1. thin-resume nudge when fewer than 5 skills were identified
/// 2. the top 3 missing skills, in the order given
/// 3. up to 3 job titles whose postings share skills with the resume
/// 4. two generic closing suggestions, always present
pub fn recommend(
    identified: &BTreeSet<String>,
    missing: &[(String, f64)],
    matching_titles: &[String],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if identified.len() < FEW_SKILLS_THRESHOLD {
        recommendations.push(ADD_SKILLS_MESSAGE.to_string());
    }

    if !missing.is_empty() {
        let names: Vec<&str> = missing
            .iter()
            .take(MAX_NAMED_SKILLS)
            .map(|(skill, _)| skill.as_str())
            .collect();
        recommendations.push(format!(
            "Consider gaining experience with in-demand skills like {}.",
            names.join(", ")
        ));
    }

    if !matching_titles.is_empty() {
        let titles: Vec<&str> = matching_titles
            .iter()
            .take(MAX_NAMED_TITLES)
            .map(String::as_str)
            .collect();
        recommendations.push(format!(
            "Your skills match recent openings such as {}.",
            titles.join(", ")
        ));
    }

    recommendations.push(QUANTIFY_MESSAGE.to_string());
    recommendations.push(TAILOR_MESSAGE.to_string());
    recommendations
}
