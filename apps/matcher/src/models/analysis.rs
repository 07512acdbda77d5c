use serde::{Deserialize, Serialize};

/// Outcome of one resume analysis. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub resume_id: String,
    pub match_score: f64,
    pub skills_identified: Vec<String>,
    /// `(skill, demand)` pairs, highest demand first. Serialized as 2-element arrays.
    pub missing_skills: Vec<(String, f64)>,
    pub recommendations: Vec<String>,
}
