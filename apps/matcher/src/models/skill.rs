use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Skill name → demand percentage in [0, 100].
///
/// Ordered so that ties in demand always resolve the same way.
pub type DemandTable = BTreeMap<String, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemand {
    pub name: String,
    pub demand: f64,
}

/// A named group of canonical skill names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub name: String,
    pub display_name: String,
    pub skills: Vec<String>,
    /// Display-only annotations written by the statistics updater, highest demand first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills_with_demand: Vec<SkillDemand>,
}

impl SkillCategory {
    pub fn new(name: &str, display_name: &str, skills: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            skills_with_demand: Vec::new(),
        }
    }
}

/// The single current materialized view of skill demand. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDemandSnapshot {
    pub generated_at: DateTime<Utc>,
    pub period_days: i64,
    pub total_jobs: i64,
    pub skill_demand: DemandTable,
}
