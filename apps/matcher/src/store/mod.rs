//! Persistence boundary for postings, skill metadata and analysis results.
//!
//! Handlers and background tasks only see `Arc<dyn SkillStore>`; the backend is
//! chosen once at startup (`STORE_BACKEND`).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::analysis::ResumeAnalysis;
use crate::models::job_posting::{JobPostingRow, NewJobPosting};
use crate::models::skill::{SkillCategory, SkillDemand, SkillDemandSnapshot};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgSkillStore;

#[async_trait]
pub trait SkillStore: Send + Sync {
    /// All categories in insertion order.
    async fn list_categories(&self) -> Result<Vec<SkillCategory>>;

    /// Insert or update a category keyed by its name. Existing demand annotations survive.
    async fn upsert_category(&self, category: &SkillCategory) -> Result<()>;

    async fn set_category_demand(&self, name: &str, skills_with_demand: &[SkillDemand])
        -> Result<()>;

    async fn posting_exists(&self, url: &str) -> Result<bool>;

    /// Inserts the posting unless one with the same URL already exists.
    /// Returns `true` when a row was written.
    async fn insert_posting(&self, posting: &NewJobPosting) -> Result<bool>;

    /// Postings whose skills have not been extracted yet.
    async fn unprocessed_postings(&self) -> Result<Vec<JobPostingRow>>;

    async fn set_posting_skills(&self, id: Uuid, skills: &[String]) -> Result<()>;

    async fn postings_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<JobPostingRow>>;

    /// Distinct titles of postings sharing at least one skill with `skills`,
    /// most recently scraped first.
    async fn recent_titles_matching(&self, skills: &[String], limit: usize)
        -> Result<Vec<String>>;

    /// Deletes postings scraped before `cutoff`, returning how many were removed.
    async fn prune_postings_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    async fn count_postings(&self) -> Result<i64>;

    async fn current_snapshot(&self) -> Result<Option<SkillDemandSnapshot>>;

    /// Replaces the single current snapshot.
    async fn replace_snapshot(&self, snapshot: &SkillDemandSnapshot) -> Result<()>;

    async fn insert_analysis(&self, analysis: &ResumeAnalysis) -> Result<()>;

    /// Latest analysis recorded for `resume_id`.
    async fn find_analysis(&self, resume_id: &str) -> Result<Option<ResumeAnalysis>>;

    /// Most recent analyses first.
    async fn recent_analyses(&self, limit: usize) -> Result<Vec<ResumeAnalysis>>;
}
