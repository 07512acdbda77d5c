use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::SkillStore;
use crate::models::analysis::ResumeAnalysis;
use crate::models::job_posting::{JobPostingRow, NewJobPosting};
use crate::models::skill::{SkillCategory, SkillDemand, SkillDemandSnapshot};

/// `job_skills.doc_type` discriminators.
const CATEGORY_DOC: &str = "category";
const STATISTICS_DOC: &str = "statistics";
/// The statistics document is a singleton; it always lives under this name.
const STATISTICS_NAME: &str = "current";

const POSTING_COLUMNS: &str =
    "id, url, title, company, location, description, source, query, skills, scraped_at";

/// PostgreSQL-backed store. Skill metadata lives in a JSONB document table keyed by
/// `(doc_type, name)`; postings and analyses get their own tables.
#[derive(Clone)]
pub struct PgSkillStore {
    pool: PgPool,
}

impl PgSkillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillStore for PgSkillStore {
    async fn list_categories(&self) -> Result<Vec<SkillCategory>> {
        let rows: Vec<Json<SkillCategory>> =
            sqlx::query_scalar("SELECT body FROM job_skills WHERE doc_type = $1 ORDER BY seq")
                .bind(CATEGORY_DOC)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|Json(c)| c).collect())
    }

    async fn upsert_category(&self, category: &SkillCategory) -> Result<()> {
        // `||` merges top-level keys, so annotations written by the statistics
        // updater are kept when the category is re-seeded.
        sqlx::query(
            r#"
            INSERT INTO job_skills (doc_type, name, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (doc_type, name)
            DO UPDATE SET body = job_skills.body || EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(CATEGORY_DOC)
        .bind(&category.name)
        .bind(Json(category))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_category_demand(
        &self,
        name: &str,
        skills_with_demand: &[SkillDemand],
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE job_skills
            SET body = jsonb_set(body, '{skills_with_demand}', $3), updated_at = now()
            WHERE doc_type = $1 AND name = $2
            "#,
        )
        .bind(CATEGORY_DOC)
        .bind(name)
        .bind(Json(skills_with_demand))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn posting_exists(&self, url: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM job_postings WHERE url = $1)")
                .bind(url)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert_posting(&self, posting: &NewJobPosting) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO job_postings
                (id, url, title, company, location, description, source, query, scraped_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (url) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&posting.url)
        .bind(&posting.title)
        .bind(&posting.company)
        .bind(&posting.location)
        .bind(&posting.description)
        .bind(&posting.source)
        .bind(&posting.query)
        .bind(posting.scraped_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn unprocessed_postings(&self) -> Result<Vec<JobPostingRow>> {
        Ok(sqlx::query_as::<_, JobPostingRow>(&format!(
            "SELECT {POSTING_COLUMNS} FROM job_postings WHERE skills IS NULL ORDER BY scraped_at"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_posting_skills(&self, id: Uuid, skills: &[String]) -> Result<()> {
        sqlx::query("UPDATE job_postings SET skills = $2 WHERE id = $1")
            .bind(id)
            .bind(skills)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn postings_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<JobPostingRow>> {
        Ok(sqlx::query_as::<_, JobPostingRow>(&format!(
            "SELECT {POSTING_COLUMNS} FROM job_postings WHERE scraped_at >= $1"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn recent_titles_matching(
        &self,
        skills: &[String],
        limit: usize,
    ) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar(
            r#"
            SELECT title FROM (
                SELECT title, MAX(scraped_at) AS latest
                FROM job_postings
                WHERE skills && $1
                GROUP BY title
            ) matched
            ORDER BY latest DESC
            LIMIT $2
            "#,
        )
        .bind(skills)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn prune_postings_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM job_postings WHERE scraped_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_postings(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM job_postings")
            .fetch_one(&self.pool)
            .await?)
    }

    async fn current_snapshot(&self) -> Result<Option<SkillDemandSnapshot>> {
        let row: Option<Json<SkillDemandSnapshot>> =
            sqlx::query_scalar("SELECT body FROM job_skills WHERE doc_type = $1 AND name = $2")
                .bind(STATISTICS_DOC)
                .bind(STATISTICS_NAME)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to load skill demand snapshot")?;
        Ok(row.map(|Json(s)| s))
    }

    async fn replace_snapshot(&self, snapshot: &SkillDemandSnapshot) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_skills (doc_type, name, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (doc_type, name)
            DO UPDATE SET body = EXCLUDED.body, updated_at = now()
            "#,
        )
        .bind(STATISTICS_DOC)
        .bind(STATISTICS_NAME)
        .bind(Json(snapshot))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_analysis(&self, analysis: &ResumeAnalysis) -> Result<()> {
        sqlx::query("INSERT INTO resume_analyses (resume_id, body) VALUES ($1, $2)")
            .bind(&analysis.resume_id)
            .bind(Json(analysis))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_analysis(&self, resume_id: &str) -> Result<Option<ResumeAnalysis>> {
        let row: Option<Json<ResumeAnalysis>> = sqlx::query_scalar(
            "SELECT body FROM resume_analyses WHERE resume_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(resume_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|Json(a)| a))
    }

    async fn recent_analyses(&self, limit: usize) -> Result<Vec<ResumeAnalysis>> {
        let rows: Vec<Json<ResumeAnalysis>> =
            sqlx::query_scalar("SELECT body FROM resume_analyses ORDER BY id DESC LIMIT $1")
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|Json(a)| a).collect())
    }
}
