use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingRow {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub source: String,
    pub query: String,
    /// `None` until skill extraction has run for this posting.
    pub skills: Option<Vec<String>>,
    pub scraped_at: DateTime<Utc>,
}

impl JobPostingRow {
    pub fn is_processed(&self) -> bool {
        self.skills.is_some()
    }

    pub fn extracted_skills(&self) -> &[String] {
        self.skills.as_deref().unwrap_or(&[])
    }
}

/// A posting as scraped, before it has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobPosting {
    pub url: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub source: String,
    pub query: String,
    pub scraped_at: DateTime<Utc>,
}

impl NewJobPosting {
    pub fn into_row(self) -> JobPostingRow {
        JobPostingRow {
            id: Uuid::new_v4(),
            url: self.url,
            title: self.title,
            company: self.company,
            location: self.location,
            description: self.description,
            source: self.source,
            query: self.query,
            skills: None,
            scraped_at: self.scraped_at,
        }
    }
}
