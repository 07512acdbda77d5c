use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::SkillStore;
use crate::models::analysis::ResumeAnalysis;
use crate::models::job_posting::{JobPostingRow, NewJobPosting};
use crate::models::skill::{SkillCategory, SkillDemand, SkillDemandSnapshot};

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    categories: Vec<SkillCategory>,
    postings: Vec<JobPostingRow>,
    snapshot: Option<SkillDemandSnapshot>,
    analyses: Vec<ResumeAnalysis>,
}

#[async_trait]
impl SkillStore for InMemoryStore {
    async fn list_categories(&self) -> Result<Vec<SkillCategory>> {
        Ok(self.inner.read().await.categories.clone())
    }

    async fn upsert_category(&self, category: &SkillCategory) -> Result<()> {
        let mut inner = self.inner.write().await;
        match inner
            .categories
            .iter_mut()
            .find(|c| c.name == category.name)
        {
            Some(existing) => {
                existing.display_name = category.display_name.clone();
                existing.skills = category.skills.clone();
                if !category.skills_with_demand.is_empty() {
                    existing.skills_with_demand = category.skills_with_demand.clone();
                }
            }
            None => inner.categories.push(category.clone()),
        }
        Ok(())
    }

    async fn set_category_demand(
        &self,
        name: &str,
        skills_with_demand: &[SkillDemand],
    ) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(category) = inner.categories.iter_mut().find(|c| c.name == name) {
            category.skills_with_demand = skills_with_demand.to_vec();
        }
        Ok(())
    }

    async fn posting_exists(&self, url: &str) -> Result<bool> {
        Ok(self.inner.read().await.postings.iter().any(|p| p.url == url))
    }

    async fn insert_posting(&self, posting: &NewJobPosting) -> Result<bool> {
        let mut inner = self.inner.write().await;
        if inner.postings.iter().any(|p| p.url == posting.url) {
            return Ok(false);
        }
        inner.postings.push(posting.clone().into_row());
        Ok(true)
    }

    async fn unprocessed_postings(&self) -> Result<Vec<JobPostingRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .postings
            .iter()
            .filter(|p| !p.is_processed())
            .cloned()
            .collect())
    }

    async fn set_posting_skills(&self, id: Uuid, skills: &[String]) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(posting) = inner.postings.iter_mut().find(|p| p.id == id) {
            posting.skills = Some(skills.to_vec());
        }
        Ok(())
    }

    async fn postings_since(&self, cutoff: DateTime<Utc>) -> Result<Vec<JobPostingRow>> {
        let inner = self.inner.read().await;
        Ok(inner
            .postings
            .iter()
            .filter(|p| p.scraped_at >= cutoff)
            .cloned()
            .collect())
    }

    async fn recent_titles_matching(
        &self,
        skills: &[String],
        limit: usize,
    ) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        let wanted: HashSet<&str> = skills.iter().map(String::as_str).collect();

        let mut matching: Vec<&JobPostingRow> = inner
            .postings
            .iter()
            .filter(|p| p.extracted_skills().iter().any(|s| wanted.contains(s.as_str())))
            .collect();
        matching.sort_by(|a, b| b.scraped_at.cmp(&a.scraped_at));

        let mut titles: Vec<String> = Vec::new();
        for posting in matching {
            if titles.len() == limit {
                break;
            }
            if !titles.contains(&posting.title) {
                titles.push(posting.title.clone());
            }
        }
        Ok(titles)
    }

    async fn prune_postings_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let before = inner.postings.len();
        inner.postings.retain(|p| p.scraped_at >= cutoff);
        Ok((before - inner.postings.len()) as u64)
    }

    async fn count_postings(&self) -> Result<i64> {
        Ok(self.inner.read().await.postings.len() as i64)
    }

    async fn current_snapshot(&self) -> Result<Option<SkillDemandSnapshot>> {
        Ok(self.inner.read().await.snapshot.clone())
    }

    async fn replace_snapshot(&self, snapshot: &SkillDemandSnapshot) -> Result<()> {
        self.inner.write().await.snapshot = Some(snapshot.clone());
        Ok(())
    }

    async fn insert_analysis(&self, analysis: &ResumeAnalysis) -> Result<()> {
        self.inner.write().await.analyses.push(analysis.clone());
        Ok(())
    }

    async fn find_analysis(&self, resume_id: &str) -> Result<Option<ResumeAnalysis>> {
        let inner = self.inner.read().await;
        Ok(inner
            .analyses
            .iter()
            .rev()
            .find(|a| a.resume_id == resume_id)
            .cloned())
    }

    async fn recent_analyses(&self, limit: usize) -> Result<Vec<ResumeAnalysis>> {
        let inner = self.inner.read().await;
        Ok(inner.analyses.iter().rev().take(limit).cloned().collect())
    }
}
