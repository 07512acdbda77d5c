//! Statistics Updater: turns recent postings into the skill demand snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::models::job_posting::JobPostingRow;
use crate::models::skill::{DemandTable, SkillDemand, SkillDemandSnapshot};
use crate::skills::catalog::SkillCatalog;
use crate::skills::extractor::SkillExtractor;
use crate::store::SkillStore;

pub struct StatisticsUpdater {
    store: Arc<dyn SkillStore>,
    catalog: Arc<SkillCatalog>,
    extractor: Arc<SkillExtractor>,
}

impl StatisticsUpdater {
    pub fn new(
        store: Arc<dyn SkillStore>,
        catalog: Arc<SkillCatalog>,
        extractor: Arc<SkillExtractor>,
    ) -> Self {
        Self {
            store,
            catalog,
            extractor,
        }
    }

    /// Extracts and attaches skills for every posting not processed yet. Postings with
    /// no description are marked processed with no skills.
    pub async fn process_unprocessed(&self) -> Result<usize> {
        let postings = self.store.unprocessed_postings().await?;
        for posting in &postings {
            let skills: Vec<String> = self.extractor.extract(&posting.description).into_iter().collect();
            self.store.set_posting_skills(posting.id, &skills).await?;
        }
        info!("Processed skills for {} postings", postings.len());
        Ok(postings.len())
    }

    /// Rebuilds the snapshot from postings scraped in the last `window_days` days.
    /// Returns `false`, leaving the current snapshot untouched, when the window is empty.
    pub async fn update(&self, window_days: i64) -> Result<bool> {
        let cutoff = days_before_now(window_days)?;
        let postings = self.store.postings_since(cutoff).await?;
        if postings.is_empty() {
            warn!("No recent postings found for skill statistics update");
            return Ok(false);
        }

        let skill_demand = compute_demand(&postings);
        let snapshot = SkillDemandSnapshot {
            generated_at: Utc::now(),
            period_days: window_days,
            total_jobs: postings.len() as i64,
            skill_demand,
        };
        self.store.replace_snapshot(&snapshot).await?;
        info!("Updated skill statistics based on {} postings", postings.len());

        self.refresh_categories(&snapshot.skill_demand).await?;
        Ok(true)
    }

    /// Deletes postings older than `retention_days`.
    pub async fn prune(&self, retention_days: i64) -> Result<u64> {
        let cutoff = days_before_now(retention_days)?;
        let removed = self.store.prune_postings_before(cutoff).await?;
        if removed > 0 {
            info!("Pruned {removed} postings older than {retention_days} days");
        }
        Ok(removed)
    }

    /// Annotates the deduplicated catalog view, so a skill listed by several stored
    /// categories is only ranked under the one that owns it.
    async fn refresh_categories(&self, demand: &DemandTable) -> Result<()> {
        for category in self.catalog.categories() {
            let annotated = annotate(&category.skills, demand);
            self.store
                .set_category_demand(&category.name, &annotated)
                .await?;
        }
        info!("Updated skill categories with demand scores");
        Ok(())
    }
}

fn days_before_now(days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .ok_or_else(|| anyhow!("{days} days is outside the supported date range"))
}

/// `min(100, occurrences / postings * 100)` per skill. Postings without extracted
/// skills still count toward the total.
pub fn compute_demand(postings: &[JobPostingRow]) -> DemandTable {
    if postings.is_empty() {
        return DemandTable::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for posting in postings {
        for skill in posting.extracted_skills() {
            *counts.entry(skill.as_str()).or_default() += 1;
        }
    }

    let total = postings.len() as f64;
    counts
        .into_iter()
        .map(|(skill, n)| (skill.to_string(), (n as f64 / total * 100.0).min(100.0)))
        .collect()
}

/// Each skill with its demand (0 when absent), highest first; ties keep catalog order.
fn annotate(skills: &[String], demand: &DemandTable) -> Vec<SkillDemand> {
    let mut annotated: Vec<SkillDemand> = skills
        .iter()
        .map(|name| SkillDemand {
            name: name.clone(),
            demand: demand.get(name).copied().unwrap_or(0.0),
        })
        .collect();
    annotated.sort_by(|a, b| b.demand.total_cmp(&a.demand));
    annotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use uuid::Uuid;

    use crate::models::job_posting::NewJobPosting;
    use crate::models::skill::SkillCategory;
    use crate::skills::catalog::{default_categories, SkillCatalog};
    use crate::store::InMemoryStore;

    fn row(skills: Option<Vec<&str>>) -> JobPostingRow {
        JobPostingRow {
            id: Uuid::new_v4(),
            url: format!("https://jobs.example/{}", Uuid::new_v4()),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: String::new(),
            source: "indeed".to_string(),
            query: "engineer".to_string(),
            skills: skills.map(|s| s.into_iter().map(String::from).collect()),
            scraped_at: Utc::now(),
        }
    }

    fn posting(n: u32, description: &str, scraped_at: DateTime<Utc>) -> NewJobPosting {
        NewJobPosting {
            url: format!("https://jobs.example/{n}"),
            title: format!("Job {n}"),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: description.to_string(),
            source: "indeed".to_string(),
            query: "engineer".to_string(),
            scraped_at,
        }
    }

    fn updater(store: Arc<InMemoryStore>) -> StatisticsUpdater {
        updater_with(store, default_categories())
    }

    fn updater_with(store: Arc<InMemoryStore>, categories: Vec<SkillCategory>) -> StatisticsUpdater {
        let catalog = Arc::new(SkillCatalog::new(categories));
        let extractor = Arc::new(SkillExtractor::new(catalog.clone()));
        StatisticsUpdater::new(store, catalog, extractor)
    }

    #[test]
    fn test_compute_demand_percentages() {
        let postings = vec![
            row(Some(vec!["Python", "AWS"])),
            row(Some(vec!["Python"])),
            row(None),
            row(Some(vec![])),
        ];
        let demand = compute_demand(&postings);
        assert_eq!(demand.len(), 2);
        assert_eq!(demand["Python"], 50.0);
        assert_eq!(demand["AWS"], 25.0);
    }

    #[test]
    fn test_compute_demand_empty() {
        assert!(compute_demand(&[]).is_empty());
    }

    #[test]
    fn test_annotate_sorts_descending_with_zero_default() {
        let demand: DemandTable = [("Go".to_string(), 10.0), ("Rust".to_string(), 60.0)]
            .into_iter()
            .collect();
        let skills = vec!["Python".to_string(), "Go".to_string(), "Rust".to_string()];
        let names: Vec<(String, f64)> = annotate(&skills, &demand)
            .into_iter()
            .map(|s| (s.name, s.demand))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Rust".to_string(), 60.0),
                ("Go".to_string(), 10.0),
                ("Python".to_string(), 0.0)
            ]
        );
    }

    #[tokio::test]
    async fn test_process_then_update_builds_snapshot() {
        let store = Arc::new(InMemoryStore::default());
        for category in default_categories() {
            store.upsert_category(&category).await.unwrap();
        }
        let now = Utc::now();
        store.insert_posting(&posting(1, "Python and AWS", now)).await.unwrap();
        store.insert_posting(&posting(2, "Python only", now)).await.unwrap();
        store.insert_posting(&posting(3, "", now)).await.unwrap();
        store
            .insert_posting(&posting(4, "Kubernetes", now - Duration::days(90)))
            .await
            .unwrap();

        let updater = updater(store.clone());
        assert_eq!(updater.process_unprocessed().await.unwrap(), 4);
        assert!(store.unprocessed_postings().await.unwrap().is_empty());
        assert_eq!(updater.process_unprocessed().await.unwrap(), 0);

        assert!(updater.update(30).await.unwrap());
        let snapshot = store.current_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.total_jobs, 3);
        assert_eq!(snapshot.period_days, 30);
        let python = snapshot.skill_demand["Python"];
        assert!((python - 200.0 / 3.0).abs() < 1e-9);
        assert!(!snapshot.skill_demand.contains_key("Kubernetes"));

        let categories = store.list_categories().await.unwrap();
        let languages = categories
            .iter()
            .find(|c| c.name == "programming_languages")
            .unwrap();
        assert_eq!(languages.skills_with_demand[0].name, "Python");
        assert_eq!(languages.skills_with_demand.len(), languages.skills.len());
    }

    #[tokio::test]
    async fn test_update_replaces_rather_than_merges() {
        let store = Arc::new(InMemoryStore::default());
        store
            .upsert_category(&SkillCategory::new("langs", "Languages", &["Rust", "Go"]))
            .await
            .unwrap();
        let updater = updater(store.clone());

        store.insert_posting(&posting(1, "Rust", Utc::now())).await.unwrap();
        updater.process_unprocessed().await.unwrap();
        updater.update(30).await.unwrap();

        updater.prune(0).await.unwrap();
        store.insert_posting(&posting(2, "Go", Utc::now())).await.unwrap();
        updater.process_unprocessed().await.unwrap();
        updater.update(30).await.unwrap();

        let snapshot = store.current_snapshot().await.unwrap().unwrap();
        assert_eq!(snapshot.total_jobs, 1);
        assert_eq!(snapshot.skill_demand.keys().collect::<Vec<_>>(), vec!["Go"]);
    }

    #[tokio::test]
    async fn test_empty_window_keeps_previous_snapshot() {
        let store = Arc::new(InMemoryStore::default());
        let updater = updater(store.clone());
        assert!(!updater.update(30).await.unwrap());
        assert!(store.current_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shared_skill_is_ranked_only_in_its_owning_category() {
        let store = Arc::new(InMemoryStore::default());
        let categories = vec![
            SkillCategory::new("langs", "Languages", &["Python", "Go"]),
            SkillCategory::new("data", "Data", &["python", "Pandas"]),
        ];
        for category in &categories {
            store.upsert_category(category).await.unwrap();
        }
        let updater = updater_with(store.clone(), categories);

        store
            .insert_posting(&posting(1, "Python with Pandas", Utc::now()))
            .await
            .unwrap();
        updater.process_unprocessed().await.unwrap();
        assert!(updater.update(30).await.unwrap());

        let stored = store.list_categories().await.unwrap();
        let names = |name: &str| -> Vec<String> {
            stored
                .iter()
                .find(|c| c.name == name)
                .unwrap()
                .skills_with_demand
                .iter()
                .map(|s| s.name.clone())
                .collect()
        };
        assert_eq!(names("langs"), vec!["Python", "Go"]);
        assert_eq!(names("data"), vec!["Pandas"]);
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_an_error() {
        let store = Arc::new(InMemoryStore::default());
        let updater = updater(store);
        assert!(updater.update(i64::MAX).await.is_err());
        assert!(updater.prune(i64::MAX).await.is_err());
    }
}
