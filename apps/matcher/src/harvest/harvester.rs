//! Job Harvester: walks every (query, location) pair page by page, fetching each
//! unseen posting's description and persisting it.
//!
//! Fetch failures are logged and skipped: one bad page or posting never aborts a run.
//! Only store failures propagate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::board::{JobBoardClient, JobCard, SOURCE};
use crate::models::job_posting::NewJobPosting;
use crate::store::SkillStore;

/// Inclusive range a politeness delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    pub const NONE: DelayRange = DelayRange {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn secs(min: u64, max: u64) -> Self {
        Self {
            min: Duration::from_secs(min),
            max: Duration::from_secs(max),
        }
    }

    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

#[derive(Debug, Clone)]
pub struct HarvestSettings {
    pub queries: Vec<String>,
    pub locations: Vec<String>,
    /// Search pages fetched per (query, location).
    pub pages: u32,
    pub posting_delay: DelayRange,
    pub page_delay: DelayRange,
}

pub struct JobHarvester {
    board: JobBoardClient,
    store: Arc<dyn SkillStore>,
    settings: HarvestSettings,
}

impl JobHarvester {
    pub fn new(board: JobBoardClient, store: Arc<dyn SkillStore>, settings: HarvestSettings) -> Self {
        Self {
            board,
            store,
            settings,
        }
    }

    /// One harvest run over the full query × location cross product.
    /// Returns the number of newly inserted postings.
    pub async fn run(&self, cancel: &CancellationToken) -> Result<usize> {
        info!(
            "Starting harvest run: {} queries x {} locations, {} pages each",
            self.settings.queries.len(),
            self.settings.locations.len(),
            self.settings.pages
        );

        let mut total_new = 0;
        'pairs: for query in &self.settings.queries {
            for location in &self.settings.locations {
                if cancel.is_cancelled() {
                    warn!("Harvest run cancelled");
                    break 'pairs;
                }
                let postings = self.scrape(query, location, cancel).await;
                total_new += self.save_postings(&postings).await?;
            }
        }

        info!("Completed harvest run. Added {total_new} new postings.");
        Ok(total_new)
    }

    /// Scrapes up to `pages` search pages for one pair, returning postings not yet stored.
    pub async fn scrape(
        &self,
        query: &str,
        location: &str,
        cancel: &CancellationToken,
    ) -> Vec<NewJobPosting> {
        info!("Scraping '{query}' in '{location}'");
        let mut postings = Vec::new();

        for page in 0..self.settings.pages {
            if cancel.is_cancelled() {
                break;
            }

            let cards = match self.board.fetch_search_page(query, location, page).await {
                Ok(cards) => cards,
                Err(e) => {
                    error!("Error scraping page {} for '{query}' in '{location}': {e:#}", page + 1);
                    continue;
                }
            };
            if cards.is_empty() {
                warn!("No job cards found on page {}", page + 1);
                continue;
            }

            for card in cards {
                if self.already_stored(&card).await {
                    debug!("Skipping known posting {}", card.url);
                    continue;
                }
                postings.push(self.build_posting(card, query, location).await);
                if !pause(self.settings.posting_delay, cancel).await {
                    return postings;
                }
            }

            if !pause(self.settings.page_delay, cancel).await {
                break;
            }
        }

        info!("Scraped {} new postings for '{query}' in '{location}'", postings.len());
        postings
    }

    /// Inserts postings whose URL has not been seen before; returns how many were new.
    pub async fn save_postings(&self, postings: &[NewJobPosting]) -> Result<usize> {
        if postings.is_empty() {
            return Ok(0);
        }
        let mut saved = 0;
        for posting in postings {
            if self.store.insert_posting(posting).await? {
                saved += 1;
            }
        }
        info!("Saved {saved} new postings to the store");
        Ok(saved)
    }

    async fn already_stored(&self, card: &JobCard) -> bool {
        match self.store.posting_exists(&card.url).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!("Could not check posting {}: {e:#}", card.url);
                false
            }
        }
    }

    async fn build_posting(&self, card: JobCard, query: &str, location: &str) -> NewJobPosting {
        let description = match self.board.fetch_description(&card.url).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error getting job details for {}: {e:#}", card.url);
                String::new()
            }
        };

        NewJobPosting {
            url: card.url,
            title: card.title,
            company: card.company,
            location: location.to_string(),
            description,
            source: SOURCE.to_string(),
            query: query.to_string(),
            scraped_at: Utc::now(),
        }
    }
}

/// Sleeps for a sampled delay. Returns `false` if cancelled first.
async fn pause(range: DelayRange, cancel: &CancellationToken) -> bool {
    let delay = range.sample();
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = cancel.cancelled() => false,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::extract::Query;
    use axum::response::Html;
    use axum::routing::get;
    use axum::Router;

    use crate::store::InMemoryStore;

    /// Serves one search page with three cards (one without a title) and detail pages
    /// keyed by `jk`. Job 3's detail page fails with a 500.
    pub(crate) async fn spawn_fixture_board() -> String {
        async fn search() -> Html<&'static str> {
            Html(
                r#"<html><body>
                <div class="jobsearch-SerpJobCard">
                  <h2 class="title"><a href="/viewjob?jk=1">Backend Engineer</a></h2>
                  <span class="company">Acme</span>
                </div>
                <div class="jobsearch-SerpJobCard">
                  <h2 class="title"><a href="/viewjob?jk=2">ML Engineer</a></h2>
                  <span class="company">Initech</span>
                </div>
                <div class="jobsearch-SerpJobCard">
                  <h2 class="title"><a href="/viewjob?jk=3">Platform Engineer</a></h2>
                </div>
                <div class="jobsearch-SerpJobCard"><span class="company">Ghost</span></div>
                </body></html>"#,
            )
        }

        async fn detail(
            Query(params): Query<HashMap<String, String>>,
        ) -> Result<Html<&'static str>, axum::http::StatusCode> {
            match params.get("jk").map(String::as_str) {
                Some("1") => Ok(Html(
                    r#"<div id="jobDescriptionText">We need Python and AWS experience.</div>"#,
                )),
                Some("2") => Ok(Html(
                    r#"<div id="jobDescriptionText">Python, Docker and Machine Learning.</div>"#,
                )),
                _ => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
            }
        }

        let app = Router::new()
            .route("/jobs", get(search))
            .route("/viewjob", get(detail));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub(crate) fn fast_settings() -> HarvestSettings {
        HarvestSettings {
            queries: vec!["software engineer".to_string()],
            locations: vec!["Remote".to_string()],
            pages: 1,
            posting_delay: DelayRange::NONE,
            page_delay: DelayRange::NONE,
        }
    }

    fn posting(url: &str) -> NewJobPosting {
        NewJobPosting {
            url: url.to_string(),
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            description: "Rust".to_string(),
            source: SOURCE.to_string(),
            query: "software engineer".to_string(),
            scraped_at: Utc::now(),
        }
    }

    #[test]
    fn test_delay_range_sampling() {
        assert_eq!(DelayRange::NONE.sample(), Duration::ZERO);
        let range = DelayRange::secs(2, 5);
        for _ in 0..50 {
            let d = range.sample();
            assert!(d >= Duration::from_secs(2) && d <= Duration::from_secs(5));
        }
        // inverted range never panics
        assert_eq!(DelayRange::secs(5, 2).sample(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_save_postings_dedupes_across_runs() {
        let store = Arc::new(InMemoryStore::default());
        let harvester = JobHarvester::new(
            JobBoardClient::new("http://127.0.0.1:9").unwrap(),
            store.clone(),
            fast_settings(),
        );
        let batch = vec![posting("https://jobs.example/1"), posting("https://jobs.example/2")];

        assert_eq!(harvester.save_postings(&batch).await.unwrap(), 2);
        assert_eq!(harvester.save_postings(&batch).await.unwrap(), 0);
        assert_eq!(store.count_postings().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_run_against_fixture_board() {
        let base_url = spawn_fixture_board().await;
        let store = Arc::new(InMemoryStore::default());
        let harvester = JobHarvester::new(
            JobBoardClient::new(&base_url).unwrap(),
            store.clone(),
            fast_settings(),
        );
        let cancel = CancellationToken::new();

        assert_eq!(harvester.run(&cancel).await.unwrap(), 3);

        let postings = store.unprocessed_postings().await.unwrap();
        let by_title = |t: &str| postings.iter().find(|p| p.title == t).unwrap().clone();
        let backend = by_title("Backend Engineer");
        assert_eq!(backend.company, "Acme");
        assert_eq!(backend.location, "Remote");
        assert_eq!(backend.source, "indeed");
        assert_eq!(backend.description, "We need Python and AWS experience.");
        assert_eq!(backend.url, format!("{base_url}/viewjob?jk=1"));
        // detail fetch failed: posting kept with an empty description
        let platform = by_title("Platform Engineer");
        assert_eq!(platform.description, "");
        assert_eq!(platform.company, "Unknown");

        // second run sees only known URLs
        assert_eq!(harvester.run(&cancel).await.unwrap(), 0);
        assert_eq!(store.count_postings().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_board_is_not_fatal() {
        let store = Arc::new(InMemoryStore::default());
        let mut settings = fast_settings();
        settings.pages = 2;
        let harvester = JobHarvester::new(
            JobBoardClient::new("http://127.0.0.1:9").unwrap(),
            store.clone(),
            settings,
        );
        assert_eq!(harvester.run(&CancellationToken::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_run_fetches_nothing() {
        let base_url = spawn_fixture_board().await;
        let store = Arc::new(InMemoryStore::default());
        let harvester = JobHarvester::new(
            JobBoardClient::new(&base_url).unwrap(),
            store.clone(),
            fast_settings(),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(harvester.run(&cancel).await.unwrap(), 0);
        assert_eq!(store.count_postings().await.unwrap(), 0);
    }
}
