//! Job board client: search-result pages and posting detail pages.

use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Url};
use scraper::{Html, Selector};

/// Source identifier stored with every posting from this board.
pub const SOURCE: &str = "indeed";
const RESULTS_PER_PAGE: u32 = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// One result card from a search page.
#[derive(Debug, Clone, PartialEq)]
pub struct JobCard {
    pub title: String,
    pub company: String,
    /// Absolute URL of the detail page; the posting's natural key.
    pub url: String,
}

struct Selectors {
    card: Selector,
    title: Selector,
    link: Selector,
    company: Selector,
    description: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            card: parse_selector("div.jobsearch-SerpJobCard")?,
            title: parse_selector("h2.title")?,
            link: parse_selector("a[href]")?,
            company: parse_selector("span.company")?,
            description: parse_selector("div#jobDescriptionText")?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector '{css}': {e}"))
}

pub struct JobBoardClient {
    client: Client,
    base_url: Url,
    selectors: Selectors,
}

impl JobBoardClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            selectors: Selectors::new()?,
        })
    }

    /// `{base}/jobs?q=..&l=..&start=..`, `page` counted from zero.
    pub fn search_url(&self, query: &str, location: &str, page: u32) -> Result<Url> {
        let mut url = self.base_url.join("/jobs")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("l", location)
            .append_pair("start", &(page * RESULTS_PER_PAGE).to_string());
        Ok(url)
    }

    pub async fn fetch_search_page(
        &self,
        query: &str,
        location: &str,
        page: u32,
    ) -> Result<Vec<JobCard>> {
        let url = self.search_url(query, location, page)?;
        let body = self.get_text(url).await?;
        Ok(self.parse_job_cards(&body))
    }

    /// Full description text of a posting's detail page; empty when the page has none.
    pub async fn fetch_description(&self, url: &str) -> Result<String> {
        let body = self.get_text(Url::parse(url)?).await?;
        Ok(self.parse_description(&body))
    }

    async fn get_text(&self, url: Url) -> Result<String> {
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }

    /// Cards without a title or a detail link are skipped.
    pub fn parse_job_cards(&self, html: &str) -> Vec<JobCard> {
        let document = Html::parse_document(html);
        let mut cards = Vec::new();

        for card in document.select(&self.selectors.card) {
            let Some(title_el) = card.select(&self.selectors.title).next() else {
                continue;
            };
            let title = collapse_whitespace(title_el.text());
            if title.is_empty() {
                continue;
            }

            let Some(url) = title_el
                .select(&self.selectors.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| self.base_url.join(href).ok())
            else {
                continue;
            };

            let company = card
                .select(&self.selectors.company)
                .next()
                .map(|el| collapse_whitespace(el.text()))
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "Unknown".to_string());

            cards.push(JobCard {
                title,
                company,
                url: url.to_string(),
            });
        }
        cards
    }

    pub fn parse_description(&self, html: &str) -> String {
        Html::parse_document(html)
            .select(&self.selectors.description)
            .next()
            .map(|el| collapse_whitespace(el.text()))
            .unwrap_or_default()
    }
}

fn collapse_whitespace<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_PAGE: &str = r#"
        <html><body>
          <div class="jobsearch-SerpJobCard">
            <h2 class="title"><a href="/viewjob?jk=abc">Senior
               Rust Engineer</a></h2>
            <span class="company"> Ferrous Ltd </span>
          </div>
          <div class="jobsearch-SerpJobCard">
            <h2 class="title"><a href="https://other.example/job/2">Data Scientist</a></h2>
          </div>
          <div class="jobsearch-SerpJobCard">
            <span class="company">No Title Inc</span>
          </div>
          <div class="jobsearch-SerpJobCard">
            <h2 class="title">Unlinked Role</h2>
          </div>
        </body></html>
    "#;

    fn client() -> JobBoardClient {
        JobBoardClient::new("https://www.indeed.com").unwrap()
    }

    #[test]
    fn test_search_url_paginates_by_ten() {
        let url = client().search_url("software engineer", "Austin, TX", 2).unwrap();
        assert_eq!(url.path(), "/jobs");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "software engineer".to_string()),
                ("l".to_string(), "Austin, TX".to_string()),
                ("start".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_job_cards() {
        let cards = client().parse_job_cards(SEARCH_PAGE);
        assert_eq!(
            cards,
            vec![
                JobCard {
                    title: "Senior Rust Engineer".to_string(),
                    company: "Ferrous Ltd".to_string(),
                    url: "https://www.indeed.com/viewjob?jk=abc".to_string(),
                },
                JobCard {
                    title: "Data Scientist".to_string(),
                    company: "Unknown".to_string(),
                    url: "https://other.example/job/2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_job_cards_empty_page() {
        assert!(client().parse_job_cards("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_parse_description() {
        let html = r#"<div id="jobDescriptionText"><p>We use <b>Python</b>
            and AWS.</p><ul><li>Docker</li></ul></div>"#;
        assert_eq!(client().parse_description(html), "We use Python and AWS. Docker");
        assert_eq!(client().parse_description("<p>nothing</p>"), "");
    }
}
