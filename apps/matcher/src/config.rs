use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::analysis::service::AnalysisSettings;
use crate::harvest::harvester::{DelayRange, HarvestSettings};
use crate::harvest::pipeline::PipelineSettings;

const DEFAULT_QUERIES: &[&str] = &[
    "software engineer",
    "data scientist",
    "machine learning",
    "web developer",
    "devops",
    "product manager",
    "full stack developer",
];

const DEFAULT_LOCATIONS: &[&str] = &[
    "Remote",
    "New York, NY",
    "San Francisco, CA",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
];

/// Upper bound for every day-count setting (about a century).
const MAX_DAYS: i64 = 36_500;
const MAX_INTERVAL_HOURS: u64 = 24 * 365;
const MAX_RUN_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    /// Present whenever `store_backend` is `Postgres`.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub harvest_enabled: bool,
    pub harvest_interval: Duration,
    pub harvest_pages: u32,
    pub harvest_base_url: String,
    pub harvest_max_run: Duration,
    pub harvest_queries: Vec<String>,
    pub harvest_locations: Vec<String>,
    pub stats_window_days: i64,
    pub missing_skill_threshold: f64,
    pub missing_skill_limit: usize,
    /// `None` keeps postings forever.
    pub posting_retention_days: Option<i64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let store_backend = match env_or("STORE_BACKEND", "postgres").to_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };
        let database_url = match store_backend {
            StoreBackend::Postgres => Some(require_env("DATABASE_URL")?),
            StoreBackend::Memory => std::env::var("DATABASE_URL").ok(),
        };

        let retention_days = parse_bounded_env("POSTING_RETENTION_DAYS", 180, 0..=MAX_DAYS)?;

        Ok(Config {
            store_backend,
            database_url,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
            harvest_enabled: parse_env("HARVEST_ENABLED", true)?,
            harvest_interval: duration_env("HARVEST_INTERVAL_HOURS", 24, 1..=MAX_INTERVAL_HOURS, 3600)?,
            harvest_pages: parse_env("HARVEST_PAGES", 2)?,
            harvest_base_url: env_or("HARVEST_BASE_URL", "https://www.indeed.com"),
            harvest_max_run: duration_env("HARVEST_MAX_RUN_MINUTES", 180, 1..=MAX_RUN_MINUTES, 60)?,
            harvest_queries: list_env("HARVEST_QUERIES", DEFAULT_QUERIES),
            harvest_locations: list_env("HARVEST_LOCATIONS", DEFAULT_LOCATIONS),
            stats_window_days: parse_bounded_env("STATS_WINDOW_DAYS", 30, 1..=MAX_DAYS)?,
            missing_skill_threshold: parse_env("MISSING_SKILL_THRESHOLD", 75.0)?,
            missing_skill_limit: parse_env("MISSING_SKILL_LIMIT", 5)?,
            posting_retention_days: (retention_days > 0).then_some(retention_days),
        })
    }

    pub fn harvest_settings(&self) -> HarvestSettings {
        HarvestSettings {
            queries: self.harvest_queries.clone(),
            locations: self.harvest_locations.clone(),
            pages: self.harvest_pages,
            posting_delay: DelayRange::secs(2, 5),
            page_delay: DelayRange::secs(3, 7),
        }
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            stats_window_days: self.stats_window_days,
            retention_days: self.posting_retention_days,
            max_run: self.harvest_max_run,
        }
    }

    pub fn analysis_settings(&self) -> AnalysisSettings {
        AnalysisSettings {
            missing_threshold: self.missing_skill_threshold,
            missing_limit: self.missing_skill_limit,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn parse_bounded_env<T>(key: &str, default: T, range: RangeInclusive<T>) -> Result<T>
where
    T: FromStr + PartialOrd + Display,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = parse_env(key, default)?;
    if !range.contains(&value) {
        bail!(
            "{key} must be between {} and {}, got {value}",
            range.start(),
            range.end()
        );
    }
    Ok(value)
}

/// A count of `unit_secs`-long units, e.g. hours or minutes.
fn duration_env(key: &str, default: u64, range: RangeInclusive<u64>, unit_secs: u64) -> Result<Duration> {
    let units = parse_bounded_env(key, default, range)?;
    let secs = units
        .checked_mul(unit_secs)
        .with_context(|| format!("{key} is too large: {units}"))?;
    Ok(Duration::from_secs(secs))
}

/// Semicolon-separated list; locations contain commas ("Austin, TX").
fn list_env(key: &str, default: &[&str]) -> Vec<String> {
    match std::env::var(key) {
        Ok(raw) => split_list(&raw),
        Err(_) => default.iter().map(|s| s.to_string()).collect(),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
