//! One harvest cycle: harvest, extract skills, recompute statistics, prune.

use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::harvester::JobHarvester;
use super::stats::StatisticsUpdater;

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub stats_window_days: i64,
    /// `None` disables pruning.
    pub retention_days: Option<i64>,
    /// Upper bound on the harvest step of a cycle.
    pub max_run: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub new_postings: usize,
    pub processed_postings: usize,
    pub statistics_updated: bool,
    pub pruned_postings: u64,
}

pub struct HarvestPipeline {
    harvester: JobHarvester,
    updater: StatisticsUpdater,
    settings: PipelineSettings,
    run_lock: Mutex<()>,
}

impl HarvestPipeline {
    pub fn new(harvester: JobHarvester, updater: StatisticsUpdater, settings: PipelineSettings) -> Self {
        Self {
            harvester,
            updater,
            settings,
            run_lock: Mutex::new(()),
        }
    }

    /// Runs a full cycle. Concurrent callers (the scheduler and the manual trigger)
    /// queue behind each other.
    pub async fn run_cycle(&self, cancel: &CancellationToken) -> Result<CycleReport> {
        let _guard = self.run_lock.lock().await;
        info!("Starting harvest cycle");

        let new_postings = self.bounded_harvest(cancel).await?;

        let processed_postings = self.updater.process_unprocessed().await?;

        let statistics_updated = if new_postings > 0 || processed_postings > 0 {
            self.updater.update(self.settings.stats_window_days).await?
        } else {
            info!("No new postings; skill statistics left unchanged");
            false
        };

        let pruned_postings = match self.settings.retention_days {
            Some(days) => self.updater.prune(days).await?,
            None => 0,
        };

        let report = CycleReport {
            new_postings,
            processed_postings,
            statistics_updated,
            pruned_postings,
        };
        info!(?report, "Harvest cycle finished");
        Ok(report)
    }

    /// Harvests until done or until `max_run` elapses. On expiry the harvester is
    /// cancelled cooperatively, so postings already fetched are still saved and counted.
    async fn bounded_harvest(&self, cancel: &CancellationToken) -> Result<usize> {
        let bound = cancel.child_token();
        let harvest = self.harvester.run(&bound);
        tokio::pin!(harvest);

        tokio::select! {
            result = &mut harvest => result,
            _ = tokio::time::sleep(self.settings.max_run) => {
                warn!(
                    "Harvest exceeded {:?}; stopping after the current posting",
                    self.settings.max_run
                );
                bound.cancel();
                harvest.await
            }
        }
    }
}
