use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::pipeline::HarvestPipeline;

/// Runs a harvest cycle immediately and then every `every`, until `shutdown` is cancelled.
/// A failed cycle is logged and retried on the next tick.
pub async fn run_harvest_loop(pipeline: Arc<HarvestPipeline>, every: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("Harvest scheduler started (interval: {}h)", every.as_secs() / 3600);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                info!("Harvest scheduler shutting down");
                break;
            }
            _ = ticker.tick() => {
                if let Err(e) = pipeline.run_cycle(&shutdown).await {
                    error!("Harvest cycle failed: {e:#}");
                }
            }
        }
    }
}
