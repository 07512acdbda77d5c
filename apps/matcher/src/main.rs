mod analysis;
mod config;
mod db;
mod errors;
mod harvest;
mod models;
mod routes;
mod skills;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::document::StandardTextExtractor;
use crate::config::{Config, StoreBackend};
use crate::db::{create_pool, ensure_schema};
use crate::harvest::board::JobBoardClient;
use crate::harvest::harvester::JobHarvester;
use crate::harvest::pipeline::HarvestPipeline;
use crate::harvest::scheduler::run_harvest_loop;
use crate::harvest::stats::StatisticsUpdater;
use crate::routes::build_router;
use crate::skills::catalog::SkillCatalog;
use crate::skills::extractor::SkillExtractor;
use crate::state::AppState;
use crate::store::{InMemoryStore, PgSkillStore, SkillStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting matcher v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    info!("Store holds {} job postings", store.count_postings().await?);

    let catalog = Arc::new(SkillCatalog::load_or_seed(store.as_ref()).await?);
    let extractor = Arc::new(SkillExtractor::new(catalog.clone()));

    let board = JobBoardClient::new(&config.harvest_base_url)?;
    let harvester = JobHarvester::new(board, store.clone(), config.harvest_settings());
    let updater = StatisticsUpdater::new(store.clone(), catalog, extractor.clone());
    let pipeline = Arc::new(HarvestPipeline::new(
        harvester,
        updater,
        config.pipeline_settings(),
    ));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
            shutdown.cancel();
        }
    });

    if config.harvest_enabled {
        tokio::spawn(run_harvest_loop(
            pipeline.clone(),
            config.harvest_interval,
            shutdown.clone(),
        ));
    } else {
        info!("Scheduled harvesting disabled (HARVEST_ENABLED=false)");
    }

    let state = AppState {
        store,
        extractor,
        text_extractor: Arc::new(StandardTextExtractor),
        pipeline,
        analysis: config.analysis_settings(),
        shutdown: shutdown.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn SkillStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for the postgres backend"))?;
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Ok(Arc::new(PgSkillStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; nothing will survive a restart");
            Ok(Arc::new(InMemoryStore::default()))
        }
    }
}
