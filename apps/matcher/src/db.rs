use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Idempotent schema. Applied statement by statement at startup.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS job_postings (
        id          UUID PRIMARY KEY,
        url         TEXT NOT NULL UNIQUE,
        title       TEXT NOT NULL,
        company     TEXT NOT NULL,
        location    TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        source      TEXT NOT NULL,
        query       TEXT NOT NULL,
        skills      TEXT[],
        scraped_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS job_postings_scraped_at_idx ON job_postings (scraped_at)",
    r#"
    CREATE TABLE IF NOT EXISTS job_skills (
        seq        BIGSERIAL,
        doc_type   TEXT NOT NULL,
        name       TEXT NOT NULL,
        body       JSONB NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (doc_type, name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS resume_analyses (
        id          BIGSERIAL PRIMARY KEY,
        resume_id   TEXT NOT NULL,
        body        JSONB NOT NULL,
        analyzed_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS resume_analyses_resume_id_idx ON resume_analyses (resume_id)",
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to apply schema statement: {}", statement.trim()))?;
    }
    info!("Database schema ready");
    Ok(())
}
