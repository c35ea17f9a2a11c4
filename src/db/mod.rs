pub mod models;

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::store::CONTENT_COLLECTIONS;

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 2,
            connect_timeout_secs: 10,
            idle_timeout_secs: 300,
        }
    }

    /// Pool tuning comes from `DB_POOL_MAX`, `DB_POOL_MIN`,
    /// `DB_CONNECT_TIMEOUT` and `DB_IDLE_TIMEOUT`; unparsable values fall back
    /// to the defaults.
    pub fn from_lookup(url: String, lookup: &dyn Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::new(url);
        Self {
            max_connections: lookup("DB_POOL_MAX")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_connections),
            min_connections: lookup("DB_POOL_MIN")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_connections),
            connect_timeout_secs: lookup("DB_CONNECT_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.connect_timeout_secs),
            idle_timeout_secs: lookup("DB_IDLE_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.idle_timeout_secs),
            ..defaults
        }
    }
}

/// Process-wide database handle.
///
/// The pool is created on first use. Concurrent first callers wait on the
/// same initialisation instead of racing to open duplicate pools; a failed
/// attempt is not cached, so the next caller tries again.
pub struct Database {
    config: DbConfig,
    pool: OnceCell<PgPool>,
}

impl Database {
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    /// Get the pool, connecting and preparing the schema if this is the first call.
    pub async fn pool(&self) -> Result<&PgPool, sqlx::Error> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<PgPool, sqlx::Error> {
        let config = &self.config;

        tracing::info!("Initializing database connection pool...");
        tracing::debug!(
            "Database URL: {}",
            config.url.replace(
                |c: char| !c.is_ascii_alphanumeric() && c != ':' && c != '/' && c != '@' && c != '.',
                "*"
            )
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(1800))
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        sqlx::query("SELECT 1").fetch_one(&pool).await?;
        run_migrations(&pool).await?;

        tracing::info!("Database connection pool initialized successfully");
        Ok(pool)
    }

    pub async fn health_check(&self) -> Result<Duration, sqlx::Error> {
        let pool = self.pool().await?;

        let start = std::time::Instant::now();
        sqlx::query("SELECT 1").fetch_one(pool).await?;

        Ok(start.elapsed())
    }
}

/// Create the users table and one document table per content collection.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            email TEXT UNIQUE NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'admin',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
    "#,
    )
    .execute(pool)
    .await?;

    for collection in CONTENT_COLLECTIONS {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {collection} (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                doc JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#
        ))
        .execute(pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS idx_{collection}_created_at ON {collection}(created_at DESC)"
        ))
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_blog_posts_slug
            ON blog_posts ((doc->>'slug'))
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_experiences_start_date
            ON experiences ((doc->>'startDate') DESC)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");

    Ok(())
}
