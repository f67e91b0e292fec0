use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Translates the database settings into sqlx connect options.
pub fn connect_options(database: &DatabaseConfig) -> Result<PgConnectOptions> {
    match database {
        DatabaseConfig::Url(url) => url
            .parse::<PgConnectOptions>()
            .context("DATABASE_URL is not a valid PostgreSQL connection string"),
        DatabaseConfig::Parts {
            user,
            password,
            host,
            port,
            name,
        } => Ok(PgConnectOptions::new()
            .host(host)
            .port(*port)
            .username(user)
            .password(password)
            .database(name)),
    }
}

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(options: PgConnectOptions, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Applies the embedded schema migrations (pgvector extension, documents, chunks).
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to apply database migrations")?;
    info!("Database migrations applied");
    Ok(())
}
