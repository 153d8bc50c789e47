use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::portfolio::PgPortfolioStore;

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

/// Builds the portfolio store and makes sure its table exists.
pub async fn create_store(pool: PgPool) -> Result<PgPortfolioStore> {
    let store = PgPortfolioStore::new(pool);
    store.ensure_schema().await?;
    Ok(store)
}
