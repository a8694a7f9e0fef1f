use anyhow::Result;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::OnceLock;

pub mod models;
pub mod repositories;
pub mod transaction;
pub mod utils;

static POOL: OnceLock<PgPool> = OnceLock::new();

/// Connect, run migrations and install the process-wide pool.
pub async fn init_database(database_url: &str) -> Result<&'static PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    log::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    log::info!("Migrations completed successfully");

    Ok(POOL.get_or_init(|| pool))
}

/// Global connection pool. `init_database` must have completed before any
/// repository function runs.
pub fn get_pool() -> &'static PgPool {
    POOL.get().expect("database pool is not initialized")
}
