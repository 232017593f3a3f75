use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::error::Result;

pub type DbPool = PgPool;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Hide the credentials part of a connection string before logging it.
pub fn redact_database_url(database_url: &str) -> String {
    match database_url.rsplit_once('@') {
        Some((credentials, host)) => {
            let scheme = credentials
                .split_once("://")
                .map(|(scheme, _)| scheme)
                .unwrap_or("postgres");
            format!("{}://<hidden>@{}", scheme, host)
        }
        None => "<invalid format>".to_string(),
    }
}
