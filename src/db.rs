use std::str::FromStr;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a SQLite pool and bring the schema up to date.
///
/// `sqlite::memory:` URLs get a single long-lived connection so the in-memory
/// database survives for the lifetime of the pool.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };

    MIGRATOR.run(&pool).await?;
    tracing::debug!("Migrations applied for {}", database_url);

    Ok(pool)
}

/// Fresh, migrated in-memory database.
pub async fn memory_pool() -> Result<SqlitePool, sqlx::Error> {
    connect("sqlite::memory:").await
}
