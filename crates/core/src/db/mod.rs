use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::{str::FromStr, time::Duration};

pub type DbPool = SqlitePool;

pub async fn create_pool(database_url: &str) -> Result<DbPool, crate::Error> {
    let in_memory = database_url.contains(":memory:");

    // Ensure the data directory exists
    if !in_memory
        && let Some(path) = database_url.strip_prefix("sqlite:")
        && let Some(parent) = std::path::Path::new(path.split('?').next().unwrap_or(path)).parent()
    {
        std::fs::create_dir_all(parent)?;
    }

    // Writers queue on the database lock instead of failing with SQLITE_BUSY
    let connect_options =
        SqliteConnectOptions::from_str(database_url)?.busy_timeout(Duration::from_secs(5));

    // Every connection to `sqlite::memory:` opens its own database, so keep
    // exactly one alive for the lifetime of the pool.
    let options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = options
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(connect_options)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
