//! Document-store abstraction for movies.
//!
//! Every backend offers the same five operations. Update and delete return
//! `Ok(None)` when no document matches so callers decide what "absent" means.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::{Config, StoreKind};
use crate::db::create_pool;
use crate::error::{Error, Result};
use crate::models::{Movie, MovieFields, UpdateMovie};

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryMovieStore;
pub use sqlite::SqliteMovieStore;

#[async_trait]
pub trait MovieStore: Send + Sync {
    /// All movies in insertion order.
    async fn find(&self) -> Result<Vec<Movie>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>>;

    /// Persists already validated fields and returns the stored document.
    async fn create(&self, fields: MovieFields) -> Result<Movie>;

    /// Merges `patch` into the matching document, validating the merged result
    /// before anything is written.
    async fn find_by_id_and_update(&self, id: Uuid, patch: UpdateMovie) -> Result<Option<Movie>>;

    async fn find_by_id_and_delete(&self, id: Uuid) -> Result<Option<Movie>>;
}

/// Parses a client-supplied identifier into the form the stores key on.
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::MalformedId(raw.to_string()))
}

/// Opens the backend selected in the configuration.
pub async fn open_store(config: &Config) -> Result<Arc<dyn MovieStore>> {
    match config.store {
        StoreKind::Sqlite => {
            let pool = create_pool(&config.database_url).await?;
            tracing::info!("Database connected");
            Ok(Arc::new(SqliteMovieStore::new(pool)))
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory movie store, data will not survive a restart");
            Ok(Arc::new(InMemoryMovieStore::new()))
        }
    }
}
