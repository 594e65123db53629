//! Test helpers for creating in-memory test databases and fixtures

use crate::db::{DbPool, create_pool};

/// Creates an in-memory SQLite database with all migrations applied
pub async fn create_test_db() -> DbPool {
    create_pool("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Test fixtures for common test data
pub mod fixtures {
    use crate::models::MovieFields;

    pub fn interstellar() -> MovieFields {
        MovieFields {
            title: "Interstellar".to_string(),
            director: "Christopher Nolan".to_string(),
            year: Some(2014),
            genre: Some("Sci-Fi".to_string()),
            rating: Some(8.6),
        }
    }
}
