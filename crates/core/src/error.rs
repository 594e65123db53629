use thiserror::Error;

use crate::models::ValidationErrors;

pub use sqlx::Error as DbError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    BadRequest { status: u16, message: String },

    #[error("Malformed identifier: {0}")]
    MalformedId(String),

    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn movie_not_found() -> Self {
        Error::NotFound("Movie not found".to_string())
    }

    /// Status explicitly attached when the failure was raised on purpose.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::NotFound(_) => Some(404),
            Error::BadRequest { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the store rejected the write because of a uniqueness constraint.
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            Error::Duplicate(_) => true,
            Error::Database(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}
