use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{FieldError, FieldReader, ValidationErrors};

pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;

/// Database row representation with String IDs for SQLite TEXT columns
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovieRow {
    pub id: String,
    pub title: String,
    pub director: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application-level Movie document with a proper Uuid id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: Uuid,
    pub title: String,
    pub director: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = Error;

    fn try_from(row: MovieRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Internal(format!("corrupt movie id {:?}: {}", row.id, e)))?;

        Ok(Self {
            id,
            title: row.title,
            director: row.director,
            year: row.year,
            genre: row.genre,
            rating: row.rating,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl Movie {
    /// Builds a fresh document from validated fields, assigning id and timestamps.
    pub fn new(fields: MovieFields) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            director: fields.director,
            year: fields.year,
            genre: fields.genre,
            rating: fields.rating,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated movie fields, ready to be written to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieFields {
    pub title: String,
    pub director: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<f64>,
}

/// Request body for creating a movie. Required fields stay optional here so a
/// missing field surfaces as a field-level validation error.
#[derive(Debug, Clone, Default)]
pub struct CreateMovie {
    pub title: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<f64>,
}

impl CreateMovie {
    /// Reads a request body, reporting values of the wrong type per field.
    pub fn from_json(body: &Value) -> Result<Self> {
        let mut reader = FieldReader::new(body)?;
        let input = Self {
            title: reader.string("title").flatten(),
            director: reader.string("director").flatten(),
            year: reader.integer("year").flatten(),
            genre: reader.string("genre").flatten(),
            rating: reader.number("rating").flatten(),
        };
        reader.finish(input)
    }

    pub fn validate(self) -> Result<MovieFields> {
        let mut errors = ValidationErrors::new();

        let title = required("title", self.title, &mut errors);
        let director = required("director", self.director, &mut errors);

        if let Some(rating) = self.rating {
            if rating < RATING_MIN {
                errors.add(FieldError::min("rating", rating, RATING_MIN));
            } else if rating > RATING_MAX {
                errors.add(FieldError::max("rating", rating, RATING_MAX));
            }
        }

        match (title, director) {
            (Some(title), Some(director)) if errors.is_empty() => Ok(MovieFields {
                title,
                director,
                year: self.year,
                genre: self.genre,
                rating: self.rating,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

fn required(path: &str, value: Option<String>, errors: &mut ValidationErrors) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        Some(v) => {
            errors.add(FieldError::required(path, Some(Value::String(v))));
            None
        }
        None => {
            errors.add(FieldError::required(path, None));
            None
        }
    }
}

/// Partial update. The outer `Option` tells whether the field was sent at all,
/// the inner one carries an explicit `null`.
#[derive(Debug, Clone, Default)]
pub struct UpdateMovie {
    pub title: Option<Option<String>>,
    pub director: Option<Option<String>>,
    pub year: Option<Option<i32>>,
    pub genre: Option<Option<String>>,
    pub rating: Option<Option<f64>>,
}

fn patched<T>(patch: Option<Option<T>>, current: Option<T>) -> Option<T> {
    match patch {
        Some(value) => value,
        None => current,
    }
}

impl UpdateMovie {
    pub fn from_json(body: &Value) -> Result<Self> {
        let mut reader = FieldReader::new(body)?;
        let patch = Self {
            title: reader.string("title"),
            director: reader.string("director"),
            year: reader.integer("year"),
            genre: reader.string("genre"),
            rating: reader.number("rating"),
        };
        reader.finish(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.director.is_none()
            && self.year.is_none()
            && self.genre.is_none()
            && self.rating.is_none()
    }

    /// Merges the supplied fields over `current` and validates the result.
    pub fn apply_to(self, current: &Movie) -> Result<Movie> {
        let merged = CreateMovie {
            title: patched(self.title, Some(current.title.clone())),
            director: patched(self.director, Some(current.director.clone())),
            year: patched(self.year, current.year),
            genre: patched(self.genre, current.genre.clone()),
            rating: patched(self.rating, current.rating),
        };
        let fields = merged.validate()?;

        Ok(Movie {
            id: current.id,
            title: fields.title,
            director: fields.director,
            year: fields.year,
            genre: fields.genre,
            rating: fields.rating,
            created_at: current.created_at,
            updated_at: Utc::now(),
        })
    }
}
