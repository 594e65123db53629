use std::sync::Arc;

use crate::error::{Error, Result};
use crate::models::{CreateMovie, Movie, UpdateMovie};
use crate::store::{MovieStore, parse_id};

#[derive(Clone)]
pub struct MovieService {
    store: Arc<dyn MovieStore>,
}

impl MovieService {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Movie>> {
        self.store.find().await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Movie> {
        let id = parse_id(id)?;
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(Error::movie_not_found)
    }

    pub async fn create(&self, input: CreateMovie) -> Result<Movie> {
        let fields = input.validate()?;
        let movie = self.store.create(fields).await?;
        tracing::debug!(movie_id = %movie.id, title = %movie.title, "Movie created");
        Ok(movie)
    }

    pub async fn update(&self, id: &str, input: UpdateMovie) -> Result<Movie> {
        let id = parse_id(id)?;

        // Nothing to merge, hand back the stored document untouched
        if input.is_empty() {
            return self
                .store
                .find_by_id(id)
                .await?
                .ok_or_else(Error::movie_not_found);
        }

        let movie = self
            .store
            .find_by_id_and_update(id, input)
            .await?
            .ok_or_else(Error::movie_not_found)?;
        tracing::debug!(movie_id = %movie.id, "Movie updated");
        Ok(movie)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let id = parse_id(id)?;
        self.store
            .find_by_id_and_delete(id)
            .await?
            .ok_or_else(Error::movie_not_found)?;
        tracing::debug!(movie_id = %id, "Movie deleted");
        Ok(())
    }
}
