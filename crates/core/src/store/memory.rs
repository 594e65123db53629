use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Movie, MovieFields, UpdateMovie};
use crate::store::MovieStore;

/// Process-local store. The write lock is held across read-merge-write so each
/// operation is atomic per document.
#[derive(Debug, Default)]
pub struct InMemoryMovieStore {
    movies: RwLock<Vec<Movie>>,
}

impl InMemoryMovieStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, movie: Movie) -> Result<Movie> {
        let mut movies = self.movies.write().await;
        if movies.iter().any(|m| m.id == movie.id) {
            return Err(Error::Duplicate(format!("movie {}", movie.id)));
        }
        movies.push(movie.clone());
        Ok(movie)
    }
}

#[async_trait]
impl MovieStore for InMemoryMovieStore {
    async fn find(&self) -> Result<Vec<Movie>> {
        Ok(self.movies.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>> {
        let movies = self.movies.read().await;
        Ok(movies.iter().find(|m| m.id == id).cloned())
    }

    async fn create(&self, fields: MovieFields) -> Result<Movie> {
        self.insert(Movie::new(fields)).await
    }

    async fn find_by_id_and_update(&self, id: Uuid, patch: UpdateMovie) -> Result<Option<Movie>> {
        let mut movies = self.movies.write().await;
        let Some(slot) = movies.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };

        let updated = patch.apply_to(slot)?;
        *slot = updated.clone();
        Ok(Some(updated))
    }

    async fn find_by_id_and_delete(&self, id: Uuid) -> Result<Option<Movie>> {
        let mut movies = self.movies.write().await;
        Ok(movies
            .iter()
            .position(|m| m.id == id)
            .map(|index| movies.remove(index)))
    }
}
