use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::Result;
use crate::models::{Movie, MovieFields, MovieRow, UpdateMovie};
use crate::store::MovieStore;

const MOVIE_COLUMNS: &str = "id, title, director, year, genre, rating, created_at, updated_at";

pub struct SqliteMovieStore {
    pool: DbPool,
    update_lock: Mutex<()>,
}

impl SqliteMovieStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            update_lock: Mutex::new(()),
        }
    }

    async fn insert(&self, movie: &Movie) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO movies (id, title, director, year, genre, rating, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(movie.id.to_string())
        .bind(&movie.title)
        .bind(&movie.director)
        .bind(movie.year)
        .bind(&movie.genre)
        .bind(movie.rating)
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl MovieStore for SqliteMovieStore {
    async fn find(&self) -> Result<Vec<Movie>> {
        let query = format!("SELECT {} FROM movies ORDER BY rowid", MOVIE_COLUMNS);
        let rows = sqlx::query_as::<_, MovieRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Movie::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>> {
        let query = format!("SELECT {} FROM movies WHERE id = ?", MOVIE_COLUMNS);
        sqlx::query_as::<_, MovieRow>(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Movie::try_from)
            .transpose()
    }

    async fn create(&self, fields: MovieFields) -> Result<Movie> {
        let movie = Movie::new(fields);
        self.insert(&movie).await?;
        tracing::debug!(movie_id = %movie.id, "Inserted movie");
        Ok(movie)
    }

    async fn find_by_id_and_update(&self, id: Uuid, patch: UpdateMovie) -> Result<Option<Movie>> {
        // Serializes read-merge-write so concurrent patches never interleave
        let _guard = self.update_lock.lock().await;

        let Some(current) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let updated = patch.apply_to(&current)?;

        // A delete racing the merge leaves nothing to update
        let query = format!(
            r#"
            UPDATE movies
            SET title = ?, director = ?, year = ?, genre = ?, rating = ?, updated_at = ?
            WHERE id = ?
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        );
        sqlx::query_as::<_, MovieRow>(&query)
            .bind(&updated.title)
            .bind(&updated.director)
            .bind(updated.year)
            .bind(&updated.genre)
            .bind(updated.rating)
            .bind(updated.updated_at)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Movie::try_from)
            .transpose()
    }

    async fn find_by_id_and_delete(&self, id: Uuid) -> Result<Option<Movie>> {
        let query = format!(
            "DELETE FROM movies WHERE id = ? RETURNING {}",
            MOVIE_COLUMNS
        );
        sqlx::query_as::<_, MovieRow>(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Movie::try_from)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::error::Error;
    use crate::test_helpers::{create_test_db, fixtures};
    use std::sync::Arc;

    async fn setup() -> SqliteMovieStore {
        SqliteMovieStore::new(create_test_db().await)
    }

    #[tokio::test]
    async fn test_create_movie() {
        let store = setup().await;

        let movie = store.create(fixtures::interstellar()).await.unwrap();

        assert_eq!(movie.title, "Interstellar");
        assert_eq!(movie.director, "Christopher Nolan");
        assert_eq!(movie.year, Some(2014));
        assert_eq!(movie.genre, Some("Sci-Fi".to_string()));
        assert_eq!(movie.rating, Some(8.6));
    }

    #[tokio::test]
    async fn test_get_movie_by_id() {
        let store = setup().await;
        let created = store.create(fixtures::interstellar()).await.unwrap();

        let retrieved = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, created.id);
        assert_eq!(retrieved.title, created.title);
        assert_eq!(retrieved.director, created.director);
        assert_eq!(retrieved.year, created.year);
        assert_eq!(retrieved.genre, created.genre);
        assert_eq!(retrieved.rating, created.rating);
    }

    #[tokio::test]
    async fn test_get_nonexistent_movie_is_none() {
        let store = setup().await;
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_movies() {
        let store = setup().await;

        for i in 1..=5i32 {
            store
                .create(MovieFields {
                    title: format!("Movie {}", i),
                    year: Some(2000 + i),
                    ..fixtures::interstellar()
                })
                .await
                .unwrap();
        }

        let movies = store.find().await.unwrap();
        assert_eq!(movies.len(), 5);
        assert_eq!(movies[0].title, "Movie 1");
        assert_eq!(movies[4].title, "Movie 5");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let store = setup().await;
        assert!(store.find().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update() {
        let store = setup().await;
        let created = store.create(fixtures::interstellar()).await.unwrap();

        let patch = UpdateMovie {
            title: Some(Some("Interstellar (Updated)".to_string())),
            rating: Some(Some(9.0)),
            ..Default::default()
        };
        let updated = store
            .find_by_id_and_update(created.id, patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "Interstellar (Updated)");
        assert_eq!(updated.rating, Some(9.0));

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Interstellar (Updated)");
        assert_eq!(stored.rating, Some(9.0));
        assert_eq!(stored.director, "Christopher Nolan");
        assert_eq!(stored.year, Some(2014));
        assert_eq!(stored.genre, Some("Sci-Fi".to_string()));
    }

    #[tokio::test]
    async fn test_update_can_clear_optional_field() {
        let store = setup().await;
        let created = store.create(fixtures::interstellar()).await.unwrap();

        let patch = UpdateMovie {
            genre: Some(None),
            ..Default::default()
        };
        let updated = store
            .find_by_id_and_update(created.id, patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.genre, None);
        assert_eq!(updated.title, "Interstellar");
    }

    #[tokio::test]
    async fn test_invalid_update_rolls_back() {
        let store = setup().await;
        let created = store.create(fixtures::interstellar()).await.unwrap();

        let patch = UpdateMovie {
            title: Some(Some("".to_string())),
            ..Default::default()
        };
        let result = store.find_by_id_and_update(created.id, patch).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Interstellar");
    }

    #[tokio::test]
    async fn test_update_nonexistent_is_none() {
        let store = setup().await;
        let result = store
            .find_by_id_and_update(Uuid::new_v4(), UpdateMovie::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_movie() {
        let store = setup().await;
        let created = store.create(fixtures::interstellar()).await.unwrap();

        let deleted = store.find_by_id_and_delete(created.id).await.unwrap();
        assert_eq!(deleted.map(|m| m.id), Some(created.id));
        assert!(store.find_by_id(created.id).await.unwrap().is_none());

        let again = store.find_by_id_and_delete(created.id).await.unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_unique_violation() {
        let store = setup().await;
        let created = store.create(fixtures::interstellar()).await.unwrap();

        let err = store.insert(&created).await.unwrap_err();
        assert!(err.is_duplicate_key());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("movies.db").display());
        let store = Arc::new(SqliteMovieStore::new(create_pool(&url).await.unwrap()));
        let created = store.create(fixtures::interstellar()).await.unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..40 {
            let store = store.clone();
            tasks.spawn(async move {
                let patch = UpdateMovie {
                    rating: Some(Some(f64::from(i % 11))),
                    ..Default::default()
                };
                store.find_by_id_and_update(created.id, patch).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let updated = joined.unwrap().unwrap();
            assert!(updated.is_some());
        }

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Interstellar");
    }
}
