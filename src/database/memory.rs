use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{Movie, MovieInput, User};
use crate::database::repository::{MovieRepository, RecordStore, UserRepository};
use crate::types::RecordId;

/// Process-local record store.
///
/// Uniqueness checks and the matching insert happen under a single write lock.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<RecordId, User>>,
    movies: RwLock<Vec<Movie>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn with_user<F>(&self, id: &RecordId, mutate: F) -> bool
    where
        F: FnOnce(&mut User) + Send,
    {
        let mut users = self.users.write().await;
        match users.get_mut(id) {
            Some(user) => {
                mutate(user);
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(DatabaseError::Duplicate("username"));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&self, id: &RecordId) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_with_token(
        &self,
        id: &RecordId,
        token: &str,
    ) -> Result<Option<User>, DatabaseError> {
        Ok(self
            .users
            .read()
            .await
            .get(id)
            .filter(|u| u.has_token(token))
            .cloned())
    }

    async fn push_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError> {
        let token = token.to_string();
        Ok(self.with_user(id, move |user| user.tokens.push(token)).await)
    }

    async fn pull_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError> {
        Ok(self.with_user(id, |user| user.tokens.retain(|t| t != token)).await)
    }

    async fn clear_tokens(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        Ok(self.with_user(id, |user| user.tokens.clear()).await)
    }

    async fn update_password(&self, id: &RecordId, password_hash: &str) -> Result<bool, DatabaseError> {
        let password_hash = password_hash.to_string();
        Ok(self
            .with_user(id, move |user| user.password_hash = password_hash)
            .await)
    }

    async fn delete_user(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        Ok(self.users.write().await.remove(id).is_some())
    }
}

#[async_trait]
impl MovieRepository for MemoryStore {
    async fn insert_movie(&self, movie: &Movie) -> Result<(), DatabaseError> {
        let mut movies = self.movies.write().await;
        if movies.iter().any(|m| m.title == movie.title) {
            return Err(DatabaseError::Duplicate("title"));
        }
        movies.push(movie.clone());
        Ok(())
    }

    async fn find_movie(&self, id: &RecordId) -> Result<Option<Movie>, DatabaseError> {
        Ok(self.movies.read().await.iter().find(|m| &m.id == id).cloned())
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>, DatabaseError> {
        Ok(self
            .movies
            .read()
            .await
            .iter()
            .find(|m| m.title == title)
            .cloned())
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, DatabaseError> {
        Ok(self
            .movies
            .read()
            .await
            .iter()
            .map(|m| Movie {
                poster: None,
                ..m.clone()
            })
            .collect())
    }

    async fn update_movie(
        &self,
        id: &RecordId,
        changes: &MovieInput,
    ) -> Result<Option<Movie>, DatabaseError> {
        let mut movies = self.movies.write().await;
        if let Some(title) = &changes.title {
            if movies.iter().any(|m| &m.id != id && &m.title == title) {
                return Err(DatabaseError::Duplicate("title"));
            }
        }
        Ok(movies.iter_mut().find(|m| &m.id == id).map(|existing| {
            existing.apply(changes.clone());
            existing.clone()
        }))
    }

    async fn set_poster(&self, id: &RecordId, poster: Option<&[u8]>) -> Result<bool, DatabaseError> {
        let mut movies = self.movies.write().await;
        match movies.iter_mut().find(|m| &m.id == id) {
            Some(existing) => {
                existing.poster = poster.map(<[u8]>::to_vec);
                existing.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_movie(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        let mut movies = self.movies.write().await;
        let before = movies.len();
        movies.retain(|m| &m.id != id);
        Ok(movies.len() < before)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
