//! Storage contracts for users and movies.
//!
//! Implementations must enforce username and title uniqueness themselves
//! (returning [`DatabaseError::Duplicate`]) and must apply token list changes
//! atomically, so concurrent requests cannot both pass a uniqueness check or
//! lose a token update.

use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{Movie, MovieInput, User};
use crate::types::RecordId;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; `Duplicate("username")` when the name is taken
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError>;

    async fn find_user(&self, id: &RecordId) -> Result<Option<User>, DatabaseError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    /// Resolve a user only if `token` is still in their live token list
    async fn find_user_with_token(
        &self,
        id: &RecordId,
        token: &str,
    ) -> Result<Option<User>, DatabaseError>;

    /// Append a token. Returns false when the user no longer exists.
    async fn push_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError>;

    /// Remove every occurrence of a token
    async fn pull_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError>;

    async fn clear_tokens(&self, id: &RecordId) -> Result<bool, DatabaseError>;

    async fn update_password(&self, id: &RecordId, password_hash: &str) -> Result<bool, DatabaseError>;

    async fn delete_user(&self, id: &RecordId) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Insert a new movie; `Duplicate("title")` when the title is taken
    async fn insert_movie(&self, movie: &Movie) -> Result<(), DatabaseError>;

    async fn find_movie(&self, id: &RecordId) -> Result<Option<Movie>, DatabaseError>;

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>, DatabaseError>;

    /// All movies in insertion order. Poster payloads are not loaded.
    async fn list_movies(&self) -> Result<Vec<Movie>, DatabaseError>;

    /// Write only the fields present in `changes`, plus `updated_at`, in one
    /// atomic step. Returns the stored movie, or `None` when it no longer exists.
    async fn update_movie(
        &self,
        id: &RecordId,
        changes: &MovieInput,
    ) -> Result<Option<Movie>, DatabaseError>;

    /// Replace or clear the poster payload without touching other fields.
    /// Returns false when the movie no longer exists.
    async fn set_poster(&self, id: &RecordId, poster: Option<&[u8]>) -> Result<bool, DatabaseError>;

    async fn delete_movie(&self, id: &RecordId) -> Result<bool, DatabaseError>;
}

/// The full record store the application runs against
#[async_trait]
pub trait RecordStore: UserRepository + MovieRepository {
    /// Short backend name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}
