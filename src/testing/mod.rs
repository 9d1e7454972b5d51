use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use crate::auth::TokenIssuer;
use crate::database::models::{Movie, MovieInput, User};
use crate::database::{DatabaseError, MemoryStore, MovieRepository, RecordStore, UserRepository};
use crate::services::{MovieService, PosterStore, UserService};
use crate::types::RecordId;

pub const TEST_BCRYPT_COST: u32 = 4;
pub const TEST_POSTER_MAX_BYTES: usize = 1024;
pub const TEST_JWT_SECRET: &str = "test-secret";

/// Services wired to a fresh in-memory store and a throwaway poster directory
pub struct TestContext {
    pub store: Arc<dyn RecordStore>,
    pub users: UserService,
    pub movies: MovieService,
    pub tokens: TokenIssuer,
    _poster_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        let poster_dir = tempfile::tempdir().expect("create poster tempdir");
        let tokens = TokenIssuer::new(TEST_JWT_SECRET, 12).expect("test token issuer");

        Self {
            users: UserService::new(store.clone(), tokens.clone(), TEST_BCRYPT_COST),
            movies: MovieService::new(
                store.clone(),
                PosterStore::new(poster_dir.path()),
                TEST_POSTER_MAX_BYTES,
            ),
            tokens,
            store,
            _poster_dir: poster_dir,
        }
    }
}

/// Memory store whose poster writes always fail
#[derive(Default)]
pub struct PosterWriteFailingStore {
    inner: MemoryStore,
}

#[async_trait]
impl UserRepository for PosterWriteFailingStore {
    async fn insert_user(&self, user: &User) -> Result<(), DatabaseError> {
        self.inner.insert_user(user).await
    }

    async fn find_user(&self, id: &RecordId) -> Result<Option<User>, DatabaseError> {
        self.inner.find_user(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        self.inner.find_user_by_username(username).await
    }

    async fn find_user_with_token(
        &self,
        id: &RecordId,
        token: &str,
    ) -> Result<Option<User>, DatabaseError> {
        self.inner.find_user_with_token(id, token).await
    }

    async fn push_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError> {
        self.inner.push_token(id, token).await
    }

    async fn pull_token(&self, id: &RecordId, token: &str) -> Result<bool, DatabaseError> {
        self.inner.pull_token(id, token).await
    }

    async fn clear_tokens(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        self.inner.clear_tokens(id).await
    }

    async fn update_password(&self, id: &RecordId, password_hash: &str) -> Result<bool, DatabaseError> {
        self.inner.update_password(id, password_hash).await
    }

    async fn delete_user(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        self.inner.delete_user(id).await
    }
}

#[async_trait]
impl MovieRepository for PosterWriteFailingStore {
    async fn insert_movie(&self, movie: &Movie) -> Result<(), DatabaseError> {
        self.inner.insert_movie(movie).await
    }

    async fn find_movie(&self, id: &RecordId) -> Result<Option<Movie>, DatabaseError> {
        self.inner.find_movie(id).await
    }

    async fn find_movie_by_title(&self, title: &str) -> Result<Option<Movie>, DatabaseError> {
        self.inner.find_movie_by_title(title).await
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, DatabaseError> {
        self.inner.list_movies().await
    }

    async fn update_movie(
        &self,
        id: &RecordId,
        changes: &MovieInput,
    ) -> Result<Option<Movie>, DatabaseError> {
        self.inner.update_movie(id, changes).await
    }

    async fn set_poster(&self, _id: &RecordId, _poster: Option<&[u8]>) -> Result<bool, DatabaseError> {
        Err(DatabaseError::QueryError("poster column unavailable".to_string()))
    }

    async fn delete_movie(&self, id: &RecordId) -> Result<bool, DatabaseError> {
        self.inner.delete_movie(id).await
    }
}

#[async_trait]
impl RecordStore for PosterWriteFailingStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
