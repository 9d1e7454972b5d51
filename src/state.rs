use std::sync::Arc;

use crate::auth::{JwtError, TokenIssuer};
use crate::config::AppConfig;
use crate::database::{MemoryStore, RecordStore};
use crate::services::{MovieService, PosterStore, UserService};

/// Application context shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn RecordStore>,
    pub users: UserService,
    pub movies: MovieService,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> Result<Self, JwtError> {
        let tokens = TokenIssuer::from_config(&config.security)?;
        let users = UserService::new(store.clone(), tokens, config.security.bcrypt_cost);
        let movies = MovieService::new(
            store.clone(),
            PosterStore::new(config.posters.directory.clone()),
            config.posters.max_bytes,
        );

        Ok(Self {
            config: Arc::new(config),
            store,
            users,
            movies,
        })
    }

    pub fn in_memory(config: AppConfig) -> Result<Self, JwtError> {
        Self::new(config, Arc::new(MemoryStore::new()))
    }
}
