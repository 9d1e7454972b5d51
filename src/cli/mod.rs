use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::{DatabaseManager, MemoryStore, PgStore, RecordStore};
use crate::services::PosterStore;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "movies-api")]
#[command(about = "Movie catalogue backend with user accounts and poster images")]
#[command(version)]
pub struct Cli {
    #[arg(long, help = "Address to bind (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Directory for poster images (overrides POSTER_DIR)")]
    pub poster_dir: Option<PathBuf>,

    #[arg(long, help = "Use the in-memory record store even when DATABASE_URL is set")]
    pub in_memory: bool,
}

impl Cli {
    /// Environment configuration with command line flags applied on top
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::from_env();
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.poster_dir {
            config.posters.directory = dir.clone();
        }
        if self.in_memory {
            config.database.url = None;
        }
        config
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn RecordStore>> {
    if config.database.url.is_none() {
        tracing::warn!("No DATABASE_URL configured, records are kept in memory only");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::ensure_schema(&pool)
        .await
        .context("failed to prepare the database schema")?;
    Ok(Arc::new(PgStore::new(pool)))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config();
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting movies-api in {:?} mode", config.environment);

    PosterStore::new(config.posters.directory.clone())
        .ensure_directory()
        .await
        .with_context(|| format!("failed to create poster directory {}", config.posters.directory.display()))?;

    let store = open_store(&config).await?;
    let bind_addr = config.bind_address();
    let state = AppState::new(config, store).context("failed to initialise token signing")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("movies-api listening on http://{}", bind_addr);

    crate::serve(listener, state).await.context("server error")
}
