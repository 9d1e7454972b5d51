#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use movies_api::config::AppConfig;
use movies_api::state::AppState;

pub const POSTER_MAX_BYTES: usize = 4096;

/// An in-process server on a free port with its own in-memory store and poster directory
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub poster_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let poster_dir = tempfile::tempdir().context("failed to create poster dir")?;

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.database.url = None;
        config.security.bcrypt_cost = 4;
        config.posters.directory = poster_dir.path().to_path_buf();
        config.posters.max_bytes = POSTER_MAX_BYTES;

        let listener = tokio::net::TcpListener::bind(config.bind_address())
            .await
            .context("failed to bind test listener")?;
        let state = AppState::in_memory(config)?;
        tokio::spawn(async move {
            let _ = movies_api::serve(listener, state).await;
        });

        let server = Self {
            base_url: format!("http://127.0.0.1:{}", port),
            client: Client::new(),
            poster_dir,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/ping")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Register an account, returning the user JSON and its first token
    pub async fn signup(&self, username: &str, password: &str) -> Result<(Value, String)> {
        let res = self
            .post("/users")
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "signup failed: {}", res.status());

        let body: Value = res.json().await?;
        let token = body["data"]["token"]
            .as_str()
            .context("signup response has no token")?
            .to_string();
        Ok((body["data"]["user"].clone(), token))
    }

    pub async fn create_movie(&self, token: &str, movie: Value) -> Result<Value> {
        let res = self.post("/movies").bearer_auth(token).json(&movie).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create movie failed: {}", res.status());

        let body: Value = res.json().await?;
        Ok(body["data"]["movie"].clone())
    }

    /// Alien, Booksmart and Star Wars, in that order
    pub async fn seed_movies(&self, token: &str) -> Result<Vec<Value>> {
        let mut movies = Vec::new();
        for movie in [
            json!({ "title": "Alien: el octavo pasajero", "genre": "Terror" }),
            json!({ "title": "Booksmart", "genre": "Comedia" }),
            json!({ "title": "Star Wars: A New Hope", "genre": "Acción" }),
        ] {
            movies.push(self.create_movie(token, movie).await?);
        }
        Ok(movies)
    }

    pub fn poster_file(&self, movie_id: &str) -> std::path::PathBuf {
        self.poster_dir.path().join(format!("{}.jpg", movie_id))
    }
}

pub fn id_of(record: &Value) -> String {
    record["id"].as_str().unwrap_or_default().to_string()
}
