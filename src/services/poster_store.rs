use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use uuid::Uuid;

use crate::types::RecordId;

pub const POSTER_EXTENSION: &str = "jpg";
pub const POSTER_CONTENT_TYPE: &str = "image/jpeg";

/// Poster image files, one per movie, named after the movie id
#[derive(Debug, Clone)]
pub struct PosterStore {
    directory: PathBuf,
}

/// A fully written poster that is not yet visible under its final name
#[derive(Debug)]
pub struct StagedPoster {
    staging: PathBuf,
    target: PathBuf,
}

impl StagedPoster {
    /// Drop the staged bytes, leaving any existing poster untouched
    pub async fn discard(self) {
        if let Err(e) = fs::remove_file(&self.staging).await {
            tracing::warn!("Could not remove staged poster {}: {}", self.staging.display(), e);
        }
    }
}

impl PosterStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub async fn ensure_directory(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.directory).await
    }

    pub fn path_for(&self, id: &RecordId) -> PathBuf {
        self.directory.join(format!("{}.{}", id, POSTER_EXTENSION))
    }

    /// Write the bytes to a temporary sibling of the poster path
    pub async fn stage(&self, id: &RecordId, bytes: &[u8]) -> std::io::Result<StagedPoster> {
        let staged = StagedPoster {
            staging: self
                .directory
                .join(format!(".{}.{}.tmp", id, Uuid::new_v4().simple())),
            target: self.path_for(id),
        };

        if let Err(e) = fs::write(&staged.staging, bytes).await {
            let _ = fs::remove_file(&staged.staging).await;
            return Err(e);
        }
        Ok(staged)
    }

    /// Move a staged poster into place; readers never see a partial image
    pub async fn commit(&self, staged: StagedPoster) -> std::io::Result<()> {
        if let Err(e) = fs::rename(&staged.staging, &staged.target).await {
            let _ = fs::remove_file(&staged.staging).await;
            return Err(e);
        }
        Ok(())
    }

    /// `None` when no poster file exists for the id
    pub async fn read(&self, id: &RecordId) -> std::io::Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn exists(&self, id: &RecordId) -> std::io::Result<bool> {
        fs::try_exists(self.path_for(id)).await
    }

    /// Returns false when there was nothing to delete
    pub async fn remove(&self, id: &RecordId) -> std::io::Result<bool> {
        match fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}
