use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::types::{Genre, RecordId};

/// A catalogue entry.
///
/// `creator` records who added the movie; it does not restrict who may edit it.
/// The poster payload is never part of the serialized movie.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Movie {
    #[schema(value_type = String, example = "65f1c2a9e4b0a1b2c3d4e5f6")]
    pub id: RecordId,
    pub title: String,
    pub plot: Option<String>,
    pub genre: Option<Genre>,
    #[schema(value_type = Option<String>)]
    pub creator: Option<RecordId>,
    #[serde(skip)]
    pub poster: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields a client may send when creating or patching a movie
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct MovieInput {
    #[schema(example = "Alien: el octavo pasajero")]
    pub title: Option<String>,
    pub plot: Option<String>,
    pub genre: Option<Genre>,
}

impl MovieInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.plot.is_none() && self.genre.is_none()
    }
}

impl Movie {
    pub fn new(title: impl Into<String>, creator: Option<RecordId>) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::generate(),
            title: title.into(),
            plot: None,
            genre: None,
            creator,
            poster: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite every field present in `input`; absent fields are left alone
    pub fn apply(&mut self, input: MovieInput) {
        if let Some(title) = input.title {
            self.title = title;
        }
        if let Some(plot) = input.plot {
            self.plot = Some(plot);
        }
        if let Some(genre) = input.genre {
            self.genre = Some(genre);
        }
        self.updated_at = Utc::now();
    }

    pub fn has_poster(&self) -> bool {
        self.poster.is_some()
    }
}

/// Row shape of the `movies` table
#[derive(Debug, FromRow)]
pub struct MovieRow {
    pub id: String,
    pub title: String,
    pub plot: Option<String>,
    pub genre: Option<String>,
    pub creator: Option<String>,
    pub poster: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = String;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        let genre = row
            .genre
            .as_deref()
            .map(str::parse::<Genre>)
            .transpose()
            .map_err(|e| e.to_string())?;
        let creator = row
            .creator
            .as_deref()
            .map(RecordId::parse)
            .transpose()
            .map_err(|e| e.to_string())?;

        Ok(Self {
            id: RecordId::parse(&row.id).map_err(|e| e.to_string())?,
            title: row.title,
            plot: row.plot,
            genre,
            creator,
            poster: row.poster,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
