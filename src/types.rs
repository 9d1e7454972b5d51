/// Shared types used across the codebase

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of the textual record id
pub const RECORD_ID_LEN: usize = 24;

/// Store-assigned record identifier: 24 lowercase hex characters.
///
/// The first 8 characters encode the creation time in seconds (big-endian),
/// the remaining 16 are random.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid 24 character record id")]
pub struct InvalidRecordId(pub String);

impl RecordId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        let seconds = Utc::now().timestamp().clamp(0, u32::MAX as i64) as u32;
        let random = Uuid::new_v4();

        let mut id = String::with_capacity(RECORD_ID_LEN);
        for byte in seconds.to_be_bytes().iter().chain(&random.as_bytes()[..8]) {
            id.push_str(&format!("{:02x}", byte));
        }
        Self(id)
    }

    pub fn parse(value: &str) -> Result<Self, InvalidRecordId> {
        let valid = value.len() == RECORD_ID_LEN && value.chars().all(|c| c.is_ascii_hexdigit());
        if !valid {
            return Err(InvalidRecordId(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RecordId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Movie genres accepted by the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub enum Genre {
    Terror,
    Drama,
    Comedia,
    #[serde(rename = "Acción")]
    Accion,
    Desconocido,
}

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Terror,
        Genre::Drama,
        Genre::Comedia,
        Genre::Accion,
        Genre::Desconocido,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Terror => "Terror",
            Genre::Drama => "Drama",
            Genre::Comedia => "Comedia",
            Genre::Accion => "Acción",
            Genre::Desconocido => "Desconocido",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genre '{0}'")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Genre::ALL
            .iter()
            .copied()
            .find(|genre| genre.as_str() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}
