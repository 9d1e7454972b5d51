use serde::Deserialize;
use utoipa::IntoParams;

use super::error::FilterError;

/// Query string accepted by the movie listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovieQuery {
    /// Case-insensitive substring of the title
    pub name: Option<String>,
    /// First character of the title, case-insensitive
    pub letter: Option<String>,
    /// Genre list; a movie matches when its genre appears in it
    pub genre: Option<String>,
    /// Maximum number of results, at least 1
    pub limit: Option<usize>,
    /// Results to skip, at least 1
    pub skip: Option<usize>,
}

impl MovieQuery {
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(letter) = &self.letter {
            if letter.chars().count() != 1 {
                return Err(FilterError::InvalidLetter(
                    "letter must be exactly one character".to_string(),
                ));
            }
        }
        if self.limit == Some(0) {
            return Err(FilterError::InvalidLimit("limit must be at least 1".to_string()));
        }
        if self.skip == Some(0) {
            return Err(FilterError::InvalidSkip("skip must be at least 1".to_string()));
        }
        Ok(())
    }
}
