use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Invalid letter: {0}")]
    InvalidLetter(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid skip: {0}")]
    InvalidSkip(String),
}

impl FilterError {
    /// Query parameter the error refers to
    pub fn field(&self) -> &'static str {
        match self {
            FilterError::InvalidLetter(_) => "letter",
            FilterError::InvalidLimit(_) => "limit",
            FilterError::InvalidSkip(_) => "skip",
        }
    }
}
