use std::collections::HashMap;
use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::auth::JwtError;
use crate::database::DatabaseError;

/// Failures raised by the user and movie rules
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(DatabaseError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), message.clone());
        ServiceError::Validation {
            message,
            field_errors: Some(field_errors),
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate("username") => {
                ServiceError::Conflict("This username is already taken".to_string())
            }
            DatabaseError::Duplicate("title") => {
                ServiceError::Conflict("A movie with this title already exists".to_string())
            }
            DatabaseError::Duplicate(field) => {
                ServiceError::Conflict(format!("Duplicate value for '{}'", field))
            }
            other => ServiceError::Database(other),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort | PasswordError::Weak => ServiceError::field("password", err.to_string()),
            PasswordError::Hash(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::TokenGeneration(_) | JwtError::InvalidSecret => ServiceError::Internal(err.to_string()),
            JwtError::Expired | JwtError::Invalid(_) | JwtError::InvalidSubject => {
                ServiceError::Unauthorized(err.to_string())
            }
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
