use thiserror::Error;

use crate::application::error::ApplicationError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Storage provider error: {0}")]
    ProviderError(String),

    #[error("Filesystem error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<StorageError> for ApplicationError {
    fn from(error: StorageError) -> Self {
        ApplicationError::InternalError(format!("Storage error: {}", error))
    }
}

impl From<std::io::Error> for StorageError {
    fn from(error: std::io::Error) -> Self {
        StorageError::Io(error.to_string())
    }
}

impl From<reqwest::Error> for StorageError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            StorageError::NetworkError("Request timeout".to_string())
        } else if error.is_connect() {
            StorageError::NetworkError(format!("Connection failed: {}", error))
        } else if let Some(status) = error.status() {
            match status.as_u16() {
                401 | 403 => StorageError::Unauthorized(error.to_string()),
                _ => StorageError::ProviderError(error.to_string()),
            }
        } else {
            StorageError::InternalError(error.to_string())
        }
    }
}
