use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got '{value}'")]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}
