pub mod error;
pub mod server;
pub mod storage;

pub use error::ConfigError;

/// Reads a variable and treats blank values as absent.
pub(crate) fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
