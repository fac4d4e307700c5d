use std::{fmt, path::PathBuf};

use super::non_blank;

pub const DEFAULT_UPLOAD_DIR: &str = "public/uploads";
pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";
pub const DEFAULT_CLOUDINARY_FOLDER: &str = "pwanystay_properties";
pub const DEFAULT_ASSET_PREFIX: &str = "prop";

#[derive(Clone)]
pub struct CloudinarySecrets {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudinarySecrets {
    /// Returns `None` unless all three credentials are present.
    pub fn from_parts(
        cloud_name: Option<String>,
        api_key: Option<String>,
        api_secret: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            cloud_name: cloud_name?,
            api_key: api_key?,
            api_secret: api_secret?,
        })
    }
}

impl fmt::Debug for CloudinarySecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinarySecrets")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Process-wide storage settings, read once at startup.
#[derive(Debug, Clone)]
pub struct StorageStrategyConfig {
    pub cloudinary: Option<CloudinarySecrets>,
    pub cloudinary_api_base: String,
    pub folder: String,
    pub upload_dir: PathBuf,
    pub asset_prefix: String,
}

impl StorageStrategyConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let cloudinary = CloudinarySecrets::from_parts(
            non_blank(&lookup, "CLOUDINARY_CLOUD_NAME"),
            non_blank(&lookup, "CLOUDINARY_API_KEY"),
            non_blank(&lookup, "CLOUDINARY_API_SECRET"),
        );

        Self {
            cloudinary,
            cloudinary_api_base: non_blank(&lookup, "CLOUDINARY_API_BASE")
                .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string()),
            folder: DEFAULT_CLOUDINARY_FOLDER.to_string(),
            upload_dir: non_blank(&lookup, "UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
        }
    }

    #[cfg(test)]
    pub fn local(upload_dir: PathBuf) -> Self {
        Self {
            cloudinary: None,
            cloudinary_api_base: DEFAULT_CLOUDINARY_API_BASE.to_string(),
            folder: DEFAULT_CLOUDINARY_FOLDER.to_string(),
            upload_dir,
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
        }
    }
}
