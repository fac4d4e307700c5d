use std::path::Path;

use serde::{Deserialize, Serialize};

/// A single uploaded file, held in memory for the duration of one request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub content: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl UploadRequest {
    pub fn new(content: Vec<u8>, filename: String, mime_type: String) -> Self {
        Self {
            content,
            filename,
            mime_type,
        }
    }

    pub fn validate_size(&self, max_size: u64) -> bool {
        self.size() <= max_size
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Extension of the original filename including the dot, lower-cased.
    /// Extensions with anything but ASCII alphanumerics are dropped.
    pub fn extension(&self) -> Option<String> {
        let ext = Path::new(&self.filename).extension()?.to_str()?;
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(format!(".{}", ext.to_ascii_lowercase()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Cloudinary,
    Local,
}

impl StorageProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageProvider::Cloudinary => "cloudinary",
            StorageProvider::Local => "local",
        }
    }
}

/// Result of a successful store. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAsset {
    /// Generated filename (local) or public id (cloud).
    pub asset_id: String,
    /// Path on disk or cloud public id.
    pub location: String,
    /// Set by backends that know their own public URL.
    pub public_url: Option<String>,
    pub size: u64,
    pub mime_type: String,
    pub provider: StorageProvider,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(filename: &str, mime: &str) -> UploadRequest {
        UploadRequest::new(vec![0; 10], filename.to_string(), mime.to_string())
    }

    #[test]
    fn extension_keeps_dot_and_lowercases() {
        assert_eq!(request("test.PNG", "image/png").extension().as_deref(), Some(".png"));
        assert_eq!(
            request("beach.house.jpeg", "image/jpeg").extension().as_deref(),
            Some(".jpeg")
        );
    }

    #[test]
    fn extension_absent_or_unsafe() {
        assert_eq!(request("README", "text/plain").extension(), None);
        assert_eq!(request(".hidden", "text/plain").extension(), None);
        assert_eq!(request("x.p%ng", "image/png").extension(), None);
    }

    #[test]
    fn image_mime_prefix() {
        assert!(request("a.webp", "image/webp").is_image());
        assert!(!request("a.pdf", "application/pdf").is_image());
    }

    #[test]
    fn size_limit_is_inclusive() {
        let req = request("a.png", "image/png");
        assert!(req.validate_size(10));
        assert!(!req.validate_size(9));
    }
}
