use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};

use crate::{
    application::{error::ApplicationError, services::StorageBackend},
    domain::models::file::{StorageProvider, StoredAsset, UploadRequest},
    services::{error::StorageError, naming},
};

/// Attempts before giving up on a name collision.
const MAX_NAME_ATTEMPTS: usize = 3;

/// Writes uploads into a directory served at `/uploads`.
pub struct LocalStorageService {
    upload_dir: PathBuf,
    prefix: String,
}

impl LocalStorageService {
    /// Creates the upload directory if needed; calling this on an existing
    /// directory is fine.
    pub async fn new(upload_dir: PathBuf, prefix: &str) -> Result<Self, StorageError> {
        fs::create_dir_all(&upload_dir).await.map_err(|e| {
            StorageError::Io(format!(
                "Failed to create upload directory {}: {}",
                upload_dir.display(),
                e
            ))
        })?;
        info!("Local upload directory ready at {}", upload_dir.display());

        Ok(Self {
            upload_dir,
            prefix: prefix.to_string(),
        })
    }

    /// `create_new` guarantees an existing file is never overwritten.
    async fn write_new(
        &self,
        extension: Option<&str>,
        content: &[u8],
    ) -> Result<(String, PathBuf), StorageError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = naming::local_filename(&self.prefix, extension);
            let path = self.upload_dir.join(&filename);

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => file,
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!("Generated name {} already taken, retrying", filename);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            file.write_all(content).await?;
            file.flush().await?;
            return Ok((filename, path));
        }

        Err(StorageError::InternalError(
            "Could not generate a unique filename".to_string(),
        ))
    }
}

#[async_trait]
impl StorageBackend for LocalStorageService {
    fn provider(&self) -> StorageProvider {
        StorageProvider::Local
    }

    async fn store(&self, request: UploadRequest) -> Result<StoredAsset, ApplicationError> {
        let extension = request.extension();
        let (filename, path) = self
            .write_new(extension.as_deref(), &request.content)
            .await?;

        Ok(StoredAsset {
            asset_id: filename,
            location: path.display().to_string(),
            public_url: None,
            size: request.size(),
            mime_type: request.mime_type,
            provider: StorageProvider::Local,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn png(len: usize) -> UploadRequest {
        UploadRequest::new(vec![42; len], "test.png".to_string(), "image/png".to_string())
    }

    #[tokio::test]
    async fn creates_nested_directory_idempotently() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("public").join("uploads");

        LocalStorageService::new(nested.clone(), "prop").await.unwrap();
        let again = LocalStorageService::new(nested.clone(), "prop").await.unwrap();

        assert!(nested.is_dir());
        assert_eq!(again.upload_dir, nested);
    }

    #[tokio::test]
    async fn writes_bytes_under_generated_name() {
        let dir = tempdir().unwrap();
        let backend = LocalStorageService::new(dir.path().to_path_buf(), "prop")
            .await
            .unwrap();

        let asset = backend.store(png(10)).await.unwrap();

        assert!(asset.asset_id.starts_with("prop-"));
        assert!(asset.asset_id.ends_with(".png"));
        assert_eq!(asset.provider, StorageProvider::Local);
        assert!(asset.public_url.is_none());
        let written = std::fs::read(dir.path().join(&asset.asset_id)).unwrap();
        assert_eq!(written, vec![42; 10]);
    }

    #[tokio::test]
    async fn concurrent_stores_do_not_collide() {
        let dir = tempdir().unwrap();
        let backend = std::sync::Arc::new(
            LocalStorageService::new(dir.path().to_path_buf(), "prop")
                .await
                .unwrap(),
        );

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let backend = backend.clone();
                tokio::spawn(async move { backend.store(png(4)).await.unwrap() })
            })
            .collect();

        let mut names = std::collections::HashSet::new();
        for handle in handles {
            names.insert(handle.await.unwrap().asset_id);
        }

        assert_eq!(names.len(), 20);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 20);
    }

    #[tokio::test]
    async fn write_failure_is_reported() {
        let dir = tempdir().unwrap();
        let backend = LocalStorageService::new(dir.path().join("gone"), "prop")
            .await
            .unwrap();
        std::fs::remove_dir(dir.path().join("gone")).unwrap();

        let result = backend.store(png(4)).await;

        assert!(matches!(result, Err(ApplicationError::InternalError(_))));
    }
}
