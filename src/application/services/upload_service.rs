use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    application::{
        error::{ApplicationError, NO_FILES_UPLOADED},
        services::StorageBackend,
    },
    domain::models::file::{StorageProvider, StoredAsset, UploadRequest},
};

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const MAX_FILES_PER_REQUEST: usize = 12;

/// Limits applied to a file before it reaches the storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_size: u64,
    pub require_image: bool,
}

impl UploadPolicy {
    /// `/api/upload` endpoints: size cap only.
    pub const fn direct() -> Self {
        Self {
            max_size: MAX_FILE_SIZE,
            require_image: false,
        }
    }

    /// Listing submission form: size cap and `image/*` only.
    pub const fn listing_form() -> Self {
        Self {
            max_size: MAX_FILE_SIZE,
            require_image: true,
        }
    }

    pub fn check(&self, request: &UploadRequest) -> Result<(), ApplicationError> {
        if !request.validate_size(self.max_size) {
            warn!(
                "Rejecting '{}': {} bytes exceeds {} byte limit",
                request.filename,
                request.size(),
                self.max_size
            );
            return Err(ApplicationError::FileTooLarge);
        }

        if self.require_image && !request.is_image() {
            return Err(ApplicationError::UnsupportedMediaType(
                request.mime_type.clone(),
            ));
        }

        Ok(())
    }
}

/// Scheme and host the client used to reach us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicOrigin {
    pub protocol: String,
    pub host: String,
}

impl PublicOrigin {
    pub fn new(protocol: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            host: host.into(),
        }
    }

    pub fn asset_url(&self, filename: &str) -> String {
        format!("{}://{}/uploads/{}", self.protocol, self.host, filename)
    }
}

#[derive(Clone)]
pub struct UploadService {
    backend: Arc<dyn StorageBackend>,
}

impl UploadService {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn provider(&self) -> StorageProvider {
        self.backend.provider()
    }

    pub async fn upload_one(
        &self,
        request: UploadRequest,
        policy: UploadPolicy,
        origin: &PublicOrigin,
    ) -> Result<String, ApplicationError> {
        policy.check(&request)?;
        let asset = self.backend.store(request).await?;
        let url = Self::public_url(&asset, origin);
        info!(
            "Stored {} ({} bytes) via {}",
            asset.asset_id,
            asset.size,
            asset.provider.as_str()
        );
        Ok(url)
    }

    /// Every file is checked before the first one is stored. A storage failure
    /// part-way through fails the whole call; files already stored stay stored.
    pub async fn upload_many(
        &self,
        requests: Vec<UploadRequest>,
        policy: UploadPolicy,
        origin: &PublicOrigin,
    ) -> Result<Vec<String>, ApplicationError> {
        if requests.is_empty() {
            return Err(ApplicationError::BadRequest(NO_FILES_UPLOADED.to_string()));
        }
        if requests.len() > MAX_FILES_PER_REQUEST {
            return Err(ApplicationError::BadRequest(format!(
                "Too many files: at most {} allowed",
                MAX_FILES_PER_REQUEST
            )));
        }
        for request in &requests {
            policy.check(request)?;
        }

        let mut urls = Vec::with_capacity(requests.len());
        for request in requests {
            let asset = self.backend.store(request).await?;
            urls.push(Self::public_url(&asset, origin));
        }

        info!(
            "Stored batch of {} files via {}",
            urls.len(),
            self.provider().as_str()
        );
        Ok(urls)
    }

    fn public_url(asset: &StoredAsset, origin: &PublicOrigin) -> String {
        asset
            .public_url
            .clone()
            .unwrap_or_else(|| origin.asset_url(&asset.asset_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Records stored filenames; fails on the n-th store when asked to.
    struct RecordingBackend {
        stored: Mutex<Vec<String>>,
        fail_on: Option<usize>,
        provider: StorageProvider,
    }

    impl RecordingBackend {
        fn new(provider: StorageProvider, fail_on: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                stored: Mutex::new(Vec::new()),
                fail_on,
                provider,
            })
        }
    }

    #[async_trait]
    impl StorageBackend for RecordingBackend {
        fn provider(&self) -> StorageProvider {
            self.provider
        }

        async fn store(&self, request: UploadRequest) -> Result<StoredAsset, ApplicationError> {
            let mut stored = self.stored.lock().await;
            if self.fail_on == Some(stored.len()) {
                return Err(ApplicationError::InternalError("disk full".to_string()));
            }
            let asset_id = format!("stored-{}", request.filename);
            stored.push(asset_id.clone());
            let public_url = match self.provider {
                StorageProvider::Cloudinary => {
                    Some(format!("https://res.cloudinary.com/demo/{}", asset_id))
                }
                StorageProvider::Local => None,
            };
            Ok(StoredAsset {
                location: asset_id.clone(),
                asset_id,
                public_url,
                size: request.size(),
                mime_type: request.mime_type,
                provider: self.provider,
            })
        }
    }

    fn png(name: &str, len: usize) -> UploadRequest {
        UploadRequest::new(vec![7; len], name.to_string(), "image/png".to_string())
    }

    fn origin() -> PublicOrigin {
        PublicOrigin::new("http", "stays.test:4000")
    }

    #[tokio::test]
    async fn local_asset_url_uses_request_origin() {
        let backend = RecordingBackend::new(StorageProvider::Local, None);
        let service = UploadService::new(backend.clone());

        let url = service
            .upload_one(png("test.png", 10), UploadPolicy::direct(), &origin())
            .await
            .unwrap();

        assert_eq!(url, "http://stays.test:4000/uploads/stored-test.png");
    }

    #[tokio::test]
    async fn cloud_asset_url_is_returned_unchanged() {
        let backend = RecordingBackend::new(StorageProvider::Cloudinary, None);
        let service = UploadService::new(backend);

        let url = service
            .upload_one(png("test.png", 10), UploadPolicy::direct(), &origin())
            .await
            .unwrap();

        assert_eq!(url, "https://res.cloudinary.com/demo/stored-test.png");
    }

    #[tokio::test]
    async fn oversized_file_never_reaches_backend() {
        let backend = RecordingBackend::new(StorageProvider::Local, None);
        let service = UploadService::new(backend.clone());

        let err = service
            .upload_one(
                png("huge.png", MAX_FILE_SIZE as usize + 1),
                UploadPolicy::direct(),
                &origin(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::FileTooLarge));
        assert!(backend.stored.lock().await.is_empty());
    }

    #[tokio::test]
    async fn listing_form_requires_image_mime() {
        let backend = RecordingBackend::new(StorageProvider::Local, None);
        let service = UploadService::new(backend.clone());
        let pdf = UploadRequest::new(
            vec![1; 10],
            "brochure.pdf".to_string(),
            "application/pdf".to_string(),
        );

        let direct = service
            .upload_one(pdf.clone(), UploadPolicy::direct(), &origin())
            .await;
        assert!(direct.is_ok());

        let form = service
            .upload_one(pdf, UploadPolicy::listing_form(), &origin())
            .await;
        assert!(matches!(
            form,
            Err(ApplicationError::UnsupportedMediaType(_))
        ));
        assert_eq!(backend.stored.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let backend = RecordingBackend::new(StorageProvider::Local, None);
        let service = UploadService::new(backend);
        let files = (0..5).map(|i| png(&format!("{}.png", i), 10)).collect();

        let urls = service
            .upload_many(files, UploadPolicy::direct(), &origin())
            .await
            .unwrap();

        let names: Vec<_> = urls
            .iter()
            .map(|u| u.rsplit('/').next().unwrap().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["stored-0.png", "stored-1.png", "stored-2.png", "stored-3.png", "stored-4.png"]
        );
    }

    #[tokio::test]
    async fn batch_bounds() {
        let backend = RecordingBackend::new(StorageProvider::Local, None);
        let service = UploadService::new(backend.clone());

        let empty = service
            .upload_many(Vec::new(), UploadPolicy::direct(), &origin())
            .await;
        assert!(matches!(empty, Err(ApplicationError::BadRequest(ref m)) if m == NO_FILES_UPLOADED));

        let too_many = (0..=MAX_FILES_PER_REQUEST)
            .map(|i| png(&format!("{}.png", i), 1))
            .collect();
        let result = service
            .upload_many(too_many, UploadPolicy::direct(), &origin())
            .await;
        assert!(matches!(result, Err(ApplicationError::BadRequest(_))));
        assert!(backend.stored.lock().await.is_empty());
    }

    #[tokio::test]
    async fn batch_validates_everything_before_storing() {
        let backend = RecordingBackend::new(StorageProvider::Local, None);
        let service = UploadService::new(backend.clone());
        let files = vec![
            png("ok.png", 10),
            png("huge.png", MAX_FILE_SIZE as usize + 1),
        ];

        let result = service
            .upload_many(files, UploadPolicy::direct(), &origin())
            .await;

        assert!(matches!(result, Err(ApplicationError::FileTooLarge)));
        assert!(backend.stored.lock().await.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_mid_batch_fails_request() {
        let backend = RecordingBackend::new(StorageProvider::Local, Some(1));
        let service = UploadService::new(backend.clone());
        let files = vec![png("a.png", 10), png("b.png", 10), png("c.png", 10)];

        let result = service
            .upload_many(files, UploadPolicy::direct(), &origin())
            .await;

        assert!(matches!(result, Err(ApplicationError::InternalError(_))));
        assert_eq!(*backend.stored.lock().await, vec!["stored-a.png".to_string()]);
    }
}
