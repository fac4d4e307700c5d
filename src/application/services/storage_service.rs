use async_trait::async_trait;

use crate::{
    application::error::ApplicationError,
    domain::models::file::{StorageProvider, StoredAsset, UploadRequest},
};

#[async_trait]
pub trait StorageBackend: Send + Sync {
    fn provider(&self) -> StorageProvider;
    async fn store(&self, request: UploadRequest) -> Result<StoredAsset, ApplicationError>;
}
