mod cloudinary_storage;
mod error;
mod local_storage;
mod naming;

pub use error::StorageError;

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    application::services::StorageBackend, domain::config::storage::StorageStrategyConfig,
};
use cloudinary_storage::CloudinaryStorageService;
use local_storage::LocalStorageService;

/// Picks the upload backend once at startup.
///
/// Cloudinary is used when all credentials are present and the adapter can be
/// built; anything else falls back to local disk with a warning. Only a failure
/// to prepare the local upload directory is an error.
pub async fn create_storage_backend(
    config: &StorageStrategyConfig,
) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.cloudinary.as_ref() {
        Some(secrets) => match CloudinaryStorageService::new(
            secrets.clone(),
            &config.cloudinary_api_base,
            &config.folder,
            &config.asset_prefix,
        ) {
            Ok(service) => {
                info!(
                    "Using Cloudinary storage (cloud '{}', folder '{}')",
                    secrets.cloud_name, config.folder
                );
                return Ok(Arc::new(service));
            }
            Err(e) => warn!("Cloudinary not available, using local storage: {}", e),
        },
        None => warn!("Cloudinary not configured, using local storage"),
    }

    let local = LocalStorageService::new(config.upload_dir.clone(), &config.asset_prefix).await?;
    Ok(Arc::new(local))
}
