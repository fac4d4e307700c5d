use axum::extract::FromRef;
use std::sync::Arc;

use crate::application::{
    repositories::property_repository::PropertyRepository,
    services::{TokenVerifier, UploadService},
};

/// How the host of public upload URLs is chosen.
#[derive(Debug, Clone)]
pub struct HostSettings {
    /// Used when a request carries no usable host.
    pub fallback_host: String,
    pub trust_forwarded_host: bool,
}

#[derive(Clone, FromRef)]
pub struct AppState {
    pub upload_service: UploadService,
    pub property_repository: Arc<dyn PropertyRepository>,
    pub token_verifier: TokenVerifier,
    pub host_settings: HostSettings,
}
