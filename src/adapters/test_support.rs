use std::{path::Path, sync::Arc};

use axum::http::HeaderValue;
use axum_test::{multipart::Part, TestServer};
use jsonwebtoken::{encode, EncodingKey, Header};
use tempfile::TempDir;
use tower_http::cors::CorsLayer;

use crate::{
    adapters::{
        repositories::InMemoryPropertyRepository,
        router::build_router,
        state::{AppState, HostSettings},
    },
    application::services::{Claims, TokenVerifier, UploadService},
    domain::config::storage::StorageStrategyConfig,
    services::create_storage_backend,
};

pub const TEST_JWT_SECRET: &str = "listing-test-secret";

/// A server on local-disk storage. The upload directory lives exactly as long
/// as the app, so it cannot be dropped while requests are still being made.
pub struct TestApp {
    server: TestServer,
    upload_dir: TempDir,
}

impl TestApp {
    pub fn server(&self) -> &TestServer {
        &self.server
    }

    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.path()
    }

    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }
}

/// `X-Forwarded-Host` is ignored, as in a default deployment.
pub async fn test_app() -> TestApp {
    build_test_app(false).await
}

/// `X-Forwarded-Host` is trusted, as behind a configured proxy.
pub async fn test_app_behind_proxy() -> TestApp {
    build_test_app(true).await
}

async fn build_test_app(trust_forwarded_host: bool) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let backend = create_storage_backend(&StorageStrategyConfig::local(
        upload_dir.path().to_path_buf(),
    ))
    .await
    .unwrap();

    let state = AppState {
        upload_service: UploadService::new(backend),
        property_repository: Arc::new(InMemoryPropertyRepository::new()),
        token_verifier: TokenVerifier::new(Some(TEST_JWT_SECRET)),
        host_settings: HostSettings {
            fallback_host: "localhost:4000".to_string(),
            trust_forwarded_host,
        },
    };

    let app = build_router(state, upload_dir.path(), CorsLayer::permissive());
    let server = TestServer::new(app).unwrap();

    TestApp { server, upload_dir }
}

pub fn bearer() -> HeaderValue {
    let claims = Claims {
        sub: "owner-1".to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

pub fn png_part(filename: &str, size: usize) -> Part {
    Part::bytes(vec![0x89u8; size])
        .file_name(filename.to_string())
        .mime_type("image/png")
}
