mod adapters;
mod application;
mod domain;
mod services;

use std::sync::Arc;

use adapters::{
    repositories::{InMemoryPropertyRepository, PgPropertyRepository},
    router::build_router,
    state::{AppState, HostSettings},
};
use application::{
    repositories::property_repository::PropertyRepository,
    services::{TokenVerifier, UploadService},
};
use domain::config::{server::ServerConfig, storage::StorageStrategyConfig};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let server_config = ServerConfig::from_env().expect("ERROR: invalid server configuration");
    let storage_config = StorageStrategyConfig::from_env();

    tracing::info!("Starting pwanystay-service on port {}", server_config.port);

    // Configure CORS
    let cors = if let Some(allowed_origins) = &server_config.cors_allowed_origins {
        let origins: Vec<_> = allowed_origins
            .iter()
            .map(|s| s.parse().expect("Invalid CORS origin"))
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Allow all origins if not specified (only for development)
        CorsLayer::permissive()
    };

    let backend = services::create_storage_backend(&storage_config)
        .await
        .expect("ERROR: Failed to prepare the upload directory. Check UPLOAD_DIR.");

    let property_repository: Arc<dyn PropertyRepository> = match &server_config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to PostgreSQL...");
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(database_url)
                .await
                .expect("ERROR: Failed to connect to PostgreSQL database. Check DATABASE_URL and network connectivity.");
            Arc::new(PgPropertyRepository::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, listings are kept in memory only");
            Arc::new(InMemoryPropertyRepository::new())
        }
    };

    let token_verifier = TokenVerifier::new(server_config.jwt_secret.as_deref());
    if !token_verifier.is_configured() {
        tracing::warn!("JWT_SECRET not set, listing submissions will be rejected");
    }

    let app_state = AppState {
        upload_service: UploadService::new(backend),
        property_repository,
        token_verifier,
        host_settings: HostSettings {
            fallback_host: server_config.public_host.clone(),
            trust_forwarded_host: server_config.trust_forwarded_host,
        },
    };

    let router = build_router(app_state, &storage_config.upload_dir, cors);

    // Start the server
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", server_config.port))
        .await
        .expect("Failed to bind to port");

    tracing::info!("Server listening on 0.0.0.0:{}", server_config.port);

    axum::serve(listener, router)
        .await
        .expect("Failed to start server");
}
