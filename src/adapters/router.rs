use std::path::Path;

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    adapters::{
        controllers::{
            health_controller::HealthController, property_controller::PropertyController,
            upload_controller::UploadController,
        },
        middleware::require_bearer_token,
        state::AppState,
    },
    application::{
        error::ApplicationError,
        services::upload_service::{MAX_FILES_PER_REQUEST, MAX_FILE_SIZE},
    },
};

/// Room for a full batch plus multipart framing and text fields.
pub const MAX_REQUEST_BODY: usize = MAX_FILES_PER_REQUEST * MAX_FILE_SIZE as usize + 1024 * 1024;

async fn route_not_found() -> ApplicationError {
    ApplicationError::NotFound
}

pub fn build_router(state: AppState, upload_dir: &Path, cors: CorsLayer) -> Router {
    let create_property = PropertyController::create_property.layer(
        middleware::from_fn_with_state(state.clone(), require_bearer_token),
    );

    Router::new()
        .route("/api/health", get(HealthController::health_check))
        .route("/api/upload", post(UploadController::upload_single))
        .route("/api/upload/multi", post(UploadController::upload_multiple))
        .route(
            "/api/resource",
            get(PropertyController::list_properties).post(create_property),
        )
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .fallback(route_not_found)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
