use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::{adapters::dto::envelope::ApiResponse, application::error::ApplicationError};

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApplicationError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, msg)
            }
            ApplicationError::FileTooLarge => {
                warn!("File too large");
                (StatusCode::BAD_REQUEST, "File too large".to_string())
            }
            ApplicationError::UnsupportedMediaType(mime) => {
                warn!("Rejected upload with MIME type '{}'", mime);
                (
                    StatusCode::BAD_REQUEST,
                    "Only image files are allowed".to_string(),
                )
            }
            ApplicationError::Unauthorized => {
                warn!("Unauthorized access attempt");
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApplicationError::NotFound => {
                warn!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }
            ApplicationError::InternalError(msg) => {
                error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApplicationError::DatabaseError(msg) => {
                error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}
