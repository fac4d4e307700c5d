use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart,
    },
    http::StatusCode,
};
use tracing::warn;

use crate::{application::error::ApplicationError, domain::models::file::UploadRequest};

/// A request that is not `multipart/form-data` carries no file at all.
pub fn accept_multipart(
    multipart: Result<Multipart, MultipartRejection>,
    missing_message: &str,
) -> Result<Multipart, ApplicationError> {
    multipart.map_err(|e| {
        warn!("Request is not multipart/form-data: {}", e);
        ApplicationError::BadRequest(missing_message.to_string())
    })
}

pub fn multipart_error(error: MultipartError) -> ApplicationError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Multipart body exceeded the request limit: {}", error);
        return ApplicationError::FileTooLarge;
    }
    warn!("Invalid multipart data: {}", error);
    ApplicationError::BadRequest("Invalid multipart data".to_string())
}

/// Reads a file part, stopping as soon as it grows past `max_size`.
/// An empty part without a filename (an untouched file input) yields `None`.
pub async fn read_upload(
    mut field: Field<'_>,
    max_size: u64,
) -> Result<Option<UploadRequest>, ApplicationError> {
    let filename = field.file_name().unwrap_or("").to_string();
    let mime_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let mut content = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if (content.len() + chunk.len()) as u64 > max_size {
            warn!("Upload '{}' exceeds {} bytes", filename, max_size);
            return Err(ApplicationError::FileTooLarge);
        }
        content.extend_from_slice(&chunk);
    }

    if filename.is_empty() && content.is_empty() {
        return Ok(None);
    }

    let filename = if filename.is_empty() {
        "unnamed".to_string()
    } else {
        filename
    };

    Ok(Some(UploadRequest::new(content, filename, mime_type)))
}

pub async fn read_text(field: Field<'_>) -> Result<String, ApplicationError> {
    field.text().await.map_err(multipart_error)
}
