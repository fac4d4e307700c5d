use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, warn};

use crate::{
    adapters::{
        controllers::multipart::{accept_multipart, multipart_error, read_upload},
        dto::{
            envelope::ApiResponse,
            upload_dto::{MultiUploadResponse, UploadResponse},
        },
    },
    application::{
        error::{ApplicationError, NO_FILES_UPLOADED, NO_FILE_UPLOADED},
        services::{
            upload_service::{MAX_FILES_PER_REQUEST, MAX_FILE_SIZE},
            PublicOrigin, UploadPolicy, UploadService,
        },
    },
};

const SINGLE_FIELD: &str = "image";
const MULTI_FIELD: &str = "images";

pub struct UploadController;

impl UploadController {
    /// POST /api/upload
    /// Form field `image`, one file.
    pub async fn upload_single(
        State(upload_service): State<UploadService>,
        origin: PublicOrigin,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApplicationError> {
        let mut multipart = accept_multipart(multipart, NO_FILE_UPLOADED)?;
        let mut upload = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            if name != SINGLE_FIELD {
                debug!("Ignoring field '{}'", name);
                continue;
            }
            let Some(file) = read_upload(field, MAX_FILE_SIZE).await? else {
                continue;
            };
            if upload.is_some() {
                return Err(ApplicationError::BadRequest(format!(
                    "Unexpected field: only one '{}' file is accepted",
                    SINGLE_FIELD
                )));
            }
            upload = Some(file);
        }

        let upload = upload.ok_or_else(|| {
            warn!("Missing '{}' field in upload", SINGLE_FIELD);
            ApplicationError::BadRequest(NO_FILE_UPLOADED.to_string())
        })?;

        let url = upload_service
            .upload_one(upload, UploadPolicy::direct(), &origin)
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(UploadResponse { url }, "File uploaded")),
        ))
    }

    /// POST /api/upload/multi
    /// Form field `images`, up to 12 files; URLs come back in submission order.
    pub async fn upload_multiple(
        State(upload_service): State<UploadService>,
        origin: PublicOrigin,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<(StatusCode, Json<ApiResponse<MultiUploadResponse>>), ApplicationError> {
        let mut multipart = accept_multipart(multipart, NO_FILES_UPLOADED)?;
        let mut uploads = Vec::new();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            if name != MULTI_FIELD {
                debug!("Ignoring field '{}'", name);
                continue;
            }
            let Some(upload) = read_upload(field, MAX_FILE_SIZE).await? else {
                continue;
            };
            if uploads.len() == MAX_FILES_PER_REQUEST {
                return Err(ApplicationError::BadRequest(format!(
                    "Too many files: at most {} allowed",
                    MAX_FILES_PER_REQUEST
                )));
            }
            uploads.push(upload);
        }

        let urls = upload_service
            .upload_many(uploads, UploadPolicy::direct(), &origin)
            .await?;

        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(
                MultiUploadResponse { urls },
                "Files uploaded",
            )),
        ))
    }
}
