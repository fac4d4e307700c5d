use async_trait::async_trait;
use chrono::Utc;
use reqwest::{multipart, Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{
    application::{error::ApplicationError, services::StorageBackend},
    domain::{
        config::storage::CloudinarySecrets,
        models::file::{StorageProvider, StoredAsset, UploadRequest},
    },
    services::{error::StorageError, naming},
};

/// Every upload is converted to this format.
const TARGET_FORMAT: &str = "webp";
/// 1200x800 fill with automatic gravity, then automatic quality and format.
const TRANSFORMATION: &str = "c_fill,g_auto,h_800,w_1200/f_auto,q_auto";

#[derive(Debug, Deserialize)]
struct UploadApiResponse {
    public_id: String,
    secure_url: String,
    bytes: Option<u64>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadApiError {
    error: UploadApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct UploadApiErrorBody {
    message: String,
}

/// Signed uploads to the Cloudinary image upload API.
pub struct CloudinaryStorageService {
    client: Client,
    upload_url: Url,
    api_key: String,
    api_secret: String,
    folder: String,
    prefix: String,
}

impl CloudinaryStorageService {
    pub fn new(
        secrets: CloudinarySecrets,
        api_base: &str,
        folder: &str,
        prefix: &str,
    ) -> Result<Self, StorageError> {
        let valid_cloud_name = secrets
            .cloud_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_cloud_name {
            return Err(StorageError::InvalidCredentials(format!(
                "Malformed cloud name '{}'",
                secrets.cloud_name
            )));
        }

        let upload_url = Url::parse(&format!(
            "{}/{}/image/upload",
            api_base.trim_end_matches('/'),
            secrets.cloud_name
        ))
        .map_err(|e| StorageError::InvalidCredentials(format!("Invalid API endpoint: {}", e)))?;

        let client = Client::builder().build()?;

        Ok(Self {
            client,
            upload_url,
            api_key: secrets.api_key,
            api_secret: secrets.api_secret,
            folder: folder.to_string(),
            prefix: prefix.to_string(),
        })
    }

    /// SHA-256 over `k=v` pairs sorted by key and joined by `&`, followed by the secret.
    fn sign(&self, params: &[(&str, String)]) -> String {
        let mut sorted: Vec<&(&str, String)> = params.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let to_sign = sorted
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl StorageBackend for CloudinaryStorageService {
    fn provider(&self) -> StorageProvider {
        StorageProvider::Cloudinary
    }

    async fn store(&self, request: UploadRequest) -> Result<StoredAsset, ApplicationError> {
        let public_id = naming::cloud_public_id(&self.prefix);
        let params = [
            ("folder", self.folder.clone()),
            ("format", TARGET_FORMAT.to_string()),
            ("public_id", public_id.clone()),
            ("timestamp", Utc::now().timestamp().to_string()),
            ("transformation", TRANSFORMATION.to_string()),
        ];
        let signature = self.sign(&params);
        let size = request.size();

        let file_part = multipart::Part::bytes(request.content)
            .file_name(request.filename)
            .mime_str(&request.mime_type)
            .map_err(|e| StorageError::InternalError(e.to_string()))?;

        let mut form = multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in params {
            form = form.text(key, value);
        }

        debug!("Uploading {} to Cloudinary", public_id);

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(StorageError::from)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UploadApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            let error = match status.as_u16() {
                401 | 403 => StorageError::Unauthorized(message),
                _ => StorageError::ProviderError(format!("Upload failed ({}): {}", status, message)),
            };
            return Err(error.into());
        }

        let uploaded: UploadApiResponse = response
            .json()
            .await
            .map_err(|e| StorageError::ProviderError(format!("Unexpected response: {}", e)))?;

        Ok(StoredAsset {
            asset_id: uploaded.public_id.clone(),
            location: uploaded.public_id,
            public_url: Some(uploaded.secure_url),
            size: uploaded.bytes.unwrap_or(size),
            mime_type: format!(
                "image/{}",
                uploaded.format.as_deref().unwrap_or(TARGET_FORMAT)
            ),
            provider: StorageProvider::Cloudinary,
        })
    }
}
