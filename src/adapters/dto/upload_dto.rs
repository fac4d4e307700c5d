use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MultiUploadResponse {
    pub urls: Vec<String>,
}
