use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use sysinfo::System;
use tracing::info;

use crate::{
    adapters::dto::envelope::ApiResponse,
    application::services::{TokenVerifier, UploadService},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    #[serde(rename = "listingAuth")]
    pub listing_auth: bool,
    pub metrics: SystemMetrics,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemMetrics {
    #[serde(rename = "cpuUsagePercent")]
    pub cpu_usage_percent: f32,
    #[serde(rename = "memoryUsedBytes")]
    pub memory_used_bytes: u64,
    #[serde(rename = "memoryTotalBytes")]
    pub memory_total_bytes: u64,
    #[serde(rename = "memoryUsagePercent")]
    pub memory_usage_percent: f32,
}

pub struct HealthController;

impl HealthController {
    /// GET /api/health
    pub async fn health_check(
        State(upload_service): State<UploadService>,
        State(token_verifier): State<TokenVerifier>,
    ) -> Json<ApiResponse<HealthResponse>> {
        info!("Health check requested");

        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let memory_used = sys.used_memory();
        let memory_total = sys.total_memory();
        let memory_usage_percent = if memory_total > 0 {
            (memory_used as f32 / memory_total as f32) * 100.0
        } else {
            0.0
        };

        Json(ApiResponse::success(
            HealthResponse {
                status: "healthy".to_string(),
                storage: upload_service.provider().as_str().to_string(),
                listing_auth: token_verifier.is_configured(),
                metrics: SystemMetrics {
                    cpu_usage_percent: sys.global_cpu_usage(),
                    memory_used_bytes: memory_used,
                    memory_total_bytes: memory_total,
                    memory_usage_percent,
                },
            },
            "Service healthy",
        ))
    }
}
