pub mod auth_service;
pub mod storage_service;
pub mod upload_service;

pub use auth_service::{Claims, TokenVerifier};
pub use storage_service::StorageBackend;
pub use upload_service::{PublicOrigin, UploadPolicy, UploadService};
