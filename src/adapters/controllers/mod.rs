pub mod health_controller;
pub mod multipart;
pub mod property_controller;
pub mod upload_controller;
