pub mod envelope;
pub mod property_dto;
pub mod upload_dto;
