pub mod property_dto;
