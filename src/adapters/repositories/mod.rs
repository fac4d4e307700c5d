mod memory_property_repository;
mod pg_property_repository;

pub use memory_property_repository::InMemoryPropertyRepository;
pub use pg_property_repository::PgPropertyRepository;
