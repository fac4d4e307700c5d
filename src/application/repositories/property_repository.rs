use async_trait::async_trait;

use crate::{
    application::{dto::property_dto::NewPropertyDTO, error::ApplicationError},
    domain::models::{filter::ListingFilter, property::Property},
};

#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Newest first.
    async fn list_properties(&self, filter: &ListingFilter)
        -> Result<Vec<Property>, ApplicationError>;
    async fn create_property(&self, property: NewPropertyDTO) -> Result<Property, ApplicationError>;
}
