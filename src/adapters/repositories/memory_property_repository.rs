use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    application::{
        dto::property_dto::NewPropertyDTO, error::ApplicationError,
        repositories::property_repository::PropertyRepository,
    },
    domain::models::{filter::ListingFilter, property::Property},
};

/// Process-local listing store, used when no database is configured.
#[derive(Default)]
pub struct InMemoryPropertyRepository {
    properties: RwLock<Vec<Property>>,
}

impl InMemoryPropertyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PropertyRepository for InMemoryPropertyRepository {
    async fn list_properties(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<Property>, ApplicationError> {
        let properties = self.properties.read().await;
        let mut matching: Vec<Property> = properties
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn create_property(&self, property: NewPropertyDTO) -> Result<Property, ApplicationError> {
        let created = Property {
            id: Uuid::new_v4(),
            name: property.name,
            description: property.description,
            location: property.location,
            price: property.price,
            bedrooms: property.bedrooms,
            property_type: property.property_type,
            image_url: property.image_url,
            created_at: Utc::now(),
        };

        self.properties.write().await.push(created.clone());
        Ok(created)
    }
}
