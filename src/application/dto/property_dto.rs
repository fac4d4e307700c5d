use crate::domain::models::property::PropertyType;

/// A validated listing submission, ready to be persisted once its image URL is known.
#[derive(Debug, Clone, Default)]
pub struct NewPropertyDTO {
    pub name: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub bedrooms: i32,
    pub property_type: PropertyType,
    pub image_url: String,
}
