use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    application::{dto::property_dto::NewPropertyDTO, error::ApplicationError},
    domain::models::property::{Property, PropertyType},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct PropertyResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub bedrooms: i32,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<Property> for PropertyResponse {
    fn from(property: Property) -> Self {
        Self {
            id: property.id,
            name: property.name,
            description: property.description,
            location: property.location,
            price: property.price,
            bedrooms: property.bedrooms,
            property_type: property.property_type,
            image_url: property.image_url,
            created_at: property.created_at,
        }
    }
}

/// Text fields of the listing submission form, as received.
#[derive(Debug, Default)]
pub struct PropertyForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<String>,
    pub bedrooms: Option<String>,
    pub property_type: Option<String>,
}

impl PropertyForm {
    pub const FIELDS: [&'static str; 6] =
        ["name", "description", "location", "price", "bedrooms", "type"];

    pub fn set(&mut self, field: &str, value: String) {
        let slot = match field {
            "name" => &mut self.name,
            "description" => &mut self.description,
            "location" => &mut self.location,
            "price" => &mut self.price,
            "bedrooms" => &mut self.bedrooms,
            "type" => &mut self.property_type,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Validates and converts the form; `image_url` is left empty for the
    /// caller to fill in once the image is stored.
    pub fn validate(self) -> Result<NewPropertyDTO, ApplicationError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ApplicationError::BadRequest("Property title is required".to_string()))?;

        let price = match non_empty(self.price) {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|p| *p >= 0)
                .ok_or_else(|| ApplicationError::BadRequest(format!("Invalid price: {}", raw)))?,
            None => 0,
        };

        let bedrooms = match non_empty(self.bedrooms) {
            Some(raw) => raw
                .parse::<i32>()
                .ok()
                .filter(|b| *b >= 0)
                .ok_or_else(|| {
                    ApplicationError::BadRequest(format!("Invalid bedrooms: {}", raw))
                })?,
            None => 1,
        };

        let property_type = match non_empty(self.property_type) {
            Some(raw) => raw
                .parse::<PropertyType>()
                .map_err(ApplicationError::BadRequest)?,
            None => PropertyType::default(),
        };

        Ok(NewPropertyDTO {
            name,
            description: non_empty(self.description).unwrap_or_default(),
            location: non_empty(self.location).unwrap_or_default(),
            price,
            bedrooms,
            property_type,
            image_url: String::new(),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(fields: &[(&str, &str)]) -> PropertyForm {
        let mut form = PropertyForm::default();
        for (key, value) in fields {
            form.set(key, value.to_string());
        }
        form
    }

    #[test]
    fn applies_form_defaults() {
        let dto = form(&[("name", "  Ocean-view Cottage "), ("price", "")])
            .validate()
            .unwrap();

        assert_eq!(dto.name, "Ocean-view Cottage");
        assert_eq!(dto.price, 0);
        assert_eq!(dto.bedrooms, 1);
        assert_eq!(dto.property_type, PropertyType::Apartment);
        assert!(dto.image_url.is_empty());
    }

    #[test]
    fn parses_all_fields() {
        let dto = form(&[
            ("name", "Palm Villa"),
            ("description", "Pool and garden"),
            ("location", "Watamu"),
            ("price", "3000"),
            ("bedrooms", "5"),
            ("type", "Villa"),
        ])
        .validate()
        .unwrap();

        assert_eq!(dto.location, "Watamu");
        assert_eq!(dto.price, 3000);
        assert_eq!(dto.bedrooms, 5);
        assert_eq!(dto.property_type, PropertyType::Villa);
    }

    #[test]
    fn rejects_invalid_fields() {
        assert!(form(&[("name", "   ")]).validate().is_err());
        assert!(form(&[("name", "A"), ("price", "-5")]).validate().is_err());
        assert!(form(&[("name", "A"), ("price", "3k")]).validate().is_err());
        assert!(form(&[("name", "A"), ("bedrooms", "many")]).validate().is_err());
        assert!(form(&[("name", "A"), ("type", "Castle")]).validate().is_err());
    }
}
