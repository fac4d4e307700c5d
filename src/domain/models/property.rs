use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    Apartment,
    Villa,
    House,
    Condo,
    Cottage,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        PropertyType::Apartment,
        PropertyType::Villa,
        PropertyType::House,
        PropertyType::Condo,
        PropertyType::Cottage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "Apartment",
            PropertyType::Villa => "Villa",
            PropertyType::House => "House",
            PropertyType::Condo => "Condo",
            PropertyType::Cottage => "Cottage",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown property type: {}", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub bedrooms: i32,
    pub property_type: PropertyType,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}
