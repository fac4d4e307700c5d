use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query_as, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    application::{
        dto::property_dto::NewPropertyDTO, error::ApplicationError,
        repositories::property_repository::PropertyRepository,
    },
    domain::models::{
        filter::{BedroomFilter, ListingFilter},
        property::Property,
    },
};

const SELECT_COLUMNS: &str = "id, name, description, location, price, bedrooms, \
     property_type, image_url, created_at";

#[derive(Debug, sqlx::FromRow)]
struct PropertyRecord {
    id: Uuid,
    name: String,
    description: String,
    location: String,
    price: i64,
    bedrooms: i32,
    property_type: String,
    image_url: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PropertyRecord> for Property {
    type Error = ApplicationError;

    fn try_from(record: PropertyRecord) -> Result<Self, Self::Error> {
        Ok(Property {
            id: record.id,
            name: record.name,
            description: record.description,
            location: record.location,
            price: record.price,
            bedrooms: record.bedrooms,
            property_type: record
                .property_type
                .parse()
                .map_err(ApplicationError::DatabaseError)?,
            image_url: record.image_url,
            created_at: record.created_at,
        })
    }
}

/// Listings stored in the `properties` table:
/// `id UUID PRIMARY KEY, name TEXT, description TEXT, location TEXT,
/// price BIGINT, bedrooms INT, property_type TEXT, image_url TEXT,
/// created_at TIMESTAMPTZ`.
pub struct PgPropertyRepository {
    pool: sqlx::PgPool,
}

impl PgPropertyRepository {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR location ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(ref town) = filter.town {
        builder
            .push(" AND location ILIKE ")
            .push_bind(format!("%{}%", town));
    }
    if let Some(ref property_type) = filter.property_type {
        builder
            .push(" AND LOWER(property_type) = LOWER(")
            .push_bind(property_type.clone())
            .push(")");
    }
    match filter.bedrooms {
        Some(BedroomFilter::Exact(n)) => {
            builder.push(" AND bedrooms = ").push_bind(n);
        }
        Some(BedroomFilter::AtLeast(n)) => {
            builder.push(" AND bedrooms >= ").push_bind(n);
        }
        None => {}
    }
    if let Some(min) = filter.min_price {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        builder.push(" AND price <= ").push_bind(max);
    }
}

#[async_trait]
impl PropertyRepository for PgPropertyRepository {
    async fn list_properties(
        &self,
        filter: &ListingFilter,
    ) -> Result<Vec<Property>, ApplicationError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM properties WHERE TRUE",
            SELECT_COLUMNS
        ));
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC");

        let records: Vec<PropertyRecord> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        records.into_iter().map(Property::try_from).collect()
    }

    async fn create_property(&self, property: NewPropertyDTO) -> Result<Property, ApplicationError> {
        let query = format!(
            "INSERT INTO properties ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
            SELECT_COLUMNS, SELECT_COLUMNS
        );

        let created: PropertyRecord = query_as::<_, PropertyRecord>(&query)
            .bind(Uuid::new_v4())
            .bind(&property.name)
            .bind(&property.description)
            .bind(&property.location)
            .bind(property.price)
            .bind(property.bedrooms)
            .bind(property.property_type.as_str())
            .bind(&property.image_url)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApplicationError::DatabaseError(e.to_string()))?;

        created.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_renders_bound_conditions() {
        let filter = ListingFilter::from_pairs([
            ("search", "sea"),
            ("type", "villa"),
            ("bedrooms", "4+"),
            ("maxPrice", "9000"),
        ])
        .unwrap();
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM properties WHERE TRUE");

        push_filter(&mut builder, &filter);

        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM properties WHERE TRUE \
             AND (name ILIKE $1 OR location ILIKE $2 OR description ILIKE $3) \
             AND LOWER(property_type) = LOWER($4) AND bedrooms >= $5 AND price <= $6"
        );
    }
}
