use std::sync::Arc;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State,
    },
    http::StatusCode,
    Extension, Json,
};
use tracing::{debug, info};

use crate::{
    adapters::{
        controllers::multipart::{accept_multipart, multipart_error, read_text, read_upload},
        dto::{
            envelope::ApiResponse,
            property_dto::{PropertyForm, PropertyResponse},
        },
    },
    application::{
        error::ApplicationError,
        repositories::property_repository::PropertyRepository,
        services::{
            upload_service::MAX_FILE_SIZE, Claims, PublicOrigin, UploadPolicy, UploadService,
        },
    },
    domain::models::filter::ListingFilter,
};

const IMAGE_REQUIRED: &str = "Property image is required";

pub struct PropertyController;

impl PropertyController {
    /// GET /api/resource?search=&town=&type=&bedrooms=&minPrice=&maxPrice=
    pub async fn list_properties(
        State(property_repository): State<Arc<dyn PropertyRepository>>,
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Json<ApiResponse<Vec<PropertyResponse>>>, ApplicationError> {
        let Query(pairs) = query.map_err(|e| {
            ApplicationError::BadRequest(format!("Invalid query string: {}", e.body_text()))
        })?;

        let filter =
            ListingFilter::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        if filter.is_empty() {
            debug!("Listing all properties");
        } else {
            debug!("Listing properties with filter '{}'", filter.to_query_string());
        }

        let properties = property_repository.list_properties(&filter).await?;

        Ok(Json(ApiResponse::success(
            properties.into_iter().map(PropertyResponse::from).collect(),
            "Properties retrieved",
        )))
    }

    /// POST /api/resource
    /// Bearer-authenticated listing submission with a single `image` file.
    pub async fn create_property(
        State(upload_service): State<UploadService>,
        State(property_repository): State<Arc<dyn PropertyRepository>>,
        Extension(claims): Extension<Claims>,
        origin: PublicOrigin,
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<(StatusCode, Json<ApiResponse<PropertyResponse>>), ApplicationError> {
        let mut multipart = accept_multipart(multipart, IMAGE_REQUIRED)?;
        let mut form = PropertyForm::default();
        let mut image = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "image" => {
                    let Some(file) = read_upload(field, MAX_FILE_SIZE).await? else {
                        continue;
                    };
                    if image.is_some() {
                        return Err(ApplicationError::BadRequest(
                            "Unexpected field: only one 'image' file is accepted".to_string(),
                        ));
                    }
                    image = Some(file);
                }
                field_name if PropertyForm::FIELDS.contains(&field_name) => {
                    let value = read_text(field).await?;
                    form.set(&name, value);
                }
                _ => debug!("Ignoring field '{}'", name),
            }
        }

        // Nothing is stored until the whole submission is known to be valid.
        let mut property = form.validate()?;
        let image =
            image.ok_or_else(|| ApplicationError::BadRequest(IMAGE_REQUIRED.to_string()))?;

        property.image_url = upload_service
            .upload_one(image, UploadPolicy::listing_form(), &origin)
            .await?;

        let created = property_repository.create_property(property).await?;
        info!("Property {} listed by {}", created.id, claims.sub);

        Ok((
            StatusCode::CREATED,
            Json(ApiResponse::success(
                PropertyResponse::from(created),
                "Property created",
            )),
        ))
    }
}
