use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::application::{error::ApplicationError, services::TokenVerifier};

/// Requires `Authorization: Bearer <jwt>` and stores the verified claims in
/// the request extensions.
pub async fn require_bearer_token(
    State(verifier): State<TokenVerifier>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApplicationError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            warn!("Missing or malformed Authorization header");
            ApplicationError::Unauthorized
        })?;

    let claims = verifier.verify(token)?;
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
