use std::sync::Arc;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::error::ApplicationError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies HS256 bearer tokens. Without a secret every token is rejected.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Option<Arc<DecodingKey>>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        Self {
            key: secret.map(|s| Arc::new(DecodingKey::from_secret(s.as_bytes()))),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.key.is_some()
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApplicationError> {
        let key = self.key.as_ref().ok_or_else(|| {
            warn!("Bearer token presented but JWT_SECRET is not configured");
            ApplicationError::Unauthorized
        })?;

        decode::<Claims>(token, key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!("Rejected bearer token: {}", e);
                ApplicationError::Unauthorized
            })
    }
}
