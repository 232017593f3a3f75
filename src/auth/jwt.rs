use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff session token claims. Identity is the user id alone; role and
/// active status are read from the directory on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user_id: Uuid, valid_for: Duration) -> Result<Self> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(valid_for)
            .ok_or_else(|| AppError::Internal("Token expiration overflow".to_string()))?;

        Ok(Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub", "exp"]);
    validation
}

pub fn create_jwt(user_id: Uuid, secret: &str, expiration_hours: i64) -> Result<String> {
    let claims = Claims::for_user(user_id, Duration::hours(expiration_hours))?;

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
}

/// Verifies signature and expiry and returns the viewer's id.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Uuid> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map(|data| data.claims.sub)
    .map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        AppError::Unauthorized("Invalid or expired token".to_string())
    })
}
