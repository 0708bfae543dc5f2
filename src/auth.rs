use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::models::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(secret: &str, ttl_seconds: i64, user_id: Uuid, role: UserRole) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| AppError::Internal(format!("failed to sign token: {err}")))
}

pub fn decode_claims(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("invalid or expired token".to_string()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the authenticated principal from the `Authorization` header.
/// Every protected handler calls this explicitly; there is no ambient
/// request context.
pub fn require_user(config: &AppConfig, headers: &HeaderMap) -> AppResult<Claims> {
    let token = bearer_token(headers)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;
    decode_claims(&config.jwt_secret, token)
}

pub fn require_owner(config: &AppConfig, headers: &HeaderMap) -> AppResult<Claims> {
    let claims = require_user(config, headers)?;
    if claims.role != UserRole::Owner {
        return Err(AppError::Forbidden("owner role required".to_string()));
    }
    Ok(claims)
}

pub fn require_renter(config: &AppConfig, headers: &HeaderMap) -> AppResult<Claims> {
    let claims = require_user(config, headers)?;
    if claims.role != UserRole::User {
        return Err(AppError::Forbidden("tenant role required".to_string()));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::{decode_claims, issue_token};
    use crate::models::UserRole;
    use uuid::Uuid;

    #[test]
    fn token_round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue_token("test-secret", 3600, user_id, UserRole::Owner).expect("token");
        let claims = decode_claims("test-secret", &token).expect("claims");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Owner);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = issue_token("secret-a", 3600, Uuid::new_v4(), UserRole::User).expect("token");
        assert!(decode_claims("secret-b", &token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        // well past the default decode leeway
        let token = issue_token("secret", -600, Uuid::new_v4(), UserRole::User).expect("token");
        assert!(decode_claims("secret", &token).is_err());
    }
}
