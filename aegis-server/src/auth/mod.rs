//! JWT authentication module
//!
//! Provides the `TokenIssuer` for HS256 token issuance plus the
//! `AuthenticatedUser` extractor for Axum handlers. Tokens carry the
//! account email as `sub` and expire after the configured TTL.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::db::User;
use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims issued by this server
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account email)
    pub sub: String,
    /// Expiration time as epoch seconds (validated by jsonwebtoken)
    pub exp: u64,
    /// Issued-at time as epoch seconds
    pub iat: u64,
}

/// Issues and verifies HS256 session tokens with a single shared secret.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
}

impl TokenIssuer {
    /// Create an issuer from the shared secret and token lifetime.
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
        }
    }

    /// Issue a token for the given account email.
    pub fn issue(&self, email: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            exp: (now + Duration::minutes(self.ttl_minutes)).timestamp() as u64,
            iat: now.timestamp() as u64,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign session token");
            ApiError::internal("Failed to issue token")
        })
    }

    /// Validate a token and extract its claims.
    ///
    /// This is the core validation logic, separated for testability.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ApiError::auth_error("AUTH_TOKEN_EXPIRED", "JWT token has expired")
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    ApiError::auth_error("AUTH_INVALID_TOKEN", "Invalid JWT signature")
                }
                _ => ApiError::auth_error(
                    "AUTH_INVALID_TOKEN",
                    format!("JWT validation failed: {}", e),
                ),
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Extract the Bearer token from the Authorization header
fn extract_bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::auth_error("AUTH_MISSING_TOKEN", "Missing Authorization header")
        })?;

    let auth_value = auth_header.to_str().map_err(|_| {
        ApiError::auth_error(
            "AUTH_INVALID_TOKEN",
            "Invalid Authorization header encoding",
        )
    })?;

    auth_value.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::auth_error(
            "AUTH_INVALID_TOKEN",
            "Authorization header must use Bearer scheme",
        )
    })
}

/// Authenticated user extractor that validates the token and resolves the
/// account from the database.
///
/// The extractor:
/// 1. Reads the `Authorization: Bearer <token>` header
/// 2. Validates the HS256 signature and expiry
/// 3. Looks up the account by email (JWT `sub` claim)
///
/// Returns 401 with structured error codes on any failure.
pub struct AuthenticatedUser {
    pub user: User,
    pub email: String,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(parts)?;

        let issuer = state.token_issuer.as_ref().ok_or_else(|| {
            ApiError::service_unavailable("Token issuance not configured (missing TOKEN_SECRET)")
        })?;

        let claims = issuer.verify(token)?;

        // Look up the account in the database
        let user_repo = state
            .user_repo
            .as_ref()
            .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;

        let user = user_repo
            .find_by_email(&claims.sub)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to look up user by email");
                ApiError::internal("A database error occurred")
            })?
            .ok_or_else(|| {
                ApiError::auth_error(
                    "AUTH_USER_NOT_FOUND",
                    "Valid token but user not found in database",
                )
            })?;

        Ok(AuthenticatedUser {
            email: claims.sub,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = TokenIssuer::new("test-secret", 60);
        let token = issuer.issue("ada@example.com").unwrap();

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, "ada@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token() {
        // Negative TTL backdates the expiry past the 60s default leeway
        let issuer = TokenIssuer::new("test-secret", -2);
        let token = issuer.issue("ada@example.com").unwrap();

        let err = issuer.verify(&token).unwrap_err();
        match err {
            ApiError::AuthError { code, .. } => assert_eq!(code, "AUTH_TOKEN_EXPIRED"),
            other => panic!(
                "Expected AuthError with AUTH_TOKEN_EXPIRED, got: {:?}",
                other
            ),
        }
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenIssuer::new("test-secret", 60);
        let token = issuer.issue("ada@example.com").unwrap();

        let other_issuer = TokenIssuer::new("different-secret", 60);
        let err = other_issuer.verify(&token).unwrap_err();
        match err {
            ApiError::AuthError { code, .. } => assert_eq!(code, "AUTH_INVALID_TOKEN"),
            other => panic!(
                "Expected AuthError with AUTH_INVALID_TOKEN, got: {:?}",
                other
            ),
        }
    }

    #[test]
    fn test_garbage_token_rejected() {
        let issuer = TokenIssuer::new("test-secret", 60);

        let err = issuer.verify("not-a-valid-jwt").unwrap_err();
        match err {
            ApiError::AuthError { code, .. } => assert_eq!(code, "AUTH_INVALID_TOKEN"),
            other => panic!(
                "Expected AuthError with AUTH_INVALID_TOKEN, got: {:?}",
                other
            ),
        }
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let (parts, _) = axum::http::Request::builder()
            .body(())
            .unwrap()
            .into_parts();

        let err = extract_bearer_token(&parts).unwrap_err();
        match err {
            ApiError::AuthError { code, .. } => assert_eq!(code, "AUTH_MISSING_TOKEN"),
            other => panic!(
                "Expected AuthError with AUTH_MISSING_TOKEN, got: {:?}",
                other
            ),
        }
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let (parts, _) = axum::http::Request::builder()
            .header("Authorization", "Basic dXNlcjpwYXNz")
            .body(())
            .unwrap()
            .into_parts();

        let err = extract_bearer_token(&parts).unwrap_err();
        match err {
            ApiError::AuthError { code, .. } => assert_eq!(code, "AUTH_INVALID_TOKEN"),
            other => panic!(
                "Expected AuthError with AUTH_INVALID_TOKEN, got: {:?}",
                other
            ),
        }
    }

    #[test]
    fn test_extract_bearer_token_success() {
        let (parts, _) = axum::http::Request::builder()
            .header("Authorization", "Bearer my-jwt-token")
            .body(())
            .unwrap()
            .into_parts();

        let token = extract_bearer_token(&parts).unwrap();
        assert_eq!(token, "my-jwt-token");
    }
}
