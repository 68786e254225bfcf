//! Password login handler
//!
//! Verifies the bcrypt hash and issues a session token. Any failure,
//! unknown email or wrong password alike, answers with one and the same
//! 401 so the response never reveals which part was wrong.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::password::verify_password;
use crate::state::AppState;

/// Request for password login
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Bearer token response
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed session token
    pub access_token: String,
    /// Always "bearer"
    #[schema(example = "bearer")]
    pub token_type: &'static str,
}

/// Log in with email and password
///
/// Returns a bearer token on success. Failed attempts carry a
/// `WWW-Authenticate: Bearer` header with the 401.
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login succeeded", body = TokenResponse),
        (status = 401, description = "Unknown email or wrong password"),
        (status = 503, description = "Database or token issuance not available")
    )
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user_repo = state
        .user_repo
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;
    let issuer = state.token_issuer.as_ref().ok_or_else(|| {
        ApiError::service_unavailable("Token issuance not configured (missing TOKEN_SECRET)")
    })?;

    let email = request.email.trim().to_lowercase();

    let user = user_repo
        .find_by_email(&email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to look up user by email");
            ApiError::internal("A database error occurred")
        })?
        .ok_or_else(ApiError::invalid_credentials)?;

    // bcrypt verification is deliberately slow; keep it off the async workers
    let password = request.password;
    let password_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
        .await
        .map_err(|e| ApiError::internal(format!("Verification task failed: {}", e)))?;

    if !verified {
        return Err(ApiError::invalid_credentials());
    }

    let access_token = issuer.issue(&user.email)?;

    tracing::info!(user_id = %user.id, "Password login accepted");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}
