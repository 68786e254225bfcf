//! Account handlers
//!
//! Registration plus the authenticated profile and deletion endpoints.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;
use crate::db::{CreateUser, UserResponse};
use crate::error::ApiError;
use crate::password::hash_password;
use crate::state::AppState;

/// Request for registering a new account
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Given name
    #[schema(example = "Ada")]
    pub first_name: String,
    /// Family name
    #[schema(example = "Lovelace")]
    pub last_name: String,
    /// Email address, canonicalized to lowercase
    #[schema(example = "user@example.com")]
    pub email: String,
    /// Plaintext password, hashed with bcrypt before storage
    pub password: String,
    /// Country of residence
    #[schema(example = "GB")]
    pub country: String,
    /// Whether the caller accepted the terms of service
    pub agreed_to_terms: bool,
}

/// Response for registration
#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    /// The created account
    pub user: UserResponse,
}

/// Register a new account
///
/// Creates an account keyed by lowercase email. The password is hashed
/// with bcrypt before it is stored; the plaintext is never persisted or
/// logged.
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Accounts",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email already registered"),
        (status = 503, description = "Database not available")
    )
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email address is required"));
    }
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password must not be empty"));
    }
    if !request.agreed_to_terms {
        return Err(ApiError::bad_request("Terms of service must be accepted"));
    }

    let user_repo = state
        .user_repo
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;

    // bcrypt is deliberately slow; keep it off the async workers
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Hashing task failed: {}", e)))?
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            ApiError::internal("Failed to process password")
        })?;

    let user = user_repo
        .create(CreateUser {
            first_name: request.first_name,
            last_name: request.last_name,
            email,
            password_hash,
            country: request.country,
            agreed_to_terms: request.agreed_to_terms,
        })
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::conflict("Email is already registered")
            }
            _ => {
                tracing::error!(error = %e, "Failed to create user");
                ApiError::internal("Failed to create account")
            }
        })?;

    tracing::info!(user_id = %user.id, "Account registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user: UserResponse::from(user),
        }),
    ))
}

/// Response for current user
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentUserResponse {
    /// The current user data
    pub user: UserResponse,
    /// Whether a face is enrolled for this account
    pub face_enrolled: bool,
}

/// Response for delete user
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteUserResponse {
    /// Whether the deletion was successful
    pub success: bool,
    /// Message describing the result
    pub message: String,
}

/// Get current user profile
///
/// Returns the profile of the currently authenticated user, including
/// whether a face enrollment exists for the account.
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Accounts",
    responses(
        (status = 200, description = "Current user profile", body = CurrentUserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Database not available")
    ),
    security(
        ("bearer_token" = [])
    )
)]
pub async fn get_current_user_handler(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<CurrentUserResponse>, ApiError> {
    let face_enrolled = match state.gallery_store.as_ref() {
        Some(gallery) => gallery.find_by_user(auth.user.id).await?.is_some(),
        None => false,
    };

    Ok(Json(CurrentUserResponse {
        user: UserResponse::from(auth.user),
        face_enrolled,
    }))
}

/// Delete current user account (GDPR right to erasure)
///
/// Soft deletes the account after removing its face enrollment and crop.
/// The biometric record never outlives the account it belongs to.
#[utoipa::path(
    delete,
    path = "/api/users/me",
    tag = "Accounts",
    responses(
        (status = 200, description = "Account deleted", body = DeleteUserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 503, description = "Database not available")
    ),
    security(
        ("bearer_token" = [])
    )
)]
pub async fn delete_user_handler(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<DeleteUserResponse>, ApiError> {
    let user_repo = state
        .user_repo
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;
    let gallery = state
        .gallery_store
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;

    // Remove the biometric record first so it can never outlive the account
    if let Some(enrollment) = gallery.find_by_user(auth.user.id).await? {
        if let Some(crop_store) = state.crop_store.as_ref() {
            if let Err(e) = crop_store.remove(&enrollment.crop_ref) {
                tracing::warn!(
                    error = %e,
                    crop_ref = %enrollment.crop_ref,
                    "Failed to remove face crop"
                );
            }
        }
        gallery.delete_for_user(auth.user.id).await?;
    }

    let deleted = user_repo.soft_delete(auth.user.id).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to delete user");
        ApiError::internal("Failed to delete account")
    })?;

    if deleted {
        tracing::info!(user_id = %auth.user.id, "Account soft deleted (GDPR)");

        Ok(Json(DeleteUserResponse {
            success: true,
            message: "Account and face enrollment deleted.".to_string(),
        }))
    } else {
        Err(ApiError::internal("Failed to delete account"))
    }
}
