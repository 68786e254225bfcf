//! Face enrollment and face login handlers
//!
//! Both endpoints run the same front half: multipart parsing, image
//! decoding, and single-face extraction on a blocking-safe thread. They
//! diverge afterwards, enrollment writing the gallery and login matching
//! against a snapshot of it.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use aegis_core::{crop_face, decode_image, match_probe, FaceDescriptor, MatchOutcome, RejectionReason};

use crate::error::ApiError;
use crate::gallery_store::EnrollmentInput;
use crate::multipart::MultipartFields;
use crate::state::AppState;

/// Response for face enrollment
#[derive(Debug, Serialize, ToSchema)]
pub struct EnrollFaceResponse {
    /// Whether the enrollment was stored
    pub success: bool,
    /// Owning account id
    #[schema(value_type = String, example = "550e8400-e29b-41d4-a716-446655440000")]
    pub user_id: Uuid,
    /// Stored crop handle
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000.jpg")]
    pub crop_ref: String,
}

/// Response for face login
#[derive(Debug, Serialize, ToSchema)]
pub struct FaceLoginResponse {
    /// Signed session token
    pub access_token: String,
    /// Always "bearer"
    #[schema(example = "bearer")]
    pub token_type: &'static str,
    /// Email of the matched account
    #[schema(example = "user@example.com")]
    pub email: String,
}

/// Enroll or replace the face for an account
///
/// Pipeline: parse multipart → decode image → extract exactly one face →
/// crop the detected region → store the crop → upsert the descriptor.
/// The account must already exist.
#[utoipa::path(
    post,
    path = "/api/faces/enroll",
    tag = "Faces",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields: 'email' (text) and 'file' (face photo)"
    ),
    responses(
        (status = 200, description = "Face enrolled", body = EnrollFaceResponse),
        (status = 400, description = "Missing field, oversized upload, or undecodable image"),
        (status = 404, description = "No account registered for this email"),
        (status = 422, description = "Zero or multiple faces in the photo"),
        (status = 503, description = "Database or face oracle not available")
    )
)]
pub async fn enroll_face_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EnrollFaceResponse>, ApiError> {
    let user_repo = state
        .user_repo
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;
    let gallery = state
        .gallery_store
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;
    let extractor = state
        .extractor
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Face oracle not configured"))?;
    let crop_store = state
        .crop_store
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Crop storage not configured"))?;

    let fields = MultipartFields::parse(&mut multipart, true, state.max_file_size).await?;
    let email = fields.require_text("email")?.trim().to_lowercase();
    let file = fields.require_file()?;

    // The account must pre-exist; this is checked before any face work
    let user = user_repo
        .find_by_email(&email)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to look up user by email");
            ApiError::internal("A database error occurred")
        })?
        .ok_or_else(|| ApiError::not_found("No account registered for this email"))?;

    // Decode, detect, crop, and persist the crop on a blocking-safe thread
    let data = file.data.clone();
    let extractor = Arc::clone(extractor);
    let crop_store = Arc::clone(crop_store);
    let user_id = user.id;
    let (descriptor, crop_ref) = tokio::task::spawn_blocking(
        move || -> Result<(FaceDescriptor, String), ApiError> {
            let image = decode_image(&data)?;
            let face = extractor.extract_exactly_one(&image)?;
            let crop = crop_face(&image, &face.region)?;
            let crop_ref = crop_store.save_jpeg(user_id, &crop).map_err(|e| {
                tracing::error!(error = %e, "Failed to store face crop");
                ApiError::internal("Failed to store face crop")
            })?;
            Ok((face.descriptor, crop_ref))
        },
    )
    .await
    .map_err(|e| ApiError::internal(format!("Face processing task failed: {}", e)))??;

    gallery
        .enroll(&EnrollmentInput {
            user_id: user.id,
            descriptor,
            crop_ref: crop_ref.clone(),
        })
        .await?;

    tracing::info!(user_id = %user.id, "Face enrolled");

    Ok(Json(EnrollFaceResponse {
        success: true,
        user_id: user.id,
        crop_ref,
    }))
}

/// Log in with a face photo
///
/// Pipeline: parse multipart → decode image → extract exactly one face →
/// match against a gallery snapshot → resolve the account → issue a
/// token. All recognition failures answer with the same generic 401;
/// only client-fixable input problems (no face, several faces) are
/// reported precisely.
#[utoipa::path(
    post,
    path = "/api/login/face",
    tag = "Auth",
    request_body(
        content_type = "multipart/form-data",
        description = "Field: 'file' (probe photo)"
    ),
    responses(
        (status = 200, description = "Face recognized", body = FaceLoginResponse),
        (status = 400, description = "Missing file, oversized upload, or undecodable image"),
        (status = 401, description = "Face not recognized"),
        (status = 422, description = "Zero or multiple faces in the photo"),
        (status = 503, description = "Database, face oracle, or token issuance not available")
    )
)]
pub async fn face_login_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<FaceLoginResponse>, ApiError> {
    let user_repo = state
        .user_repo
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;
    let gallery = state
        .gallery_store
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Database not configured"))?;
    let extractor = state
        .extractor
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Face oracle not configured"))?;
    let issuer = state.token_issuer.as_ref().ok_or_else(|| {
        ApiError::service_unavailable("Token issuance not configured (missing TOKEN_SECRET)")
    })?;

    let fields = MultipartFields::parse(&mut multipart, true, state.max_file_size).await?;
    let file = fields.require_file()?;

    // Extraction runs before any gallery access, so a malformed probe is
    // reported as such even when the gallery is empty
    let data = file.data.clone();
    let extractor = Arc::clone(extractor);
    let descriptor =
        tokio::task::spawn_blocking(move || -> Result<FaceDescriptor, ApiError> {
            let image = decode_image(&data)?;
            let face = extractor.extract_exactly_one(&image)?;
            Ok(face.descriptor)
        })
        .await
        .map_err(|e| ApiError::internal(format!("Face processing task failed: {}", e)))??;

    let snapshot = gallery.snapshot().await?;

    match match_probe(&descriptor, &snapshot, state.match_policy) {
        MatchOutcome::Matched { identity, distance } => {
            let user = user_repo
                .find_by_email(&identity)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to look up matched identity");
                    ApiError::internal("A database error occurred")
                })?
                .ok_or_else(|| ApiError::face_not_recognized(RejectionReason::IdentityNotFound))?;

            let access_token = issuer.issue(&user.email)?;

            tracing::info!(user_id = %user.id, distance, "Face login accepted");

            Ok(Json(FaceLoginResponse {
                access_token,
                token_type: "bearer",
                email: user.email,
            }))
        }
        MatchOutcome::Rejected(reason) => Err(ApiError::face_not_recognized(reason)),
    }
}
