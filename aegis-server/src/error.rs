//! API error handling module
//!
//! Provides a unified error type for all API endpoints with structured error variants.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use aegis_core::{FaceEngineError, RejectionReason};

use crate::gallery_store::GalleryStoreError;

/// API error type with structured variants for different error categories
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - client provided invalid input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unauthorized - missing or invalid authentication
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Password login failed - which of email/password was wrong is never disclosed
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Face login rejected - the precise reason is logged but never sent to the client
    #[error("Face not recognized: {reason}")]
    FaceNotRecognized { reason: RejectionReason },

    /// Not found - requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict - resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Request timeout - operation took too long
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Internal server error - unexpected server-side failure
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable - required service is not configured or available
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Authentication error with specific error code
    #[error("{message}")]
    AuthError { message: String, code: String },

    /// Face engine error - error from the face extraction library
    #[error("Face engine error: {0}")]
    Face(#[from] FaceEngineError),

    /// Gallery store error - error from the enrollment database
    #[error("Gallery store error: {0}")]
    Store(#[from] GalleryStoreError),
}

impl ApiError {
    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// Create an invalid credentials error
    pub fn invalid_credentials() -> Self {
        Self::InvalidCredentials
    }

    /// Create a face rejection error carrying the internal reason
    pub fn face_not_recognized(reason: RejectionReason) -> Self {
        Self::FaceNotRecognized { reason }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Create a service unavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }

    /// Create an authentication error with a specific error code
    pub fn auth_error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AuthError {
            message: message.into(),
            code: code.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_)
            | Self::InvalidCredentials
            | Self::FaceNotRecognized { .. }
            | Self::AuthError { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Face(ref e) => match e {
                // Image carried the wrong number of faces → 422 Unprocessable Entity
                FaceEngineError::NoFaceDetected | FaceEngineError::MultipleFacesDetected(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }

                // Client-provided bytes were not a decodable image → 400
                FaceEngineError::ImageDecode(_) => StatusCode::BAD_REQUEST,

                // Internal processing failures → 500
                FaceEngineError::DescriptorLength { .. } | FaceEngineError::Oracle(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }

                // Model files missing or unreadable → 503
                FaceEngineError::ModelLoad { .. } => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Store(ref e) => match e {
                GalleryStoreError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
                GalleryStoreError::NotFound => StatusCode::NOT_FOUND,
                GalleryStoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                GalleryStoreError::Migration(_)
                | GalleryStoreError::Query(_)
                | GalleryStoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for programmatic error handling
    fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "INVALID_INPUT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::FaceNotRecognized { .. } => "FACE_NOT_RECOGNIZED",
            Self::AuthError { .. } => "AUTH_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Timeout(_) => "TIMEOUT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Face(ref e) => match e {
                FaceEngineError::NoFaceDetected => "NO_FACE_DETECTED",
                FaceEngineError::MultipleFacesDetected(_) => "MULTIPLE_FACES_DETECTED",
                FaceEngineError::ImageDecode(_) => "IMAGE_DECODE_ERROR",
                FaceEngineError::DescriptorLength { .. } => "DESCRIPTOR_ERROR",
                FaceEngineError::Oracle(_) => "ORACLE_ERROR",
                FaceEngineError::ModelLoad { .. } => "MODEL_UNAVAILABLE",
            },
            Self::Store(ref e) => match e {
                GalleryStoreError::Connection(_) => "STORE_UNAVAILABLE",
                GalleryStoreError::NotFound => "NOT_FOUND",
                GalleryStoreError::InvalidInput(_) => "INVALID_INPUT",
                GalleryStoreError::Migration(_)
                | GalleryStoreError::Query(_)
                | GalleryStoreError::Serialization(_) => "STORE_ERROR",
            },
        }
    }

    /// Get sanitized error message for client response
    fn client_message(&self) -> String {
        match self {
            // The matcher's verdict never reaches the client in detail
            Self::FaceNotRecognized { .. } => "Face not recognized".to_string(),
            // For face engine errors, sanitize internal details
            Self::Face(ref e) => match e {
                FaceEngineError::NoFaceDetected => "No face detected in the image".to_string(),
                FaceEngineError::MultipleFacesDetected(count) => {
                    format!("Expected exactly one face, found {}", count)
                }
                FaceEngineError::ImageDecode(_) => "Could not decode image".to_string(),
                FaceEngineError::DescriptorLength { .. } => "Face descriptor error".to_string(),
                FaceEngineError::Oracle(_) => "Face encoding failed".to_string(),
                FaceEngineError::ModelLoad { .. } => {
                    "Face recognition models unavailable".to_string()
                }
            },
            // For store errors, never leak SQL or connection details
            Self::Store(ref e) => match e {
                GalleryStoreError::Connection(_) => "Enrollment store unavailable".to_string(),
                GalleryStoreError::NotFound => "Enrollment not found".to_string(),
                GalleryStoreError::InvalidInput(_) => "Invalid enrollment input".to_string(),
                GalleryStoreError::Migration(_)
                | GalleryStoreError::Query(_)
                | GalleryStoreError::Serialization(_) => "Enrollment store error".to_string(),
            },
            // For other errors, use the Display message
            _ => self.to_string(),
        }
    }

    /// Get the error category for logging
    fn error_category(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::FaceNotRecognized { .. } => "face_not_recognized",
            Self::AuthError { .. } => "auth_error",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal",
            Self::ServiceUnavailable(_) => "service_unavailable",
            Self::Face(_) => "face_engine",
            Self::Store(_) => "gallery_store",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.error_category();
        // AuthError carries its own code (AUTH_MISSING_TOKEN etc.)
        let code = match &self {
            Self::AuthError { code, .. } => code.clone(),
            _ => self.error_code().to_string(),
        };
        let internal_message = self.to_string();
        let client_message = self.client_message();

        // Log based on severity, always including internal details
        match &self {
            Self::BadRequest(_) | Self::NotFound(_) | Self::Conflict(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = %code,
                    error = %internal_message,
                    "Client error"
                );
            }
            Self::Unauthorized(_) | Self::InvalidCredentials | Self::AuthError { .. } => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = %code,
                    error = %internal_message,
                    "Authentication error"
                );
            }
            // The rejection reason lands in the log, not in the response body
            Self::FaceNotRecognized { reason } => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = %code,
                    reason = %reason,
                    "Face login rejected"
                );
            }
            Self::ServiceUnavailable(_) => {
                tracing::warn!(
                    status = %status,
                    category = category,
                    code = %code,
                    error = %internal_message,
                    "Service unavailable"
                );
            }
            Self::Timeout(_) | Self::Internal(_) => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = %code,
                    error = %internal_message,
                    "Server error"
                );
            }
            Self::Face(e) => match e {
                FaceEngineError::NoFaceDetected
                | FaceEngineError::MultipleFacesDetected(_)
                | FaceEngineError::ImageDecode(_) => {
                    tracing::warn!(
                        status = %status,
                        category = category,
                        code = %code,
                        error = %internal_message,
                        "Face processing rejected"
                    );
                }
                _ => {
                    tracing::error!(
                        status = %status,
                        category = category,
                        code = %code,
                        error = %internal_message,
                        "Face engine error"
                    );
                }
            },
            // For store errors, log full internal details
            Self::Store(_) => {
                tracing::error!(
                    status = %status,
                    category = category,
                    code = %code,
                    error = %internal_message,
                    client_message = %client_message,
                    "Gallery store error (internal details logged)"
                );
            }
        }

        // All error responses include a `code` field for programmatic error handling
        let body = serde_json::json!({
            "error": client_message,
            "code": code,
        });

        let mut response = (status, Json(body)).into_response();

        // Only password login failures advertise the bearer scheme.
        if matches!(self, Self::InvalidCredentials) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}
