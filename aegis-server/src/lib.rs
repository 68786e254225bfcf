//! Aegis Server Library - REST API components for face-recognition login
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod auth;
pub mod config;
pub mod crop_store;
pub mod db;
pub mod error;
pub mod gallery_store;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod password;
pub mod routes;
pub mod state;
pub mod validation;

pub use auth::{AuthenticatedUser, Claims, TokenIssuer};
pub use config::Config;
pub use crop_store::{CropStore, CropStoreError};
pub use db::{CreateUser, User, UserRepository, UserResponse};
pub use error::ApiError;
pub use gallery_store::{
    EnrollmentInput, EnrollmentRecord, GalleryStoreError, PostgresGalleryStore,
};
pub use openapi::ApiDoc;
pub use routes::{create_router, create_router_with_config};
pub use state::AppState;
