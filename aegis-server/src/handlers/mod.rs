//! HTTP request handlers
//!
//! This module contains all the request handlers for the API endpoints.

pub mod face;
pub mod health;
pub mod login;
pub mod user;

pub use crate::state::AppState;
pub use face::{enroll_face_handler, face_login_handler, EnrollFaceResponse, FaceLoginResponse};
pub use health::{health, ready, HealthResponse, ReadyResponse};
pub use login::{login_handler, LoginRequest, TokenResponse};
pub use user::{
    delete_user_handler, get_current_user_handler, register_handler, CurrentUserResponse,
    DeleteUserResponse, RegisterRequest, RegisterResponse,
};
