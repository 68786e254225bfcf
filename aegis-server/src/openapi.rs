//! OpenAPI documentation configuration
//!
//! Generates the OpenAPI 3.0 specification for the Aegis face-login API.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers::{
    CurrentUserResponse, DeleteUserResponse, EnrollFaceResponse, FaceLoginResponse,
    HealthResponse, LoginRequest, ReadyResponse, RegisterRequest, RegisterResponse, TokenResponse,
};
use crate::db::UserResponse;

/// Aegis Face Login API - OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aegis - Face Login API",
        version = "0.1.0",
        description = r#"
## Face-Recognition Authentication API

Aegis authenticates users by the face in front of the camera:

- **Account registration** - classic email + password signup
- **Face enrollment** - one reference photo per account, reduced to a 128-d descriptor
- **Face login** - a probe photo is matched against every enrolled descriptor
- **Bearer tokens** - successful logins mint a signed JWT for subsequent requests

### How It Works

1. **Register** an account via `POST /api/register`
2. **Enroll** a face via `POST /api/faces/enroll` (multipart photo + email)
3. **Log in** with a photo via `POST /api/login/face`, or fall back to `POST /api/login`
4. The probe is matched by Euclidean distance against the enrolled gallery
5. Use the returned bearer token on `GET /api/users/me` and `DELETE /api/users/me`

### Matching Rules

- Exactly one face must be visible in every enrollment and login photo
- The closest enrolled descriptor wins, but only within the distance threshold
- Every face-login rejection returns the same generic `401 FACE_NOT_RECOGNIZED`
"#,
        contact(
            name = "Aegis Team"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    tags(
        (name = "Auth", description = "Password login and face login"),
        (name = "Faces", description = "Face enrollment for registered accounts"),
        (name = "Accounts", description = "Registration and authenticated account operations"),
        (name = "Health", description = "Service health and readiness endpoints")
    ),
    paths(
        crate::handlers::health::health,
        crate::handlers::health::ready,
        crate::handlers::user::register_handler,
        crate::handlers::login::login_handler,
        crate::handlers::face::face_login_handler,
        crate::handlers::face::enroll_face_handler,
        crate::handlers::user::get_current_user_handler,
        crate::handlers::user::delete_user_handler,
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            RegisterRequest,
            RegisterResponse,
            UserResponse,
            LoginRequest,
            TokenResponse,
            EnrollFaceResponse,
            FaceLoginResponse,
            CurrentUserResponse,
            DeleteUserResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `bearer_token` scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
