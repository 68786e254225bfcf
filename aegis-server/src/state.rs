//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use aegis_core::{FaceExtractor, MatchPolicy};

use crate::auth::TokenIssuer;
use crate::crop_store::CropStore;
use crate::db::UserRepository;
use crate::gallery_store::PostgresGalleryStore;
use crate::validation::DEFAULT_MAX_FILE_SIZE;

/// Application state containing shared resources.
///
/// Every capability is optional; handlers answer 503 when the one they
/// need is absent, so the server still boots with partial configuration.
#[derive(Clone)]
pub struct AppState {
    /// Gallery store for enrollment persistence and match snapshots
    pub gallery_store: Option<Arc<PostgresGalleryStore>>,
    /// User repository for account data
    pub user_repo: Option<Arc<UserRepository>>,
    /// Face extraction pipeline (oracle behind its trait seam)
    pub extractor: Option<Arc<FaceExtractor>>,
    /// Store for enrollment face crops
    pub crop_store: Option<Arc<CropStore>>,
    /// HS256 session token issuer
    pub token_issuer: Option<Arc<TokenIssuer>>,
    /// Acceptance threshold applied when matching probes
    pub match_policy: MatchPolicy,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            gallery_store: None,
            user_repo: None,
            extractor: None,
            crop_store: None,
            token_issuer: None,
            match_policy: MatchPolicy::default(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}
