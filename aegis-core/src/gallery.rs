//! Gallery records: the enrolled (identity, descriptor) pairs available
//! for matching.
//!
//! The gallery itself is owned by the persistence layer; matching always
//! operates on a snapshot materialized at call time. The storage layer
//! guarantees at most one active record per identity by upserting on the
//! identity key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::descriptor::FaceDescriptor;

/// One enrolled identity with its active descriptor.
///
/// Re-enrollment replaces the descriptor and crop handle in place; records
/// are never duplicated per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryRecord {
    /// Canonical identity key (lowercase email).
    pub identity: String,
    /// The descriptor computed at enrollment time.
    pub descriptor: FaceDescriptor,
    /// Stable handle of the stored source crop.
    pub crop_ref: String,
    /// When this descriptor was (re-)enrolled.
    pub enrolled_at: DateTime<Utc>,
}

impl GalleryRecord {
    pub fn new(
        identity: impl Into<String>,
        descriptor: FaceDescriptor,
        crop_ref: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            descriptor,
            crop_ref: crop_ref.into(),
            enrolled_at: Utc::now(),
        }
    }
}
