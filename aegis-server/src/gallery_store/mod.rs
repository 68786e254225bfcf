//! Gallery store module for persisting face enrollments and materializing
//! match snapshots.
//!
//! This module provides the persistence side of face login:
//! - Store one descriptor per account, replacing on re-enrollment
//! - Materialize the full gallery as `GalleryRecord`s for the matcher
//! - Remove enrollments when the owning account is deleted

pub mod error;
pub mod postgres;

pub use error::GalleryStoreError;
pub use postgres::PostgresGalleryStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aegis_core::FaceDescriptor;

/// An enrollment record stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// Unique database identifier
    pub id: Uuid,
    /// Owning account
    pub user_id: Uuid,
    /// Descriptor computed at enrollment time
    pub descriptor: FaceDescriptor,
    /// Stable handle of the stored face crop
    pub crop_ref: String,
    /// First enrollment timestamp
    pub created_at: DateTime<Utc>,
    /// Last re-enrollment timestamp
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing an enrollment.
#[derive(Debug, Clone)]
pub struct EnrollmentInput {
    /// Owning account
    pub user_id: Uuid,
    /// Descriptor to store
    pub descriptor: FaceDescriptor,
    /// Stable handle of the stored face crop
    pub crop_ref: String,
}
