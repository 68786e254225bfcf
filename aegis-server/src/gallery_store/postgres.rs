//! PostgreSQL implementation of the gallery store.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aegis_core::{FaceDescriptor, GalleryRecord};

use super::{EnrollmentInput, EnrollmentRecord, GalleryStoreError};

/// PostgreSQL-backed gallery store.
///
/// Provides persistence for face enrollments and gallery snapshots for
/// the matcher.
#[derive(Clone)]
pub struct PostgresGalleryStore {
    pool: PgPool,
}

/// Row type for enrollment queries.
#[derive(FromRow)]
struct EnrollmentRow {
    id: Uuid,
    user_id: Uuid,
    descriptor: Json<Vec<f64>>,
    crop_ref: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EnrollmentRow> for EnrollmentRecord {
    type Error = GalleryStoreError;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        let descriptor = FaceDescriptor::new(row.descriptor.0)
            .map_err(|e| GalleryStoreError::Serialization(e.to_string()))?;
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            descriptor,
            crop_ref: row.crop_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row type for gallery snapshot queries (joined with the owning account).
#[derive(FromRow)]
struct GalleryRow {
    email: String,
    descriptor: Json<Vec<f64>>,
    crop_ref: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<GalleryRow> for GalleryRecord {
    type Error = GalleryStoreError;

    fn try_from(row: GalleryRow) -> Result<Self, Self::Error> {
        let descriptor = FaceDescriptor::new(row.descriptor.0)
            .map_err(|e| GalleryStoreError::Serialization(e.to_string()))?;
        Ok(Self {
            identity: row.email,
            descriptor,
            crop_ref: row.crop_ref,
            enrolled_at: row.created_at,
        })
    }
}

impl PostgresGalleryStore {
    /// Create a new gallery store with the given database URL.
    ///
    /// Runs migrations automatically on connection.
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, GalleryStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .connect(database_url)
            .await
            .map_err(|e| GalleryStoreError::Connection(e.to_string()))?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| GalleryStoreError::Migration(e.to_string()))?;

        tracing::info!("Gallery store connected and migrations applied");

        Ok(Self { pool })
    }

    /// Create a gallery store from an existing pool (for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool, shared with other repositories.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Store or replace the enrollment for an account.
    ///
    /// Uses upsert semantics: at most one enrollment exists per account,
    /// and re-enrolling replaces the descriptor and crop handle in place.
    pub async fn enroll(&self, input: &EnrollmentInput) -> Result<Uuid, GalleryStoreError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO face_enrollments (user_id, descriptor, crop_ref)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                descriptor = EXCLUDED.descriptor,
                crop_ref = EXCLUDED.crop_ref,
                updated_at = NOW()
            RETURNING id
            "#,
        )
        .bind(input.user_id)
        .bind(Json(input.descriptor.as_slice().to_vec()))
        .bind(&input.crop_ref)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(user_id = %input.user_id, "Stored enrollment");

        Ok(id)
    }

    /// Get the enrollment for an account, if any.
    pub async fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<EnrollmentRecord>, GalleryStoreError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, descriptor, crop_ref, created_at, updated_at
            FROM face_enrollments
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Materialize the full gallery for the matcher.
    ///
    /// Only enrollments whose account is still active are included. Rows
    /// come back in first-enrollment order with the id as a tiebreaker,
    /// so matching over the snapshot is deterministic.
    pub async fn snapshot(&self) -> Result<Vec<GalleryRecord>, GalleryStoreError> {
        let rows: Vec<GalleryRow> = sqlx::query_as(
            r#"
            SELECT u.email, e.descriptor, e.crop_ref, e.created_at
            FROM face_enrollments e
            JOIN users u ON u.id = e.user_id
            WHERE u.deleted_at IS NULL
            ORDER BY e.created_at ASC, e.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete the enrollment for an account.
    pub async fn delete_for_user(&self, user_id: Uuid) -> Result<bool, GalleryStoreError> {
        let result = sqlx::query("DELETE FROM face_enrollments WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count total enrollments in the store.
    pub async fn count(&self) -> Result<i64, GalleryStoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM face_enrollments")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::DESCRIPTOR_LEN;

    #[test]
    fn test_enrollment_row_conversion() {
        let row = EnrollmentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            descriptor: Json(vec![0.25; DESCRIPTOR_LEN]),
            crop_ref: "crops/ada.jpg".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let expected_user = row.user_id;

        let record = EnrollmentRecord::try_from(row).unwrap();
        assert_eq!(record.user_id, expected_user);
        assert_eq!(record.descriptor.as_slice().len(), DESCRIPTOR_LEN);
        assert_eq!(record.crop_ref, "crops/ada.jpg");
    }

    #[test]
    fn test_enrollment_row_rejects_short_descriptor() {
        let row = EnrollmentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            descriptor: Json(vec![0.25; 5]),
            crop_ref: "crops/ada.jpg".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = EnrollmentRecord::try_from(row);
        assert!(matches!(result, Err(GalleryStoreError::Serialization(_))));
    }

    #[test]
    fn test_gallery_row_conversion_keeps_enrollment_time() {
        let enrolled_at = Utc::now();
        let row = GalleryRow {
            email: "ada@example.com".to_string(),
            descriptor: Json(vec![0.25; DESCRIPTOR_LEN]),
            crop_ref: "crops/ada.jpg".to_string(),
            created_at: enrolled_at,
        };

        let record = GalleryRecord::try_from(row).unwrap();
        assert_eq!(record.identity, "ada@example.com");
        assert_eq!(record.enrolled_at, enrolled_at);
    }
}
