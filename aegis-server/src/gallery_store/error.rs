//! Error types for the gallery store module.

use thiserror::Error;

/// Errors that can occur when interacting with the gallery store.
#[derive(Debug, Error)]
pub enum GalleryStoreError {
    /// Database connection failed
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// SQL query execution failed
    #[error("Query error: {0}")]
    Query(String),

    /// Requested enrollment was not found
    #[error("Enrollment not found")]
    NotFound,

    /// Stored descriptor could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<sqlx::Error> for GalleryStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::Query(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for GalleryStoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(e.to_string())
    }
}
