//! Face crop storage module
//!
//! Persists the enrollment face crop as `<user-id>.jpg` under the
//! configured directory. Writes go through a temp file in the same
//! directory followed by a rename, so a crash never leaves a partial
//! file behind and a re-enrollment replaces the crop in one step.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use tempfile::NamedTempFile;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when storing or removing face crops.
#[derive(Debug, Error)]
pub enum CropStoreError {
    /// Filesystem operation failed
    #[error("Crop I/O error: {0}")]
    Io(#[from] io::Error),

    /// JPEG encoding failed
    #[error("Crop encode error: {0}")]
    Encode(String),
}

/// Directory-backed store for enrollment face crops.
#[derive(Debug, Clone)]
pub struct CropStore {
    dir: PathBuf,
}

impl CropStore {
    /// Open the store, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CropStoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write the crop for an account, replacing any previous one.
    ///
    /// Returns the crop handle stored alongside the enrollment.
    pub fn save_jpeg(&self, user_id: Uuid, image: &RgbImage) -> Result<String, CropStoreError> {
        let file_name = format!("{}.jpg", user_id);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        image
            .write_to(tmp.as_file_mut(), ImageFormat::Jpeg)
            .map_err(|e| CropStoreError::Encode(e.to_string()))?;
        tmp.persist(self.dir.join(&file_name))
            .map_err(|e| CropStoreError::Io(e.error))?;

        tracing::debug!(crop_ref = %file_name, "Stored face crop");

        Ok(file_name)
    }

    /// Remove a stored crop. Returns false when it was already gone.
    pub fn remove(&self, crop_ref: &str) -> Result<bool, CropStoreError> {
        match fs::remove_file(self.path_of(crop_ref)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Absolute path of a stored crop.
    pub fn path_of(&self, crop_ref: &str) -> PathBuf {
        self.dir.join(crop_ref)
    }

    /// The directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_crop() -> RgbImage {
        RgbImage::from_pixel(8, 8, image::Rgb([120, 100, 90]))
    }

    #[test]
    fn test_save_writes_named_jpeg() {
        let dir = TempDir::new().unwrap();
        let store = CropStore::new(dir.path()).unwrap();
        let user_id = Uuid::new_v4();

        let crop_ref = store.save_jpeg(user_id, &sample_crop()).unwrap();
        assert_eq!(crop_ref, format!("{}.jpg", user_id));

        let metadata = fs::metadata(store.path_of(&crop_ref)).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_save_replaces_existing_crop() {
        let dir = TempDir::new().unwrap();
        let store = CropStore::new(dir.path()).unwrap();
        let user_id = Uuid::new_v4();

        let first = store.save_jpeg(user_id, &sample_crop()).unwrap();
        let second = store.save_jpeg(user_id, &sample_crop()).unwrap();
        assert_eq!(first, second);

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_remove_reports_missing() {
        let dir = TempDir::new().unwrap();
        let store = CropStore::new(dir.path()).unwrap();
        let user_id = Uuid::new_v4();

        let crop_ref = store.save_jpeg(user_id, &sample_crop()).unwrap();
        assert!(store.remove(&crop_ref).unwrap());
        assert!(!store.remove(&crop_ref).unwrap());
    }

    #[test]
    fn test_new_creates_nested_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = CropStore::new(&nested).unwrap();
        assert!(store.dir().is_dir());
    }
}
