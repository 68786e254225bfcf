//! Face descriptors and the metric space they live in.
//!
//! A descriptor is a fixed-length embedding of a face produced by the
//! encoding oracle. Descriptors from the same oracle are comparable by
//! Euclidean distance: the closer two descriptors, the more likely the
//! faces belong to the same person.
//!
//! # Usage
//!
//! ```
//! use aegis_core::descriptor::{FaceDescriptor, DESCRIPTOR_LEN};
//!
//! let a = FaceDescriptor::new(vec![0.0; DESCRIPTOR_LEN]).unwrap();
//! let b = FaceDescriptor::new(vec![0.0; DESCRIPTOR_LEN]).unwrap();
//! assert_eq!(a.distance(&b), 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{FaceEngineError, Result};

/// Number of lanes in a face descriptor (the 128-d ResNet embedding).
pub const DESCRIPTOR_LEN: usize = 128;

/// A point in the face embedding space.
///
/// Immutable once computed. The length invariant is enforced at every
/// construction site, including deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct FaceDescriptor(Vec<f64>);

impl FaceDescriptor {
    /// Wrap a raw embedding vector, validating its length.
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if values.len() != DESCRIPTOR_LEN {
            return Err(FaceEngineError::DescriptorLength {
                expected: DESCRIPTOR_LEN,
                actual: values.len(),
            });
        }
        Ok(Self(values))
    }

    /// The raw embedding lanes.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Euclidean distance to another descriptor.
    ///
    /// Non-negative, symmetric, and zero exactly when the vectors are
    /// identical.
    pub fn distance(&self, other: &FaceDescriptor) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl TryFrom<Vec<f64>> for FaceDescriptor {
    type Error = FaceEngineError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<FaceDescriptor> for Vec<f64> {
    fn from(descriptor: FaceDescriptor) -> Self {
        descriptor.0
    }
}

/// Axis-aligned bounding box of a detected face, in pixel coordinates.
///
/// Detectors may report boxes that extend past the image edges; callers
/// that index into pixel data must clamp first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl FaceRegion {
    /// Clamp the region to an image of the given dimensions, returning
    /// `(x, y, width, height)` suitable for cropping. `None` when the
    /// region lies entirely outside the image or is degenerate.
    pub fn clamped(&self, image_width: u32, image_height: u32) -> Option<(u32, u32, u32, u32)> {
        let left = self.left.clamp(0, image_width as i64) as u32;
        let top = self.top.clamp(0, image_height as i64) as u32;
        let right = self.right.clamp(0, image_width as i64) as u32;
        let bottom = self.bottom.clamp(0, image_height as i64) as u32;

        if right <= left || bottom <= top {
            return None;
        }
        Some((left, top, right - left, bottom - top))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor_with(first: f64) -> FaceDescriptor {
        let mut values = vec![0.0; DESCRIPTOR_LEN];
        values[0] = first;
        FaceDescriptor::new(values).unwrap()
    }

    #[test]
    fn test_descriptor_len() {
        assert_eq!(DESCRIPTOR_LEN, 128);
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = FaceDescriptor::new(vec![0.0; 64]).unwrap_err();
        assert!(matches!(
            err,
            FaceEngineError::DescriptorLength {
                expected: 128,
                actual: 64
            }
        ));
    }

    #[test]
    fn test_distance_zero_for_identical() {
        let a = descriptor_with(0.5);
        let b = descriptor_with(0.5);
        assert_eq!(a.distance(&b), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let a = descriptor_with(0.1);
        let b = descriptor_with(0.9);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn test_distance_single_lane() {
        // Only lane 0 differs, so the distance is the lane difference itself.
        let a = descriptor_with(0.0);
        let b = descriptor_with(0.8);
        assert!((a.distance(&b) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_serde_enforces_length() {
        let short = serde_json::to_string(&vec![0.0; 3]).unwrap();
        let result: std::result::Result<FaceDescriptor, _> = serde_json::from_str(&short);
        assert!(result.is_err());

        let full = serde_json::to_string(&vec![0.25; DESCRIPTOR_LEN]).unwrap();
        let descriptor: FaceDescriptor = serde_json::from_str(&full).unwrap();
        assert_eq!(descriptor.as_slice()[0], 0.25);
    }

    #[test]
    fn test_serde_roundtrip_is_plain_array() {
        let descriptor = descriptor_with(1.5);
        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.starts_with("[1.5,"));
    }

    #[test]
    fn test_region_clamped_inside() {
        let region = FaceRegion {
            left: 10,
            top: 20,
            right: 30,
            bottom: 60,
        };
        assert_eq!(region.clamped(100, 100), Some((10, 20, 20, 40)));
    }

    #[test]
    fn test_region_clamped_overflowing() {
        let region = FaceRegion {
            left: -5,
            top: 90,
            right: 120,
            bottom: 130,
        };
        assert_eq!(region.clamped(100, 100), Some((0, 90, 100, 10)));
    }

    #[test]
    fn test_region_clamped_outside() {
        let region = FaceRegion {
            left: 150,
            top: 150,
            right: 200,
            bottom: 200,
        };
        assert_eq!(region.clamped(100, 100), None);
    }
}
