//! Descriptor extraction and the single-face input policy.
//!
//! [`FaceExtractor`] is a thin wrapper over the encoding oracle: it turns a
//! decoded image into the faces the oracle finds there, and enforces the
//! "exactly one face" rule that both enrollment and login probes require.
//! Zero or several faces is a caller-visible rejection, never a panic.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, instrument};

use crate::descriptor::FaceRegion;
use crate::error::{FaceEngineError, Result};
use crate::oracle::{DetectedFace, EncodingOracle, OracleKind};

/// Decode raw image bytes (JPEG, PNG, GIF, WebP) into an RGB pixel matrix.
pub fn decode_image(data: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(data)
        .map_err(|e| FaceEngineError::ImageDecode(e.to_string()))?;
    Ok(image.to_rgb8())
}

/// Extract the face located by `region` as its own image.
///
/// The region is clamped to the image bounds first; a region that ends up
/// empty is an oracle inconsistency, not a user error.
pub fn crop_face(image: &RgbImage, region: &FaceRegion) -> Result<RgbImage> {
    let (x, y, width, height) = region
        .clamped(image.width(), image.height())
        .ok_or_else(|| {
            FaceEngineError::Oracle(format!(
                "detected region {region:?} lies outside a {}x{} image",
                image.width(),
                image.height()
            ))
        })?;
    Ok(image::imageops::crop_imm(image, x, y, width, height).to_image())
}

/// Turns images into descriptors via an owned, shared oracle handle.
pub struct FaceExtractor {
    oracle: Arc<dyn EncodingOracle>,
}

impl FaceExtractor {
    pub fn new(oracle: Arc<dyn EncodingOracle>) -> Self {
        Self { oracle }
    }

    pub fn oracle_kind(&self) -> OracleKind {
        self.oracle.kind()
    }

    /// Every face in the image, in image-scan order. The order is stable
    /// for a single call and must not be relied on beyond that.
    #[instrument(level = "debug", skip_all, fields(width = image.width(), height = image.height()))]
    pub fn extract(&self, image: &RgbImage) -> Result<Vec<DetectedFace>> {
        let faces = self.oracle.encode_faces(image)?;
        debug!(faces = faces.len(), oracle = %self.oracle.kind(), "extraction complete");
        Ok(faces)
    }

    /// Enforce the single-face policy for enrollment and probe inputs.
    pub fn extract_exactly_one(&self, image: &RgbImage) -> Result<DetectedFace> {
        let mut faces = self.extract(image)?;
        match faces.len() {
            0 => Err(FaceEngineError::NoFaceDetected),
            1 => Ok(faces.remove(0)),
            n => Err(FaceEngineError::MultipleFacesDetected(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FaceDescriptor, DESCRIPTOR_LEN};
    use crate::oracle::MockOracle;
    use image::Rgb;

    fn face_at(left: i64) -> DetectedFace {
        DetectedFace {
            region: FaceRegion {
                left,
                top: 0,
                right: left + 8,
                bottom: 8,
            },
            descriptor: FaceDescriptor::new(vec![0.1; DESCRIPTOR_LEN]).unwrap(),
        }
    }

    fn any_image() -> RgbImage {
        RgbImage::from_fn(16, 16, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn test_exactly_one_accepts_single_face() {
        let extractor = FaceExtractor::new(Arc::new(MockOracle::returning(vec![face_at(0)])));
        let face = extractor.extract_exactly_one(&any_image()).unwrap();
        assert_eq!(face.region.left, 0);
    }

    #[test]
    fn test_exactly_one_rejects_empty() {
        let extractor = FaceExtractor::new(Arc::new(MockOracle::returning(vec![])));
        let err = extractor.extract_exactly_one(&any_image()).unwrap_err();
        assert!(matches!(err, FaceEngineError::NoFaceDetected));
    }

    #[test]
    fn test_exactly_one_rejects_crowd() {
        let extractor =
            FaceExtractor::new(Arc::new(MockOracle::returning(vec![face_at(0), face_at(8)])));
        let err = extractor.extract_exactly_one(&any_image()).unwrap_err();
        assert!(matches!(err, FaceEngineError::MultipleFacesDetected(2)));
    }

    #[test]
    fn test_oracle_fault_propagates_unchanged() {
        let extractor = FaceExtractor::new(Arc::new(MockOracle::failing("backend down")));
        let err = extractor.extract_exactly_one(&any_image()).unwrap_err();
        assert!(matches!(err, FaceEngineError::Oracle(_)));
    }

    #[test]
    fn test_extract_preserves_oracle_order() {
        let extractor =
            FaceExtractor::new(Arc::new(MockOracle::returning(vec![face_at(8), face_at(0)])));
        let faces = extractor.extract(&any_image()).unwrap();
        assert_eq!(faces[0].region.left, 8);
        assert_eq!(faces[1].region.left, 0);
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        let err = decode_image(&[0x00, 0x01, 0x02]).unwrap_err();
        assert!(matches!(err, FaceEngineError::ImageDecode(_)));
    }

    #[test]
    fn test_crop_face_extracts_region() {
        let image = any_image();
        let region = FaceRegion {
            left: 4,
            top: 4,
            right: 12,
            bottom: 12,
        };
        let crop = crop_face(&image, &region).unwrap();
        assert_eq!((crop.width(), crop.height()), (8, 8));
        // Top-left pixel of the crop is pixel (4, 4) of the source.
        assert_eq!(crop.get_pixel(0, 0), image.get_pixel(4, 4));
    }

    #[test]
    fn test_crop_face_rejects_region_outside_image() {
        let image = any_image();
        let region = FaceRegion {
            left: 40,
            top: 40,
            right: 50,
            bottom: 50,
        };
        assert!(matches!(
            crop_face(&image, &region).unwrap_err(),
            FaceEngineError::Oracle(_)
        ));
    }
}
