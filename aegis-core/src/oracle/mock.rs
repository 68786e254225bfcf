//! Deterministic mock oracle for tests and offline tooling.
//!
//! The default mode derives a descriptor from the image pixels themselves:
//! identical images always produce identical descriptors (self-distance
//! zero) and distinct images land far apart in the embedding space, so the
//! whole extract-enroll-match pipeline can be exercised end to end without
//! model files. A uniform image (every pixel the same) contains no face.

use image::RgbImage;

use super::{DetectedFace, EncodingOracle, OracleKind};
use crate::descriptor::{FaceDescriptor, FaceRegion, DESCRIPTOR_LEN};
use crate::error::{FaceEngineError, Result};

/// Mock encoding oracle.
#[derive(Debug, Default)]
pub struct MockOracle {
    behavior: Behavior,
}

#[derive(Debug, Default)]
enum Behavior {
    /// Derive one descriptor from the pixel content (none for uniform
    /// images).
    #[default]
    Derived,
    /// Return the same faces on every call.
    Fixed(Vec<DetectedFace>),
    /// Fail every call, exercising the fault path.
    Failing(String),
}

impl MockOracle {
    /// Pixel-derived mode (the default).
    pub fn derived() -> Self {
        Self {
            behavior: Behavior::Derived,
        }
    }

    /// Always report exactly these faces.
    pub fn returning(faces: Vec<DetectedFace>) -> Self {
        Self {
            behavior: Behavior::Fixed(faces),
        }
    }

    /// Always fail with an oracle fault.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Failing(message.into()),
        }
    }
}

impl EncodingOracle for MockOracle {
    fn encode_faces(&self, image: &RgbImage) -> Result<Vec<DetectedFace>> {
        match &self.behavior {
            Behavior::Derived => {
                if is_uniform(image) {
                    return Ok(Vec::new());
                }
                let descriptor = derive_descriptor(image)?;
                Ok(vec![DetectedFace {
                    region: full_region(image),
                    descriptor,
                }])
            }
            Behavior::Fixed(faces) => Ok(faces.clone()),
            Behavior::Failing(message) => Err(FaceEngineError::Oracle(message.clone())),
        }
    }

    fn kind(&self) -> OracleKind {
        OracleKind::Mock
    }
}

/// True when every pixel equals the first one (or the image is empty).
fn is_uniform(image: &RgbImage) -> bool {
    let raw = image.as_raw();
    match raw.first() {
        Some(first) => raw.iter().all(|byte| byte == first),
        None => true,
    }
}

fn full_region(image: &RgbImage) -> FaceRegion {
    FaceRegion {
        left: 0,
        top: 0,
        right: image.width() as i64,
        bottom: image.height() as i64,
    }
}

/// FNV-1a over the pixels seeds an xorshift stream; each lane lands in
/// [0, 1). Distinct images are essentially always far apart with this
/// spread, while identical pixels reproduce the exact same vector.
fn derive_descriptor(image: &RgbImage) -> Result<FaceDescriptor> {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in image.as_raw() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash ^= u64::from(image.width());
    hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    hash ^= u64::from(image.height());

    let mut state = hash | 1;
    let mut lanes = Vec::with_capacity(DESCRIPTOR_LEN);
    for _ in 0..DESCRIPTOR_LEN {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        lanes.push((state >> 11) as f64 / (1u64 << 53) as f64);
    }
    FaceDescriptor::new(lanes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn textured_image(seed: u8) -> RgbImage {
        RgbImage::from_fn(16, 16, |x, y| {
            Rgb([
                seed.wrapping_add(x as u8),
                seed.wrapping_mul(y as u8 + 1),
                x as u8 ^ y as u8,
            ])
        })
    }

    #[test]
    fn test_derived_is_deterministic() {
        let oracle = MockOracle::derived();
        let image = textured_image(7);

        let first = oracle.encode_faces(&image).unwrap();
        let second = oracle.encode_faces(&image).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert_eq!(
            first[0].descriptor.distance(&second[0].descriptor),
            0.0,
            "same image must self-match at distance zero"
        );
    }

    #[test]
    fn test_distinct_images_are_far_apart() {
        let oracle = MockOracle::derived();
        let a = oracle.encode_faces(&textured_image(1)).unwrap();
        let b = oracle.encode_faces(&textured_image(2)).unwrap();

        let distance = a[0].descriptor.distance(&b[0].descriptor);
        assert!(
            distance > 0.6,
            "distinct images should exceed the acceptance threshold, got {distance}"
        );
    }

    #[test]
    fn test_uniform_image_has_no_face() {
        let oracle = MockOracle::derived();
        let blank = RgbImage::from_pixel(16, 16, Rgb([128, 128, 128]));
        assert!(oracle.encode_faces(&blank).unwrap().is_empty());
    }

    #[test]
    fn test_fixed_mode_returns_script() {
        let face = DetectedFace {
            region: FaceRegion {
                left: 1,
                top: 2,
                right: 3,
                bottom: 4,
            },
            descriptor: FaceDescriptor::new(vec![0.5; DESCRIPTOR_LEN]).unwrap(),
        };
        let oracle = MockOracle::returning(vec![face.clone(), face.clone()]);

        let faces = oracle
            .encode_faces(&RgbImage::from_pixel(1, 1, Rgb([0, 0, 0])))
            .unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0], face);
    }

    #[test]
    fn test_failing_mode_surfaces_oracle_fault() {
        let oracle = MockOracle::failing("model exploded");
        let err = oracle
            .encode_faces(&textured_image(3))
            .unwrap_err();
        assert!(matches!(err, FaceEngineError::Oracle(message) if message == "model exploded"));
    }

    #[test]
    fn test_region_covers_whole_image() {
        let oracle = MockOracle::derived();
        let image = textured_image(9);
        let faces = oracle.encode_faces(&image).unwrap();
        assert_eq!(
            faces[0].region,
            FaceRegion {
                left: 0,
                top: 0,
                right: 16,
                bottom: 16
            }
        );
    }
}
