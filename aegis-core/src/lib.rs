//! Aegis Core - Face identification engine
//!
//! This crate provides the matching engine behind Aegis face login: turning
//! images into fixed-length face descriptors and deciding, against a gallery
//! of enrolled descriptors, whether a probe identifies a known user.
//!
//! # Features
//!
//! - 128-d face descriptors with Euclidean-distance comparison
//! - Encoding oracle seam: dlib-backed in production, deterministic mock for
//!   tests and offline tooling
//! - Single-face input policy for enrollment and login probes
//! - Pure nearest-neighbor matcher with an inclusive, configurable
//!   acceptance threshold and first-in-snapshot tie-break
//!
//! # Example
//!
//! ```
//! use aegis_core::{FaceExtractor, GalleryRecord, MatchOutcome, MatchPolicy, OracleFactory};
//! use aegis_core::matcher::match_probe;
//! use image::{Rgb, RgbImage};
//!
//! # fn example() -> aegis_core::Result<()> {
//! // Mock oracle: descriptors derived deterministically from pixels.
//! let extractor = FaceExtractor::new(OracleFactory::create_mock());
//!
//! let enrolled_image = RgbImage::from_fn(32, 32, |x, y| Rgb([x as u8, y as u8, 0]));
//! let face = extractor.extract_exactly_one(&enrolled_image)?;
//! let gallery = vec![GalleryRecord::new("ada@example.com", face.descriptor, "crops/ada.jpg")];
//!
//! // Probing with the same image matches at distance zero.
//! let probe = extractor.extract_exactly_one(&enrolled_image)?;
//! let outcome = match_probe(&probe.descriptor, &gallery, MatchPolicy::default());
//! assert!(matches!(outcome, MatchOutcome::Matched { distance, .. } if distance == 0.0));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod descriptor;
pub mod error;
pub mod extractor;
pub mod gallery;
pub mod matcher;
pub mod oracle;

// Re-export main types for convenience
pub use descriptor::{FaceDescriptor, FaceRegion, DESCRIPTOR_LEN};
pub use error::{FaceEngineError, Result};
pub use extractor::{crop_face, decode_image, FaceExtractor};
pub use gallery::GalleryRecord;
pub use matcher::{
    match_probe, MatchOutcome, MatchPolicy, RejectionReason, DEFAULT_MATCH_THRESHOLD,
};
pub use oracle::{DetectedFace, EncodingOracle, MockOracle, OracleConfig, OracleFactory, OracleKind};

#[cfg(feature = "dlib")]
pub use oracle::{DlibOracle, DlibOracleConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn portrait(seed: u8) -> RgbImage {
        RgbImage::from_fn(24, 24, |x, y| {
            Rgb([
                seed.wrapping_add(x as u8),
                seed.wrapping_mul(3).wrapping_add(y as u8),
                x as u8 ^ y as u8,
            ])
        })
    }

    /// Integration test: enroll two users, probe, and check both decisions.
    #[test]
    fn test_full_identification_workflow() {
        let extractor = FaceExtractor::new(OracleFactory::create_mock());

        // Step 1: enroll two identities from distinct images.
        let ada_face = extractor.extract_exactly_one(&portrait(10)).unwrap();
        let grace_face = extractor.extract_exactly_one(&portrait(200)).unwrap();
        let gallery = vec![
            GalleryRecord::new("ada@example.com", ada_face.descriptor, "crops/ada.jpg"),
            GalleryRecord::new("grace@example.com", grace_face.descriptor, "crops/grace.jpg"),
        ];

        // Step 2: a probe from Ada's image identifies Ada at distance zero.
        let probe = extractor.extract_exactly_one(&portrait(10)).unwrap();
        match match_probe(&probe.descriptor, &gallery, MatchPolicy::default()) {
            MatchOutcome::Matched { identity, distance } => {
                assert_eq!(identity, "ada@example.com");
                assert_eq!(distance, 0.0);
            }
            other => panic!("expected Ada to match, got {other:?}"),
        }

        // Step 3: a probe from an unseen image is rejected, not misassigned.
        let stranger = extractor.extract_exactly_one(&portrait(77)).unwrap();
        assert_eq!(
            match_probe(&stranger.descriptor, &gallery, MatchPolicy::default()),
            MatchOutcome::Rejected(RejectionReason::NoAcceptableMatch)
        );
    }

    #[test]
    fn test_empty_gallery_rejects_before_any_distance() {
        let extractor = FaceExtractor::new(OracleFactory::create_mock());
        let probe = extractor.extract_exactly_one(&portrait(42)).unwrap();
        assert_eq!(
            match_probe(&probe.descriptor, &[], MatchPolicy::default()),
            MatchOutcome::Rejected(RejectionReason::EmptyGallery)
        );
    }
}
