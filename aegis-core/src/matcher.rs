//! Nearest-neighbor identification over a gallery snapshot.
//!
//! `match_probe` is a pure function: it computes the Euclidean distance
//! from the probe descriptor to every record in the snapshot, selects the
//! global minimum, and accepts only when that minimum is within the
//! acceptance threshold. Repeated calls over the same inputs always return
//! the same outcome.
//!
//! # Usage
//!
//! ```
//! use aegis_core::descriptor::{FaceDescriptor, DESCRIPTOR_LEN};
//! use aegis_core::gallery::GalleryRecord;
//! use aegis_core::matcher::{match_probe, MatchOutcome, MatchPolicy};
//!
//! let enrolled = FaceDescriptor::new(vec![0.1; DESCRIPTOR_LEN]).unwrap();
//! let gallery = vec![GalleryRecord::new("ada@example.com", enrolled.clone(), "crops/a.jpg")];
//!
//! match match_probe(&enrolled, &gallery, MatchPolicy::default()) {
//!     MatchOutcome::Matched { identity, distance } => {
//!         assert_eq!(identity, "ada@example.com");
//!         assert_eq!(distance, 0.0);
//!     }
//!     MatchOutcome::Rejected(reason) => panic!("unexpected rejection: {reason}"),
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::descriptor::FaceDescriptor;
use crate::gallery::GalleryRecord;

/// Default acceptance threshold for the 128-d embedding space.
///
/// A property of the embedding model, not of this crate: 0.6 is the
/// conventional operating point for the dlib ResNet encoder.
pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.6;

/// Tunable matching parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    /// Maximum acceptable distance for declaring a match (inclusive).
    pub threshold: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl MatchPolicy {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }
}

/// Why an authentication attempt was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NoFaceDetected,
    MultipleFacesDetected,
    EmptyGallery,
    NoAcceptableMatch,
    /// The matched identity no longer resolves to an active account.
    /// Produced by the login flow, never by [`match_probe`].
    IdentityNotFound,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectionReason::NoFaceDetected => "no face detected",
            RejectionReason::MultipleFacesDetected => "multiple faces detected",
            RejectionReason::EmptyGallery => "empty gallery",
            RejectionReason::NoAcceptableMatch => "no acceptable match",
            RejectionReason::IdentityNotFound => "identity not found",
        };
        f.write_str(text)
    }
}

/// Outcome of identifying a probe against the gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// The nearest record was within the threshold.
    Matched { identity: String, distance: f64 },
    /// No record qualified.
    Rejected(RejectionReason),
}

/// Identify `probe` against every record in `snapshot`.
///
/// Algorithm: an empty snapshot rejects with `EmptyGallery`; otherwise the
/// record with the minimum Euclidean distance is selected and accepted iff
/// `distance <= policy.threshold`. When several records attain the identical
/// minimum, the first one in snapshot order wins.
pub fn match_probe(
    probe: &FaceDescriptor,
    snapshot: &[GalleryRecord],
    policy: MatchPolicy,
) -> MatchOutcome {
    let Some(first) = snapshot.first() else {
        debug!("match attempted against empty gallery");
        return MatchOutcome::Rejected(RejectionReason::EmptyGallery);
    };

    let mut best_record = first;
    let mut best_distance = probe.distance(&first.descriptor);
    for record in &snapshot[1..] {
        let distance = probe.distance(&record.descriptor);
        // Strict < keeps the earliest record on ties.
        if distance < best_distance {
            best_record = record;
            best_distance = distance;
        }
    }

    if best_distance <= policy.threshold {
        debug!(
            identity = %best_record.identity,
            distance = best_distance,
            gallery_size = snapshot.len(),
            "probe matched"
        );
        MatchOutcome::Matched {
            identity: best_record.identity.clone(),
            distance: best_distance,
        }
    } else {
        debug!(
            nearest_distance = best_distance,
            threshold = policy.threshold,
            gallery_size = snapshot.len(),
            "nearest record above threshold"
        );
        MatchOutcome::Rejected(RejectionReason::NoAcceptableMatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::DESCRIPTOR_LEN;

    /// Descriptor at `value` on lane 0 and zero elsewhere, so distances
    /// between them equal the lane-0 differences.
    fn descriptor_at(value: f64) -> FaceDescriptor {
        let mut values = vec![0.0; DESCRIPTOR_LEN];
        values[0] = value;
        FaceDescriptor::new(values).unwrap()
    }

    fn record(identity: &str, value: f64) -> GalleryRecord {
        GalleryRecord::new(identity, descriptor_at(value), format!("crops/{identity}.jpg"))
    }

    #[test]
    fn test_empty_gallery_always_rejects() {
        let outcome = match_probe(&descriptor_at(0.3), &[], MatchPolicy::default());
        assert_eq!(
            outcome,
            MatchOutcome::Rejected(RejectionReason::EmptyGallery)
        );
    }

    #[test]
    fn test_nearest_within_threshold_matches() {
        // Probe sits 0.1 from A and 0.9 from B; threshold 0.6 accepts A.
        let gallery = vec![record("a@example.com", 0.0), record("b@example.com", 1.0)];
        let probe = descriptor_at(0.1);

        match match_probe(&probe, &gallery, MatchPolicy::default()) {
            MatchOutcome::Matched { identity, distance } => {
                assert_eq!(identity, "a@example.com");
                assert!((distance - 0.1).abs() < 1e-12);
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn test_nearest_above_threshold_rejects() {
        let gallery = vec![record("a@example.com", 0.0)];
        let probe = descriptor_at(0.8);

        let outcome = match_probe(&probe, &gallery, MatchPolicy::default());
        assert_eq!(
            outcome,
            MatchOutcome::Rejected(RejectionReason::NoAcceptableMatch)
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let gallery = vec![record("a@example.com", 0.0)];
        let probe = descriptor_at(0.6);

        match match_probe(&probe, &gallery, MatchPolicy::default()) {
            MatchOutcome::Matched { identity, .. } => assert_eq!(identity, "a@example.com"),
            other => panic!("distance equal to threshold must accept, got {other:?}"),
        }
    }

    #[test]
    fn test_self_match_distance_zero() {
        let gallery = vec![record("a@example.com", 0.42)];
        let probe = descriptor_at(0.42);

        match match_probe(&probe, &gallery, MatchPolicy::default()) {
            MatchOutcome::Matched { identity, distance } => {
                assert_eq!(identity, "a@example.com");
                assert_eq!(distance, 0.0);
            }
            other => panic!("expected self match, got {other:?}"),
        }
    }

    #[test]
    fn test_tie_break_prefers_snapshot_order() {
        // Both records are equidistant from the probe; the first enrolls wins.
        let gallery = vec![
            record("first@example.com", 0.2),
            record("second@example.com", 0.2),
        ];
        let probe = descriptor_at(0.2);

        match match_probe(&probe, &gallery, MatchPolicy::default()) {
            MatchOutcome::Matched { identity, .. } => assert_eq!(identity, "first@example.com"),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn test_true_global_minimum_is_selected() {
        let gallery = vec![
            record("far@example.com", 0.9),
            record("near@example.com", 0.35),
            record("mid@example.com", 0.6),
        ];
        let probe = descriptor_at(0.3);

        match match_probe(&probe, &gallery, MatchPolicy::default()) {
            MatchOutcome::Matched { identity, distance } => {
                assert_eq!(identity, "near@example.com");
                assert!((distance - 0.05).abs() < 1e-12);
            }
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn test_determinism_over_repeated_calls() {
        let gallery = vec![record("a@example.com", 0.1), record("b@example.com", 0.5)];
        let probe = descriptor_at(0.3);
        let policy = MatchPolicy::default();

        let first = match_probe(&probe, &gallery, policy);
        for _ in 0..10 {
            assert_eq!(match_probe(&probe, &gallery, policy), first);
        }
    }

    #[test]
    fn test_custom_threshold() {
        let gallery = vec![record("a@example.com", 0.0)];
        let probe = descriptor_at(0.8);

        let strict = match_probe(&probe, &gallery, MatchPolicy::with_threshold(0.5));
        assert_eq!(
            strict,
            MatchOutcome::Rejected(RejectionReason::NoAcceptableMatch)
        );

        let relaxed = match_probe(&probe, &gallery, MatchPolicy::with_threshold(0.9));
        assert!(matches!(relaxed, MatchOutcome::Matched { .. }));
    }

    #[test]
    fn test_rejection_reason_display() {
        assert_eq!(
            RejectionReason::NoAcceptableMatch.to_string(),
            "no acceptable match"
        );
        assert_eq!(RejectionReason::EmptyGallery.to_string(), "empty gallery");
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let outcome = MatchOutcome::Rejected(RejectionReason::EmptyGallery);
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"rejected":"empty_gallery"}"#);
    }
}
