//! Encoding oracle abstraction.
//!
//! Face detection and encoding are treated as an opaque capability behind
//! the [`EncodingOracle`] trait: the engine never depends on model
//! internals, only on "give me every face in this image as a descriptor".
//! An oracle is constructed once at startup and shared read-only
//! (`Arc<dyn EncodingOracle>`) for the life of the process.
//!
//! ## Implementations
//!
//! - `DlibOracle` - HOG detector + landmark predictor + ResNet encoder
//!   (production, feature `dlib`)
//! - `MockOracle` - deterministic pixel-derived descriptors (testing and
//!   offline tooling)

use std::sync::Arc;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::descriptor::{FaceDescriptor, FaceRegion};
use crate::error::Result;

#[cfg(feature = "dlib")]
mod dlib;
mod mock;

#[cfg(feature = "dlib")]
pub use dlib::{DlibOracle, DlibOracleConfig};
pub use mock::MockOracle;

/// One face found in an image: where it is and what it looks like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub region: FaceRegion,
    pub descriptor: FaceDescriptor,
}

/// Identifies which oracle implementation produced a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    Dlib,
    Mock,
}

impl std::fmt::Display for OracleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleKind::Dlib => f.write_str("dlib"),
            OracleKind::Mock => f.write_str("mock"),
        }
    }
}

/// The detection + encoding capability.
///
/// Implementations must be pure with respect to the image: the same pixels
/// always yield the same faces in the same order.
pub trait EncodingOracle: Send + Sync {
    /// Locate every face in the image and encode each into a descriptor,
    /// in image-scan order.
    fn encode_faces(&self, image: &RgbImage) -> Result<Vec<DetectedFace>>;

    /// Which implementation this is.
    fn kind(&self) -> OracleKind;
}

/// Configuration for creating an encoding oracle.
#[derive(Debug, Clone)]
pub enum OracleConfig {
    /// dlib model files loaded from disk.
    #[cfg(feature = "dlib")]
    Dlib(DlibOracleConfig),

    /// Deterministic mock (testing and offline tooling only).
    Mock,
}

/// Factory for creating encoding oracles.
pub struct OracleFactory;

impl OracleFactory {
    /// Create an oracle from configuration. Model files are loaded here,
    /// once; the returned handle is shared for the process lifetime.
    pub fn create(config: OracleConfig) -> Result<Arc<dyn EncodingOracle>> {
        match config {
            #[cfg(feature = "dlib")]
            OracleConfig::Dlib(dlib_config) => {
                let oracle = DlibOracle::open(&dlib_config)?;
                Ok(Arc::new(oracle))
            }
            OracleConfig::Mock => Ok(Self::create_mock()),
        }
    }

    /// Create a mock oracle for testing.
    pub fn create_mock() -> Arc<dyn EncodingOracle> {
        Arc::new(MockOracle::default())
    }
}
