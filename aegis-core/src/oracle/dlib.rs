//! dlib-backed encoding oracle.
//!
//! Wraps the HOG face detector, the 68-point landmark predictor, and the
//! ResNet face encoder from `dlib-face-recognition`. The two model files
//! are loaded from disk exactly once, in [`DlibOracle::open`]; after that
//! the oracle can be shared across threads, with encoding calls serialized
//! through an internal lock.
//!
//! Model files (not shipped with this crate):
//! - `shape_predictor_68_face_landmarks.dat`
//! - `dlib_face_recognition_resnet_model_v1.dat`

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use dlib_face_recognition::{
    FaceDetector, FaceDetectorTrait, FaceEncoderNetwork, FaceEncoderTrait, ImageMatrix,
    LandmarkPredictor, LandmarkPredictorTrait,
};
use image::RgbImage;
use tracing::{debug, instrument};

use crate::descriptor::{FaceDescriptor, FaceRegion};
use crate::error::{FaceEngineError, Result};
use crate::oracle::{DetectedFace, EncodingOracle, OracleKind};

/// Number of re-sampling passes the encoder runs per face. Higher values
/// trade latency for descriptor stability.
pub const DEFAULT_JITTERS: u32 = 1;

/// Filesystem locations of the two dlib model files plus encoder settings.
#[derive(Debug, Clone)]
pub struct DlibOracleConfig {
    /// Path to `shape_predictor_68_face_landmarks.dat`.
    pub landmark_model: PathBuf,
    /// Path to `dlib_face_recognition_resnet_model_v1.dat`.
    pub encoder_model: PathBuf,
    /// Re-sampling passes per face.
    pub jitters: u32,
}

impl DlibOracleConfig {
    pub fn new(landmark_model: impl Into<PathBuf>, encoder_model: impl Into<PathBuf>) -> Self {
        Self {
            landmark_model: landmark_model.into(),
            encoder_model: encoder_model.into(),
            jitters: DEFAULT_JITTERS,
        }
    }
}

struct DlibModels {
    detector: FaceDetector,
    predictor: LandmarkPredictor,
    encoder: FaceEncoderNetwork,
}

// Safety: the models are never mutated after `open`, and every call into
// them goes through the `Mutex` in `DlibOracle`, one thread at a time.
unsafe impl Send for DlibModels {}

/// Face encoding backed by the dlib HOG detector and ResNet encoder.
pub struct DlibOracle {
    models: Mutex<DlibModels>,
    jitters: u32,
}

impl DlibOracle {
    /// Loads both model files from disk. Fails with
    /// [`FaceEngineError::ModelLoad`] when either file is missing or
    /// corrupt.
    #[instrument(skip_all, fields(landmarks = %config.landmark_model.display(), encoder = %config.encoder_model.display()))]
    pub fn open(config: &DlibOracleConfig) -> Result<Self> {
        let predictor = LandmarkPredictor::open(&config.landmark_model).map_err(|message| {
            FaceEngineError::ModelLoad {
                path: config.landmark_model.display().to_string(),
                message,
            }
        })?;
        let encoder = FaceEncoderNetwork::open(&config.encoder_model).map_err(|message| {
            FaceEngineError::ModelLoad {
                path: config.encoder_model.display().to_string(),
                message,
            }
        })?;
        debug!("dlib models loaded");
        Ok(Self {
            models: Mutex::new(DlibModels {
                detector: FaceDetector::new(),
                predictor,
                encoder,
            }),
            jitters: config.jitters,
        })
    }
}

impl EncodingOracle for DlibOracle {
    fn encode_faces(&self, image: &RgbImage) -> Result<Vec<DetectedFace>> {
        let matrix = ImageMatrix::from_image(image);
        let models = self.models.lock().unwrap_or_else(PoisonError::into_inner);
        let locations = models.detector.face_locations(&matrix);
        let mut faces = Vec::with_capacity(locations.len());
        for rect in locations.iter() {
            let landmarks = models.predictor.face_landmarks(&matrix, rect);
            let encodings = models
                .encoder
                .get_face_encodings(&matrix, &[landmarks], self.jitters);
            let Some(encoding) = encodings.first() else {
                continue;
            };
            let descriptor = FaceDescriptor::new(encoding.as_ref().to_vec())?;
            faces.push(DetectedFace {
                region: FaceRegion {
                    left: rect.left,
                    top: rect.top,
                    right: rect.right,
                    bottom: rect.bottom,
                },
                descriptor,
            });
        }
        debug!(count = faces.len(), "dlib encoding pass complete");
        Ok(faces)
    }

    fn kind(&self) -> OracleKind {
        OracleKind::Dlib
    }
}
