use thiserror::Error;

#[derive(Error, Debug)]
pub enum FaceEngineError {
    #[error("no face detected in image")]
    NoFaceDetected,

    #[error("expected exactly one face, found {0}")]
    MultipleFacesDetected(usize),

    #[error("image decode error: {0}")]
    ImageDecode(String),

    #[error("descriptor length mismatch: expected {expected}, got {actual}")]
    DescriptorLength { expected: usize, actual: usize },

    #[error("extraction oracle failure: {0}")]
    Oracle(String),

    #[error("oracle model load error ({path}): {message}")]
    ModelLoad { path: String, message: String },
}

pub type Result<T> = std::result::Result<T, FaceEngineError>;
