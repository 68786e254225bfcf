//! Exit codes for the aegis CLI.
//!
//! A rejected match is a verdict, not a failure, so it gets its own code;
//! scripts can branch on accept/reject without parsing output. Usage
//! errors exit with 2 through clap itself.

use aegis_core::FaceEngineError;

/// Successful execution; for `compare` and `identify`, an accepted match.
pub const SUCCESS: i32 = 0;

/// The probe was processed but no gallery record qualified.
pub const NO_MATCH: i32 = 1;

/// Command line usage error (clap's own exit code).
#[allow(dead_code)]
pub const USAGE_ERROR: i32 = 2;

/// The input image carried zero or more than one face.
pub const FACE_COUNT_ERROR: i32 = 3;

/// File I/O, image decoding, or oracle failure.
pub const IO_OR_ORACLE_ERROR: i32 = 4;

/// Classify a command failure into an exit code.
pub fn classify(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<FaceEngineError>() {
        Some(FaceEngineError::NoFaceDetected | FaceEngineError::MultipleFacesDetected(_)) => {
            FACE_COUNT_ERROR
        }
        _ => IO_OR_ORACLE_ERROR,
    }
}
