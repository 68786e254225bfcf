//! Common utility functions shared across CLI commands.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use aegis_core::{
    decode_image, DetectedFace, FaceDescriptor, FaceExtractor, FaceRegion, GalleryRecord,
    OracleFactory,
};

use crate::OracleArgs;

/// One extracted face as written by `aegis extract` and read back by
/// `aegis identify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescriptorFile {
    /// Path of the image the descriptor was extracted from
    pub source: String,
    /// When the extraction ran
    pub extracted_at: DateTime<Utc>,
    /// Bounding box of the detected face in the source image
    pub region: FaceRegion,
    /// The 128-d descriptor
    pub descriptor: FaceDescriptor,
}

impl DescriptorFile {
    pub fn new(source: &Path, face: DetectedFace) -> Self {
        Self {
            source: source.display().to_string(),
            extracted_at: Utc::now(),
            region: face.region,
            descriptor: face.descriptor,
        }
    }
}

/// Build the face extractor selected by the oracle arguments.
pub fn build_extractor(args: &OracleArgs, quiet: bool) -> Result<FaceExtractor> {
    if args.mock {
        if !quiet {
            use colored::Colorize;
            eprintln!("{}", "Using MOCK face oracle (for testing only)".yellow());
        }
        return Ok(FaceExtractor::new(OracleFactory::create_mock()));
    }

    #[cfg(feature = "dlib")]
    {
        use aegis_core::{DlibOracleConfig, OracleConfig};

        let config = DlibOracleConfig::new(&args.landmark_model, &args.encoder_model);
        let oracle = OracleFactory::create(OracleConfig::Dlib(config))
            .context("Failed to load dlib models (pass --mock to run without them)")?;
        Ok(FaceExtractor::new(oracle))
    }

    #[cfg(not(feature = "dlib"))]
    {
        bail!("Built without the dlib feature; only --mock is available")
    }
}

/// Read and decode an image file.
pub fn read_image(path: &Path) -> Result<image::RgbImage> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    debug!(path = %path.display(), bytes = data.len(), "Read image");
    Ok(decode_image(&data)?)
}

/// Load one descriptor file, accepting the single-object form or a
/// one-element array (the two shapes `extract` produces).
pub fn load_descriptor_file(path: &Path) -> Result<DescriptorFile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read descriptor file: {}", path.display()))?;

    if let Ok(single) = serde_json::from_slice::<DescriptorFile>(&bytes) {
        debug!(form = "object", "Parsed descriptor file");
        return Ok(single);
    }
    if let Ok(mut many) = serde_json::from_slice::<Vec<DescriptorFile>>(&bytes) {
        debug!(form = "array", faces = many.len(), "Parsed descriptor file");
        match many.len() {
            1 => return Ok(many.remove(0)),
            n => bail!(
                "Descriptor file {} holds {} faces; gallery entries must hold exactly one",
                path.display(),
                n
            ),
        }
    }
    bail!("Failed to parse descriptor file: {}", path.display())
}

/// Load every `.json` descriptor in the gallery directory.
///
/// The identity of each record is the file stem, and records are ordered
/// by identity so repeated runs scan the gallery in the same order.
pub fn load_gallery(dir: &Path) -> Result<Vec<GalleryRecord>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read gallery directory: {}", dir.display()))?;

    let mut records = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read gallery directory: {}", dir.display()))?
            .path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(identity) = path.file_stem().and_then(|s| s.to_str()) else {
            bail!("Gallery file has no usable name: {}", path.display());
        };
        let identity = identity.to_string();
        let file = load_descriptor_file(&path)?;
        records.push(GalleryRecord::new(
            identity,
            file.descriptor,
            path.display().to_string(),
        ));
    }

    records.sort_by(|a, b| a.identity.cmp(&b.identity));
    debug!(records = records.len(), "Loaded gallery");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aegis_core::DESCRIPTOR_LEN;

    fn sample_face() -> DetectedFace {
        DetectedFace {
            region: FaceRegion {
                left: 4,
                top: 4,
                right: 60,
                bottom: 60,
            },
            descriptor: FaceDescriptor::new(vec![0.25; DESCRIPTOR_LEN]).unwrap(),
        }
    }

    #[test]
    fn test_descriptor_file_roundtrip() {
        let file = DescriptorFile::new(Path::new("probe.png"), sample_face());
        let json = serde_json::to_string_pretty(&file).unwrap();
        let restored: DescriptorFile = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.source, "probe.png");
        assert_eq!(restored.descriptor, file.descriptor);
        assert_eq!(restored.region, file.region);
    }

    #[test]
    fn test_load_accepts_object_and_single_array() {
        let dir = tempfile::tempdir().unwrap();
        let file = DescriptorFile::new(Path::new("probe.png"), sample_face());

        let object_path = dir.path().join("object.json");
        std::fs::write(&object_path, serde_json::to_vec(&file).unwrap()).unwrap();
        assert!(load_descriptor_file(&object_path).is_ok());

        let array_path = dir.path().join("array.json");
        std::fs::write(&array_path, serde_json::to_vec(&vec![file.clone()]).unwrap()).unwrap();
        assert!(load_descriptor_file(&array_path).is_ok());

        let multi_path = dir.path().join("multi.json");
        std::fs::write(
            &multi_path,
            serde_json::to_vec(&vec![file.clone(), file]).unwrap(),
        )
        .unwrap();
        assert!(load_descriptor_file(&multi_path).is_err());
    }

    #[test]
    fn test_gallery_identity_is_file_stem_and_order_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["zoe@example.com", "ada@example.com"] {
            let file = DescriptorFile::new(Path::new("probe.png"), sample_face());
            std::fs::write(
                dir.path().join(format!("{name}.json")),
                serde_json::to_vec(&file).unwrap(),
            )
            .unwrap();
        }
        // A non-JSON file is skipped, not an error
        std::fs::write(dir.path().join("README.txt"), b"not a descriptor").unwrap();

        let records = load_gallery(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identity, "ada@example.com");
        assert_eq!(records[1].identity, "zoe@example.com");
    }
}
