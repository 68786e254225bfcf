//! Extract command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::exit_codes::SUCCESS;
use crate::utils::{self, DescriptorFile};
use crate::OracleArgs;

/// Execute the extract command.
///
/// Without `--require-one` the output is a JSON array of every detected
/// face, which may be empty. With it, the output is a single object and a
/// zero or multi face image is an error.
pub fn execute(
    image: &Path,
    output: Option<&Path>,
    require_one: bool,
    oracle: &OracleArgs,
    quiet: bool,
) -> Result<i32> {
    let extractor = utils::build_extractor(oracle, quiet)?;
    let pixels = utils::read_image(image)?;

    let json = if require_one {
        let face = extractor.extract_exactly_one(&pixels)?;
        info!(region = ?face.region, "Extracted face");
        serde_json::to_string_pretty(&DescriptorFile::new(image, face))?
    } else {
        let faces = extractor.extract(&pixels)?;
        info!(faces = faces.len(), "Extracted faces");
        let files: Vec<DescriptorFile> = faces
            .into_iter()
            .map(|face| DescriptorFile::new(image, face))
            .collect();
        serde_json::to_string_pretty(&files)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write descriptor file: {}", path.display()))?;
            if !quiet {
                println!("{} {}", "Wrote".green(), path.display());
            }
        }
        None => println!("{json}"),
    }

    Ok(SUCCESS)
}
