//! Compare command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::exit_codes::{NO_MATCH, SUCCESS};
use crate::utils;
use crate::OracleArgs;

/// Execute the compare command.
///
/// Each image must contain exactly one face. The verdict is carried by the
/// exit code, so `--quiet` runs print nothing at all.
pub fn execute(
    image_a: &Path,
    image_b: &Path,
    threshold: f64,
    oracle: &OracleArgs,
    quiet: bool,
) -> Result<i32> {
    let extractor = utils::build_extractor(oracle, quiet)?;

    let face_a = extractor
        .extract_exactly_one(&utils::read_image(image_a)?)
        .with_context(|| format!("No usable face in {}", image_a.display()))?;
    let face_b = extractor
        .extract_exactly_one(&utils::read_image(image_b)?)
        .with_context(|| format!("No usable face in {}", image_b.display()))?;

    let distance = face_a.descriptor.distance(&face_b.descriptor);
    let matched = distance <= threshold;

    info!(distance, threshold, matched, "Compared faces");

    if matched {
        if !quiet {
            println!();
            println!("{}", "╔════════════════════════════════════════╗".green());
            println!(
                "{}",
                "║              MATCH                     ║".green().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".green());
            println!();
            println!(
                "   {} {:.4} (threshold {:.4})",
                "Distance:".dimmed(),
                distance,
                threshold
            );
        }
        Ok(SUCCESS)
    } else {
        if !quiet {
            println!();
            println!("{}", "╔════════════════════════════════════════╗".red());
            println!(
                "{}",
                "║              NO MATCH                  ║".red().bold()
            );
            println!("{}", "╚════════════════════════════════════════╝".red());
            println!();
            println!(
                "   {} {:.4} (threshold {:.4})",
                "Distance:".dimmed(),
                distance,
                threshold
            );
        }
        Ok(NO_MATCH)
    }
}
