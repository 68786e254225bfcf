//! Identify command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use aegis_core::{match_probe, MatchOutcome, MatchPolicy};

use crate::exit_codes::{NO_MATCH, SUCCESS};
use crate::utils;
use crate::OracleArgs;

/// Execute the identify command.
pub fn execute(
    probe: &Path,
    gallery_dir: &Path,
    threshold: f64,
    oracle: &OracleArgs,
    quiet: bool,
) -> Result<i32> {
    let extractor = utils::build_extractor(oracle, quiet)?;

    let face = extractor
        .extract_exactly_one(&utils::read_image(probe)?)
        .with_context(|| format!("No usable face in {}", probe.display()))?;

    let gallery = utils::load_gallery(gallery_dir)?;
    info!(
        gallery = %gallery_dir.display(),
        records = gallery.len(),
        "Gallery loaded"
    );

    match match_probe(
        &face.descriptor,
        &gallery,
        MatchPolicy::with_threshold(threshold),
    ) {
        MatchOutcome::Matched { identity, distance } => {
            info!(identity = %identity, distance, "Probe identified");

            if !quiet {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".green());
                println!(
                    "{}",
                    "║              IDENTIFIED                ║".green().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".green());
                println!();
                println!("   {} {}", "Identity:".dimmed(), identity.green());
                println!(
                    "   {} {:.4} (threshold {:.4})",
                    "Distance:".dimmed(),
                    distance,
                    threshold
                );
            }
            Ok(SUCCESS)
        }
        MatchOutcome::Rejected(reason) => {
            info!(reason = %reason, "Probe rejected");

            if !quiet {
                println!();
                println!("{}", "╔════════════════════════════════════════╗".red());
                println!(
                    "{}",
                    "║              NOT RECOGNIZED            ║".red().bold()
                );
                println!("{}", "╚════════════════════════════════════════╝".red());
                println!();
                println!("   {} {}", "Reason:".dimmed(), reason.to_string().red());
            }
            Ok(NO_MATCH)
        }
    }
}
