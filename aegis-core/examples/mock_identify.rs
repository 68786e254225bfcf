//! Example running the extract-enroll-match pipeline on the mock oracle.
//!
//! Run with: cargo run -p aegis-core --example mock_identify

use aegis_core::matcher::match_probe;
use aegis_core::{FaceExtractor, GalleryRecord, MatchOutcome, MatchPolicy, OracleFactory};
use image::{Rgb, RgbImage};
use tracing_subscriber::{fmt, EnvFilter};

fn portrait(seed: u8) -> RgbImage {
    RgbImage::from_fn(48, 48, |x, y| {
        Rgb([
            seed.wrapping_add(x as u8),
            seed.wrapping_mul(5).wrapping_add(y as u8),
            x as u8 ^ y as u8,
        ])
    })
}

fn main() {
    // Initialize tracing subscriber with debug level
    fmt()
        .with_env_filter(EnvFilter::new("aegis_core=debug,info"))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    println!("=== Mock Identification Demo ===\n");

    let extractor = FaceExtractor::new(OracleFactory::create_mock());

    // Enroll two identities from distinct synthetic portraits.
    let mut gallery = Vec::new();
    for (identity, seed) in [("ada@example.com", 10u8), ("grace@example.com", 200u8)] {
        match extractor.extract_exactly_one(&portrait(seed)) {
            Ok(face) => {
                println!("Enrolled {identity}");
                gallery.push(GalleryRecord::new(
                    identity,
                    face.descriptor,
                    format!("crops/{identity}.jpg"),
                ));
            }
            Err(e) => {
                eprintln!("Enrollment failed for {identity}: {e}");
                return;
            }
        }
    }

    // Probe with Ada's portrait, then with a stranger's.
    for (label, seed) in [("ada's own portrait", 10u8), ("a stranger", 77u8)] {
        println!("\nProbing with {label}...");
        let probe = match extractor.extract_exactly_one(&portrait(seed)) {
            Ok(face) => face,
            Err(e) => {
                eprintln!("Extraction failed: {e}");
                return;
            }
        };

        match match_probe(&probe.descriptor, &gallery, MatchPolicy::default()) {
            MatchOutcome::Matched { identity, distance } => {
                println!("✅ Matched {identity} (distance {distance:.4})");
            }
            MatchOutcome::Rejected(reason) => {
                println!("❌ Rejected: {reason}");
            }
        }
    }
}
