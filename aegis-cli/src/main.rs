//! Aegis CLI - Face descriptor extraction and offline identification tool.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use aegis_core::DEFAULT_MATCH_THRESHOLD;

mod commands;
mod exit_codes;
mod utils;

const EXIT_CODES_HELP: &str = "Exit codes:
  0  success / match accepted
  1  no acceptable match
  2  usage error
  3  no face or multiple faces in an input image
  4  I/O or oracle failure";

#[derive(Parser)]
#[command(name = "aegis")]
#[command(author, version, about = "Face descriptor extraction and identification", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress banners and progress output
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Oracle selection shared by every subcommand.
#[derive(Args, Debug)]
pub struct OracleArgs {
    /// Use the deterministic mock oracle instead of dlib models (for testing)
    #[arg(long)]
    pub mock: bool,

    /// Path to the dlib landmark predictor model
    #[arg(
        long,
        value_name = "PATH",
        default_value = "models/shape_predictor_68_face_landmarks.dat"
    )]
    pub landmark_model: String,

    /// Path to the dlib face encoder model
    #[arg(
        long,
        value_name = "PATH",
        default_value = "models/dlib_face_recognition_resnet_model_v1.dat"
    )]
    pub encoder_model: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract face descriptors from an image as JSON
    Extract {
        /// Path to the image to scan
        #[arg(value_name = "IMAGE")]
        image: PathBuf,

        /// Write the JSON to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Fail unless the image contains exactly one face
        #[arg(long)]
        require_one: bool,

        #[command(flatten)]
        oracle: OracleArgs,
    },

    /// Compare the faces in two images
    Compare {
        /// Path to the first image
        #[arg(value_name = "IMAGE_A")]
        image_a: PathBuf,

        /// Path to the second image
        #[arg(value_name = "IMAGE_B")]
        image_b: PathBuf,

        /// Maximum descriptor distance accepted as a match
        #[arg(short, long, value_name = "DIST", default_value_t = DEFAULT_MATCH_THRESHOLD)]
        threshold: f64,

        #[command(flatten)]
        oracle: OracleArgs,
    },

    /// Identify the face in a probe image against a gallery directory
    Identify {
        /// Path to the probe image
        #[arg(value_name = "IMAGE")]
        probe: PathBuf,

        /// Directory of descriptor files, one <identity>.json per person
        #[arg(short, long, value_name = "DIR")]
        gallery: PathBuf,

        /// Maximum descriptor distance accepted as a match
        #[arg(short, long, value_name = "DIST", default_value_t = DEFAULT_MATCH_THRESHOLD)]
        threshold: f64,

        #[command(flatten)]
        oracle: OracleArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Extract {
            image,
            output,
            require_one,
            oracle,
        } => commands::extract::execute(&image, output.as_deref(), require_one, &oracle, cli.quiet),
        Commands::Compare {
            image_a,
            image_b,
            threshold,
            oracle,
        } => commands::compare::execute(&image_a, &image_b, threshold, &oracle, cli.quiet),
        Commands::Identify {
            probe,
            gallery,
            threshold,
            oracle,
        } => commands::identify::execute(&probe, &gallery, threshold, &oracle, cli.quiet),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            process::exit(exit_codes::classify(&err));
        }
    }
}
