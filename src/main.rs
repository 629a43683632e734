// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "scangrab")]
#[command(about = "Decode a barcode from an image and freeze the frame as JPEG")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an image file through the capture pipeline
    Scan {
        /// Image file to scan
        file: PathBuf,

        /// Sensor rotation to undo, in degrees (0, 90, 180, 270)
        #[arg(short, long, default_value = "0")]
        rotation: i32,

        /// JPEG quality for the frozen frame (1-100)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Output file path (default: ./IMG_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=scangrab=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            file,
            rotation,
            quality,
            output,
        } => cli::scan_file(file, rotation, quality, output).await,
    }
}
