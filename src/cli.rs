// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for scan operations
//!
//! Runs the capture pipeline against a still image file, which exercises
//! the same detection, repacking, and encoding path a live camera feed
//! takes.

use chrono::Local;
use scangrab::camera::source::{frame_stream, load_image_frame};
use scangrab::camera::types::SensorRotation;
use scangrab::config::ScanConfig;
use scangrab::detect::qr::QrDetector;
use scangrab::pipeline::{CaptureResult, ScanPipeline};
use std::path::PathBuf;
use std::sync::Arc;

/// Scan an image file and save the frozen frame as JPEG
pub async fn scan_file(
    file: PathBuf,
    rotation: i32,
    quality: Option<u8>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = ScanConfig::load();
    if let Some(quality) = quality {
        config.jpeg_quality = quality.clamp(1, 100);
    }

    let detector = Arc::new(QrDetector::with_max_dimension(config.max_detect_dimension));
    let pipeline = ScanPipeline::new(detector, config);
    let session = pipeline.begin();

    let rotation = SensorRotation::from_degrees_int(rotation);
    let frame = load_image_frame(&file, rotation)?;

    match session.run(frame_stream(frame, 1)).await {
        CaptureResult::Success { text, format, jpeg } => {
            let output = output.unwrap_or_else(|| {
                let timestamp = Local::now().format("%Y%m%d_%H%M%S");
                PathBuf::from(format!("IMG_{}.jpg", timestamp))
            });
            std::fs::write(&output, &jpeg)?;

            println!("{} ({})", text, format);
            println!("Frame saved to {}", output.display());
            Ok(())
        }
        CaptureResult::Failure { message } => Err(message.into()),
    }
}
