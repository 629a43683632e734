// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection backed by the `rqrr` crate
//!
//! Works directly on the frame's luma plane: QR location and decoding only
//! need grayscale, so no chroma repacking happens on the detection path.
//! Frames are downscaled before detection for real-time throughput.

use crate::camera::types::FrameBuffer;
use crate::detect::{BarcodeFormat, DecodedPayload, Detector};
use crate::errors::CaptureError;
use crate::media::yuv::copy_luma;
use tracing::{debug, trace};

/// QR code detector
///
/// Detection is rotation invariant, so the frame's sensor rotation needs no
/// correction before scanning.
pub struct QrDetector {
    /// Maximum dimension for processing (larger frames are decimated to this)
    max_dimension: u32,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a detector with the default processing resolution
    pub fn new() -> Self {
        Self {
            // QR finder patterns survive decimation to 640px fine
            max_dimension: crate::constants::DEFAULT_DETECT_MAX_DIMENSION,
        }
    }

    /// Create a detector with a custom max processing dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
        }
    }
}

impl Detector for QrDetector {
    fn detect(&self, frame: &FrameBuffer) -> Result<Option<DecodedPayload>, CaptureError> {
        let start = std::time::Instant::now();

        let luma = copy_luma(frame)?;
        let width = frame.width as usize;
        let height = frame.height as usize;

        // Integer decimation down to at most max_dimension on the long edge
        let long_edge = width.max(height);
        let step = long_edge.div_ceil(self.max_dimension as usize).max(1);
        let proc_width = (width / step).max(1);
        let proc_height = (height / step).max(1);

        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            proc_width,
            proc_height,
            |x, y| luma[y * step * width + x * step],
        );
        let grids = prepared.detect_grids();

        trace!(
            proc_width,
            proc_height,
            step,
            grids = grids.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "QR grid detection complete"
        );

        for grid in grids {
            match grid.decode() {
                Ok((_meta, content)) => {
                    debug!(
                        content = %content,
                        total_ms = start.elapsed().as_millis(),
                        "Decoded QR code"
                    );
                    return Ok(Some(DecodedPayload {
                        text: content,
                        format: BarcodeFormat::QrCode,
                    }));
                }
                Err(e) => {
                    debug!(error = %e, "Failed to decode located QR grid");
                }
            }
        }

        Ok(None)
    }
}
