// SPDX-License-Identifier: GPL-3.0-only

//! scangrab - barcode scan-and-capture pipeline
//!
//! Detects a barcode/QR payload in a live camera frame stream and, on the
//! first detection, freezes that exact frame: the planar YUV buffer is
//! repacked, JPEG-compressed, orientation-corrected, and delivered with the
//! decoded text exactly once per session.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`pipeline`]: Session orchestration and single-shot completion gating
//! - [`camera`]: Frame representation and file-backed frame sources
//! - [`media`]: Pixel repacking and JPEG encode/rotate
//! - [`detect`]: Barcode detection abstraction and the QR implementation
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```ignore
//! let detector = Arc::new(QrDetector::new());
//! let pipeline = ScanPipeline::new(detector, ScanConfig::default());
//! let session = pipeline.begin();
//! // feed frames from the camera's analysis callback:
//! //   handle.submit_frame(frame);
//! let result = session.wait().await;
//! ```

pub mod camera;
pub mod config;
pub mod constants;
pub mod detect;
pub mod errors;
pub mod media;
pub mod pipeline;

// Re-export commonly used types
pub use camera::types::{FrameBuffer, Plane, SensorRotation};
pub use config::ScanConfig;
pub use detect::{BarcodeFormat, DecodedPayload, Detector};
pub use errors::CaptureError;
pub use pipeline::{CaptureResult, ScanPipeline, ScanSession, SessionHandle};
