// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scan-and-grab pipeline

use std::fmt;

/// Errors raised while driving a scan session
///
/// Every variant is terminal for the session it occurs in: the pipeline maps
/// it to a `CaptureResult::Failure` and never retries. Starting a fresh
/// session is the caller's retry mechanism.
#[derive(Debug, Clone)]
pub enum CaptureError {
    /// Malformed plane geometry (stride/dimension invariants violated)
    InputValidation(String),
    /// The barcode detector reported a failure
    Detection(String),
    /// Pixel repacking or JPEG encode/decode failed
    Conversion(String),
    /// Camera access was never granted
    AuthorizationDenied,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::InputValidation(msg) => write!(f, "invalid frame geometry: {}", msg),
            CaptureError::Detection(msg) => write!(f, "detection failed: {}", msg),
            CaptureError::Conversion(msg) => write!(f, "conversion failed: {}", msg),
            CaptureError::AuthorizationDenied => write!(f, "camera access denied"),
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<image::ImageError> for CaptureError {
    fn from(err: image::ImageError) -> Self {
        CaptureError::Conversion(err.to_string())
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Conversion(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = CaptureError::InputValidation("row_stride 2 < 4".to_string());
        assert_eq!(err.to_string(), "invalid frame geometry: row_stride 2 < 4");
        assert_eq!(
            CaptureError::AuthorizationDenied.to_string(),
            "camera access denied"
        );
    }
}
