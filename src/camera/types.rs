// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera frames
//!
//! A [`FrameBuffer`] is one captured frame in planar YUV 4:2:0 layout:
//! a full-resolution luma plane plus two half-resolution chroma planes,
//! each with its own row and pixel stride. Plane payloads are reference
//! counted, so cloning a frame never copies pixel data and dropping the
//! last reference releases the backing region.

use crate::errors::CaptureError;
use std::sync::Arc;

/// Sensor rotation in degrees (clockwise)
///
/// Camera sensors may be physically mounted at various angles relative to the
/// device. This is common on mobile devices where sensors are rotated 90° or
/// 270° relative to the display orientation. Only right-angle rotations exist,
/// so arbitrary angles are unrepresentable by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorRotation {
    /// No rotation (sensor is oriented correctly)
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl SensorRotation {
    /// Create rotation from an integer degree value (normalised to 0-360).
    pub fn from_degrees_int(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => SensorRotation::Rotate90,
            180 => SensorRotation::Rotate180,
            270 => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, SensorRotation::Rotate90 | SensorRotation::Rotate270)
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// One component plane of a planar frame
///
/// `row_stride` is the byte distance between the start of consecutive rows and
/// may exceed the payload width (alignment padding). `pixel_stride` is the
/// byte distance between consecutive samples within a row; interleaved chroma
/// sources report 2 here.
#[derive(Debug, Clone)]
pub struct Plane {
    /// Backing byte region for this plane
    pub data: Arc<[u8]>,
    /// Bytes between the start of consecutive rows
    pub row_stride: usize,
    /// Bytes between consecutive samples within a row
    pub pixel_stride: usize,
}

impl Plane {
    /// Create a plane with explicit strides
    pub fn new(data: impl Into<Arc<[u8]>>, row_stride: usize, pixel_stride: usize) -> Self {
        Self {
            data: data.into(),
            row_stride,
            pixel_stride,
        }
    }

    /// Create a tightly packed plane (`row_stride == width`, `pixel_stride == 1`)
    pub fn tight(data: impl Into<Arc<[u8]>>, width: usize) -> Self {
        Self::new(data, width, 1)
    }
}

/// A single frame from the camera in planar YUV 4:2:0 layout
///
/// The pipeline consumes frames by value; dropping a `FrameBuffer` is the
/// release. Every processing path (success, failure, early-skip, discard
/// after completion) consumes the frame it was handed exactly once.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    /// Sensor-to-display correction needed to make "up" match the scene
    pub rotation: SensorRotation,
    /// Full-resolution luma plane
    pub luma: Plane,
    /// Half-resolution chroma U plane
    pub chroma_u: Plane,
    /// Half-resolution chroma V plane
    pub chroma_v: Plane,
}

impl FrameBuffer {
    /// Validate plane geometry against the frame dimensions
    ///
    /// Checks the stride invariants before any plane byte is read:
    /// dimensions must be positive and even (half-resolution chroma assumes
    /// even sizes), and each plane must satisfy
    /// `row_stride >= samples_per_row * pixel_stride`. Violations are hard
    /// input-validation failures, never silent corruption.
    pub fn validate(&self) -> Result<(), CaptureError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::InputValidation(format!(
                "empty frame ({}x{})",
                self.width, self.height
            )));
        }
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(CaptureError::InputValidation(format!(
                "odd dimensions not supported ({}x{})",
                self.width, self.height
            )));
        }

        let width = self.width as usize;
        Self::validate_plane("luma", &self.luma, width)?;
        Self::validate_plane("chroma_u", &self.chroma_u, width / 2)?;
        Self::validate_plane("chroma_v", &self.chroma_v, width / 2)?;
        Ok(())
    }

    fn validate_plane(name: &str, plane: &Plane, samples: usize) -> Result<(), CaptureError> {
        if plane.pixel_stride == 0 {
            return Err(CaptureError::InputValidation(format!(
                "{} plane has zero pixel_stride",
                name
            )));
        }
        if plane.row_stride < samples * plane.pixel_stride {
            return Err(CaptureError::InputValidation(format!(
                "{} plane row_stride {} < {} samples * pixel_stride {}",
                name, plane.row_stride, samples, plane.pixel_stride
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight_frame(width: u32, height: u32) -> FrameBuffer {
        let w = width as usize;
        let h = height as usize;
        FrameBuffer {
            width,
            height,
            rotation: SensorRotation::None,
            luma: Plane::tight(vec![0u8; w * h], w),
            chroma_u: Plane::tight(vec![0u8; w / 2 * (h / 2)], w / 2),
            chroma_v: Plane::tight(vec![0u8; w / 2 * (h / 2)], w / 2),
        }
    }

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(SensorRotation::from_degrees_int(0), SensorRotation::None);
        assert_eq!(SensorRotation::from_degrees_int(90), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees_int(450), SensorRotation::Rotate90);
        assert_eq!(SensorRotation::from_degrees_int(-90), SensorRotation::Rotate270);
        assert_eq!(SensorRotation::from_degrees_int(45), SensorRotation::None);
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        assert!(!SensorRotation::None.swaps_dimensions());
        assert!(SensorRotation::Rotate90.swaps_dimensions());
        assert!(!SensorRotation::Rotate180.swaps_dimensions());
        assert!(SensorRotation::Rotate270.swaps_dimensions());
    }

    #[test]
    fn test_validate_accepts_tight_frame() {
        assert!(tight_frame(4, 2).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_odd_dimensions() {
        let mut frame = tight_frame(4, 2);
        frame.width = 3;
        assert!(matches!(
            frame.validate(),
            Err(CaptureError::InputValidation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_undersized_row_stride() {
        let mut frame = tight_frame(4, 2);
        // pixel_stride 2 needs row_stride >= 8
        frame.luma.pixel_stride = 2;
        assert!(matches!(
            frame.validate(),
            Err(CaptureError::InputValidation(_))
        ));
    }

    #[test]
    fn test_clone_shares_plane_data() {
        let frame = tight_frame(4, 2);
        let copy = frame.clone();
        assert_eq!(Arc::strong_count(&frame.luma.data), 2);
        drop(copy);
        assert_eq!(Arc::strong_count(&frame.luma.data), 1);
    }
}
