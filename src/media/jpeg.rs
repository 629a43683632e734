// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding and orientation normalization
//!
//! Wraps the `image` codec for the two operations the capture pipeline
//! needs: compressing an NV21 buffer into a JPEG, and re-orienting an
//! already compressed image to undo sensor-mount rotation.

use crate::camera::types::SensorRotation;
use crate::constants::ROTATE_REENCODE_QUALITY;
use crate::errors::CaptureError;
use crate::media::yuv::nv21_to_rgb;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::debug;

/// Encode an NV21 buffer as JPEG at the given quality (1-100, clamped)
pub fn encode_nv21(
    nv21: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, CaptureError> {
    let rgb = nv21_to_rgb(nv21, width, height)?;
    let jpeg = encode_rgb(&rgb, quality.clamp(1, 100))?;

    debug!(width, height, size = jpeg.len(), "Encoded NV21 frame as JPEG");
    Ok(jpeg)
}

/// Rotate a compressed image so "up" matches the physical scene
///
/// A zero rotation returns the input bytes unchanged without a decode/encode
/// round trip. Otherwise the image is decoded, rotated clockwise by the
/// sensor angle, and re-encoded at maximum quality; the generational loss is
/// accepted since the image was already lossily compressed once upstream.
pub fn normalize_orientation(
    jpeg: Vec<u8>,
    rotation: SensorRotation,
) -> Result<Vec<u8>, CaptureError> {
    if rotation == SensorRotation::None {
        return Ok(jpeg);
    }

    let src = image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg)?;
    let rotated = rotate_raster(src, rotation);

    debug!(
        degrees = rotation.degrees(),
        width = rotated.width(),
        height = rotated.height(),
        "Normalized JPEG orientation"
    );
    encode_rgb(&rotated.to_rgb8(), ROTATE_REENCODE_QUALITY)
}

/// Apply a right-angle clockwise rotation to a decoded raster
fn rotate_raster(src: DynamicImage, rotation: SensorRotation) -> DynamicImage {
    match rotation {
        SensorRotation::None => src,
        SensorRotation::Rotate90 => src.rotate90(),
        SensorRotation::Rotate180 => src.rotate180(),
        SensorRotation::Rotate270 => src.rotate270(),
    }
}

fn encode_rgb(rgb: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality);

    encoder
        .encode(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| CaptureError::Conversion(format!("JPEG encoding failed: {}", e)))?;

    Ok(buffer)
}
