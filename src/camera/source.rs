// SPDX-License-Identifier: GPL-3.0-only

//! File-backed and synthetic frame production
//!
//! Real deployments feed the pipeline from a camera analysis loop; these
//! helpers produce the same planar YUV 4:2:0 frames from still images so
//! the CLI and tests can exercise the full path without a device.

use crate::camera::types::{FrameBuffer, Plane, SensorRotation};
use crate::errors::CaptureError;
use futures::Stream;
use image::RgbImage;
use std::path::Path;
use tracing::{debug, info};

/// Load an image file as a planar YUV 4:2:0 frame
///
/// Odd image dimensions are cropped down by one pixel; half-resolution
/// chroma requires even sizes.
pub fn load_image_frame(
    path: &Path,
    rotation: SensorRotation,
) -> Result<FrameBuffer, CaptureError> {
    let img = image::open(path)?.to_rgb8();
    let frame = frame_from_rgb(&img, rotation)?;

    info!(
        path = %path.display(),
        width = frame.width,
        height = frame.height,
        rotation = %rotation,
        "Loaded image as frame"
    );
    Ok(frame)
}

/// Convert an RGB image to a tightly packed planar YUV 4:2:0 frame
///
/// Forward BT.601 transform (limited-range luma), chroma averaged over each
/// 2x2 block. The inverse lives in [`crate::media::yuv::nv21_to_rgb`].
pub fn frame_from_rgb(
    img: &RgbImage,
    rotation: SensorRotation,
) -> Result<FrameBuffer, CaptureError> {
    let width = img.width() & !1;
    let height = img.height() & !1;
    if width == 0 || height == 0 {
        return Err(CaptureError::Conversion(format!(
            "image too small to sample ({}x{})",
            img.width(),
            img.height()
        )));
    }

    let w = width as usize;
    let h = height as usize;
    let mut luma = Vec::with_capacity(w * h);
    let mut chroma_u = Vec::with_capacity(w / 2 * (h / 2));
    let mut chroma_v = Vec::with_capacity(w / 2 * (h / 2));

    for y in 0..height {
        for x in 0..width {
            let p = img.get_pixel(x, y);
            luma.push(luma_of(p[0] as i32, p[1] as i32, p[2] as i32));
        }
    }

    for by in (0..height).step_by(2) {
        for bx in (0..width).step_by(2) {
            let mut u_sum = 0i32;
            let mut v_sum = 0i32;
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                let p = img.get_pixel(bx + dx, by + dy);
                let (u, v) = chroma_of(p[0] as i32, p[1] as i32, p[2] as i32);
                u_sum += u;
                v_sum += v;
            }
            chroma_u.push((u_sum / 4) as u8);
            chroma_v.push((v_sum / 4) as u8);
        }
    }

    debug!(width, height, "Converted RGB image to planar YUV");
    Ok(FrameBuffer {
        width,
        height,
        rotation,
        luma: Plane::tight(luma, w),
        chroma_u: Plane::tight(chroma_u, w / 2),
        chroma_v: Plane::tight(chroma_v, w / 2),
    })
}

#[inline]
fn luma_of(r: i32, g: i32, b: i32) -> u8 {
    (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16).clamp(0, 255) as u8
}

#[inline]
fn chroma_of(r: i32, g: i32, b: i32) -> (i32, i32) {
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (u.clamp(0, 255), v.clamp(0, 255))
}

/// Repeat one frame as a short burst stream
///
/// Frame clones share plane data, so this allocates nothing per yield.
pub fn frame_stream(frame: FrameBuffer, count: usize) -> impl Stream<Item = FrameBuffer> {
    async_stream::stream! {
        for _ in 0..count {
            yield frame.clone();
        }
    }
}
