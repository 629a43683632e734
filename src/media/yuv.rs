// SPDX-License-Identifier: GPL-3.0-only

//! Planar YUV 4:2:0 repacking and NV21 to RGB conversion
//!
//! [`yuv420_to_nv21`] reinterprets a three-plane frame (arbitrary row and
//! pixel strides per plane) into one contiguous NV21 buffer: `width*height`
//! luma bytes followed by `width*height/2` interleaved (V,U) chroma pairs.
//! It performs no color-space math, only sample repacking.
//!
//! [`nv21_to_rgb`] is the color conversion used before JPEG encoding,
//! an integer BT.601 approximation (limited-range luma).

use crate::camera::types::{FrameBuffer, Plane};
use crate::errors::CaptureError;
use image::RgbImage;

/// Copy the luma plane into a tightly packed `width*height` buffer
///
/// Validates frame geometry first; the same clamped addressing rules as
/// [`yuv420_to_nv21`] apply. Used by detectors that operate on grayscale
/// input as well as by the NV21 repacking itself.
pub fn copy_luma(frame: &FrameBuffer) -> Result<Vec<u8>, CaptureError> {
    frame.validate()?;

    let width = frame.width as usize;
    let height = frame.height as usize;
    let mut out = Vec::with_capacity(width * height);
    copy_plane(&frame.luma, height, width, &mut out);
    Ok(out)
}

/// Convert a planar YUV 4:2:0 frame to a contiguous NV21 buffer
///
/// Output length is always exactly `width*height*3/2`. Geometry violations
/// fail with `InputValidation` before any plane byte is read. Reads are
/// clamped to the backing region: a declared row stride may overrun the
/// physical buffer near the final row, in which case missing samples are
/// emitted as zero rather than read out of bounds.
pub fn yuv420_to_nv21(frame: &FrameBuffer) -> Result<Vec<u8>, CaptureError> {
    frame.validate()?;

    let width = frame.width as usize;
    let height = frame.height as usize;
    let mut out = Vec::with_capacity(width * height * 3 / 2);

    copy_plane(&frame.luma, height, width, &mut out);
    interleave_chroma(
        &frame.chroma_v,
        &frame.chroma_u,
        height / 2,
        width / 2,
        &mut out,
    );

    debug_assert_eq!(out.len(), width * height * 3 / 2);
    Ok(out)
}

/// Copy `rows * samples_per_row` samples from a plane, honoring its strides
///
/// Dispatches to a bulk copy when the plane is tightly packed.
fn copy_plane(plane: &Plane, rows: usize, samples_per_row: usize, out: &mut Vec<u8>) {
    // Fast path: the whole plane is one contiguous region
    if plane.pixel_stride == 1 && plane.row_stride == samples_per_row {
        let wanted = rows * samples_per_row;
        let take = wanted.min(plane.data.len());
        out.extend_from_slice(&plane.data[..take]);
        out.resize(out.len() + (wanted - take), 0);
        return;
    }

    copy_plane_strided(plane, rows, samples_per_row, out);
}

/// General strided copy; byte-identical to the fast path on tight planes
fn copy_plane_strided(plane: &Plane, rows: usize, samples_per_row: usize, out: &mut Vec<u8>) {
    for r in 0..rows {
        let row = clamped_row(plane, r);
        for c in 0..samples_per_row {
            out.push(row.get(c * plane.pixel_stride).copied().unwrap_or(0));
        }
    }
}

/// Interleave the two half-resolution chroma planes as (V,U) pairs
fn interleave_chroma(v: &Plane, u: &Plane, rows: usize, cols: usize, out: &mut Vec<u8>) {
    for r in 0..rows {
        let v_row = clamped_row(v, r);
        let u_row = clamped_row(u, r);
        for c in 0..cols {
            out.push(v_row.get(c * v.pixel_stride).copied().unwrap_or(0));
            out.push(u_row.get(c * u.pixel_stride).copied().unwrap_or(0));
        }
    }
}

/// View of one plane row, clamped to the bytes actually backing it
fn clamped_row(plane: &Plane, row: usize) -> &[u8] {
    let start = row * plane.row_stride;
    if start >= plane.data.len() {
        return &[];
    }
    let len = plane.row_stride.min(plane.data.len() - start);
    &plane.data[start..start + len]
}

/// Convert a contiguous NV21 buffer to an RGB image
///
/// Integer BT.601 approximation with shift-based coefficients, processing
/// two luma rows per chroma row. NV21 stores chroma as (V,U) pairs.
pub fn nv21_to_rgb(nv21: &[u8], width: u32, height: u32) -> Result<RgbImage, CaptureError> {
    let w = width as usize;
    let h = height as usize;

    if w == 0 || h == 0 || w % 2 != 0 || h % 2 != 0 {
        return Err(CaptureError::InputValidation(format!(
            "NV21 dimensions must be positive and even, got {}x{}",
            width, height
        )));
    }
    let expected = w * h * 3 / 2;
    if nv21.len() != expected {
        return Err(CaptureError::InputValidation(format!(
            "NV21 buffer is {} bytes, expected {} for {}x{}",
            nv21.len(),
            expected,
            width,
            height
        )));
    }

    let y_plane = &nv21[..w * h];
    let vu_plane = &nv21[w * h..];
    let mut rgb_data = vec![0u8; w * h * 3];

    for y_idx in (0..h).step_by(2) {
        let vu_row = y_idx / 2;
        process_row(y_plane, vu_plane, &mut rgb_data, y_idx, vu_row, w);
        process_row(y_plane, vu_plane, &mut rgb_data, y_idx + 1, vu_row, w);
    }

    RgbImage::from_raw(width, height, rgb_data)
        .ok_or_else(|| CaptureError::Conversion("failed to assemble RGB image".to_string()))
}

#[inline]
fn process_row(
    y_plane: &[u8],
    vu_plane: &[u8],
    rgb_data: &mut [u8],
    y_idx: usize,
    vu_row: usize,
    width: usize,
) {
    let y_row_start = y_idx * width;
    let vu_row_start = vu_row * width;
    let rgb_row_start = y_idx * width * 3;

    // Process pixels in pairs sharing one chroma sample
    for x_idx in (0..width).step_by(2) {
        let vu_offset = vu_row_start + x_idx;
        let v = vu_plane[vu_offset] as i32 - 128;
        let u = vu_plane[vu_offset + 1] as i32 - 128;

        let r_v = (179 * v) >> 7;
        let g_u = (44 * u) >> 7;
        let g_v = (91 * v) >> 7;
        let b_u = (227 * u) >> 7;

        let y1 = ((y_plane[y_row_start + x_idx] as i32 - 16) * 149) >> 7;
        let rgb_offset = rgb_row_start + x_idx * 3;
        rgb_data[rgb_offset] = (y1 + r_v).clamp(0, 255) as u8;
        rgb_data[rgb_offset + 1] = (y1 - g_u - g_v).clamp(0, 255) as u8;
        rgb_data[rgb_offset + 2] = (y1 + b_u).clamp(0, 255) as u8;

        let y2 = ((y_plane[y_row_start + x_idx + 1] as i32 - 16) * 149) >> 7;
        let rgb_offset2 = rgb_row_start + (x_idx + 1) * 3;
        rgb_data[rgb_offset2] = (y2 + r_v).clamp(0, 255) as u8;
        rgb_data[rgb_offset2 + 1] = (y2 - g_u - g_v).clamp(0, 255) as u8;
        rgb_data[rgb_offset2 + 2] = (y2 + b_u).clamp(0, 255) as u8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::types::SensorRotation;

    fn frame(
        width: u32,
        height: u32,
        luma: Plane,
        chroma_u: Plane,
        chroma_v: Plane,
    ) -> FrameBuffer {
        FrameBuffer {
            width,
            height,
            rotation: SensorRotation::None,
            luma,
            chroma_u,
            chroma_v,
        }
    }

    fn tight_frame(width: u32, height: u32, fill: u8) -> FrameBuffer {
        let w = width as usize;
        let h = height as usize;
        frame(
            width,
            height,
            Plane::tight(vec![fill; w * h], w),
            Plane::tight(vec![128u8; w / 2 * (h / 2)], w / 2),
            Plane::tight(vec![128u8; w / 2 * (h / 2)], w / 2),
        )
    }

    #[test]
    fn test_output_length_is_three_halves() {
        let nv21 = yuv420_to_nv21(&tight_frame(8, 6, 0)).unwrap();
        assert_eq!(nv21.len(), 8 * 6 * 3 / 2);

        let nv21 = yuv420_to_nv21(&tight_frame(640, 480, 0)).unwrap();
        assert_eq!(nv21.len(), 640 * 480 * 3 / 2);
    }

    #[test]
    fn test_fast_path_matches_strided_path() {
        // pixel_stride=1, row_stride=width: both paths must agree byte for byte
        let data: Vec<u8> = (0u8..=47).collect();
        let plane = Plane::tight(data, 8);

        let mut fast = Vec::new();
        copy_plane(&plane, 6, 8, &mut fast);

        let mut general = Vec::new();
        copy_plane_strided(&plane, 6, 8, &mut general);

        assert_eq!(fast, general);
    }

    #[test]
    fn test_padded_rows_match_tight_rows() {
        // Same logical content, one plane with 2 bytes of row padding
        let tight: Vec<u8> = (0u8..8).collect();
        let padded = vec![0, 1, 2, 3, 99, 99, 4, 5, 6, 7, 99, 99];

        let mut from_tight = Vec::new();
        copy_plane(&Plane::tight(tight, 4), 2, 4, &mut from_tight);

        let mut from_padded = Vec::new();
        copy_plane(&Plane::new(padded, 6, 1), 2, 4, &mut from_padded);

        assert_eq!(from_tight, from_padded);
    }

    #[test]
    fn test_pixel_stride_two_takes_even_indexed_bytes() {
        // 4x2 luma with interleaved padding: only even-indexed bytes are samples
        let luma_data = vec![
            10, 0, 20, 0, 30, 0, 40, 0, // row 0
            50, 0, 60, 0, 70, 0, 80, 0, // row 1
        ];
        let f = frame(
            4,
            2,
            Plane::new(luma_data, 8, 2),
            Plane::new(vec![1u8, 0, 1, 0], 4, 2),
            Plane::new(vec![2u8, 0, 2, 0], 4, 2),
        );

        let nv21 = yuv420_to_nv21(&f).unwrap();
        assert_eq!(&nv21[..8], &[10, 20, 30, 40, 50, 60, 70, 80]);
    }

    #[test]
    fn test_chroma_pairs_are_v_then_u() {
        let f = frame(
            4,
            2,
            Plane::tight(vec![0u8; 8], 4),
            Plane::tight(vec![11u8, 11], 2),
            Plane::tight(vec![22u8, 22], 2),
        );

        let nv21 = yuv420_to_nv21(&f).unwrap();
        assert_eq!(&nv21[8..], &[22, 11, 22, 11]);
    }

    #[test]
    fn test_row_stride_overrun_is_clamped() {
        // Declared row_stride 6 for 4 samples, but the backing region stops
        // two bytes into the final row. Missing samples read as zero.
        let luma_data = vec![
            0, 1, 2, 3, 99, 99, //
            4, 5, 6, 7, 99, 99, //
            8, 9, 10, 11, 99, 99, //
            12, 13, // truncated final row
        ];
        let f = frame(
            4,
            4,
            Plane::new(luma_data, 6, 1),
            Plane::tight(vec![128u8; 4], 2),
            Plane::tight(vec![128u8; 4], 2),
        );

        let nv21 = yuv420_to_nv21(&f).unwrap();
        assert_eq!(nv21.len(), 4 * 4 * 3 / 2);
        assert_eq!(&nv21[12..16], &[12, 13, 0, 0]);
    }

    #[test]
    fn test_chroma_backing_shorter_than_declared() {
        // Chroma planes whose backing region ends before the declared rows do
        let f = frame(
            4,
            4,
            Plane::tight(vec![0u8; 16], 4),
            Plane::new(vec![7u8, 7], 2, 1),
            Plane::new(vec![9u8], 2, 1),
        );

        let nv21 = yuv420_to_nv21(&f).unwrap();
        // row 0: v=[9, 0], u=[7, 7]; row 1: both exhausted
        assert_eq!(&nv21[16..], &[9, 7, 0, 7, 0, 0, 0, 0]);
    }

    #[test]
    fn test_rejects_invalid_geometry() {
        let mut f = tight_frame(4, 2, 0);
        f.luma.row_stride = 2;
        assert!(matches!(
            yuv420_to_nv21(&f),
            Err(CaptureError::InputValidation(_))
        ));
    }

    #[test]
    fn test_copy_luma_is_nv21_prefix() {
        let f = tight_frame(6, 4, 42);
        let luma = copy_luma(&f).unwrap();
        let nv21 = yuv420_to_nv21(&f).unwrap();
        assert_eq!(luma.len(), 24);
        assert_eq!(&nv21[..24], luma.as_slice());
    }

    #[test]
    fn test_nv21_to_rgb_neutral_gray() {
        // Y=128 with neutral chroma decodes to equal RGB channels
        let mut nv21 = vec![128u8; 16];
        nv21.extend_from_slice(&[128u8; 8]);

        let rgb = nv21_to_rgb(&nv21, 4, 4).unwrap();
        assert_eq!(rgb.width(), 4);
        assert_eq!(rgb.height(), 4);
        for pixel in rgb.pixels() {
            assert_eq!(pixel[0], pixel[1]);
            assert_eq!(pixel[1], pixel[2]);
            // (128-16) * 1.164 ≈ 130
            assert!((125..=135).contains(&pixel[0]));
        }
    }

    #[test]
    fn test_nv21_to_rgb_rejects_wrong_length() {
        assert!(matches!(
            nv21_to_rgb(&[0u8; 10], 4, 4),
            Err(CaptureError::InputValidation(_))
        ));
        assert!(matches!(
            nv21_to_rgb(&[0u8; 6], 2, 1),
            Err(CaptureError::InputValidation(_))
        ));
    }
}
