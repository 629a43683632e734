// SPDX-License-Identifier: GPL-3.0-only

//! Media processing utilities for pixel repacking and JPEG handling
//!
//! Camera frames arrive as planar YUV 4:2:0 with per-plane strides. The
//! [`yuv`] module repacks them into the interleaved NV21 layout the JPEG
//! path consumes, and converts NV21 to RGB rasters for encoding. The
//! [`jpeg`] module wraps the `image` codec: NV21 encode and the rotation
//! normalization applied after encoding.
//!
//! # Modules
//!
//! - [`yuv`]: Planar YUV 4:2:0 to NV21 repacking, NV21 to RGB conversion
//! - [`jpeg`]: JPEG encoding and orientation normalization

pub mod jpeg;
pub mod yuv;

// Re-export commonly used operations
pub use jpeg::{encode_nv21, normalize_orientation};
pub use yuv::{copy_luma, nv21_to_rgb, yuv420_to_nv21};
