// SPDX-License-Identifier: GPL-3.0-only

//! Camera-facing types and frame sources
//!
//! The actual device binding lives outside this crate; these modules define
//! the frame representation the pipeline consumes and a file-backed source
//! used by the CLI and tests.
//!
//! # Modules
//!
//! - [`types`]: Frame and plane representation, sensor rotation
//! - [`source`]: File-backed and synthetic frame production

pub mod source;
pub mod types;

pub use types::{FrameBuffer, Plane, SensorRotation};
