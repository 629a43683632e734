// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// JPEG quality used when freezing the accepted frame
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Re-encode quality after the rotation pass
///
/// The frame already paid its lossy cost at the first encode; rotation
/// re-encodes at maximum quality to avoid compounding it.
pub const ROTATE_REENCODE_QUALITY: u8 = 100;

/// Long-edge size frames are decimated to before barcode detection
pub const DEFAULT_DETECT_MAX_DIMENSION: u32 = 640;

/// Directory under the platform config root holding our settings
pub const CONFIG_DIR_NAME: &str = "scangrab";

/// Settings file name
pub const CONFIG_FILE_NAME: &str = "config.json";
