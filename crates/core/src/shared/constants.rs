/// Still-image extensions accepted when ranking a folder (compared lowercase).
pub const STILL_IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];

/// JPEG quality used when the caller does not ask for one.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

pub const DEFAULT_TOP_N: usize = 10;

/// Every Nth decoded frame is kept by sampled extraction.
pub const DEFAULT_FRAME_INTERVAL: usize = 30;

pub const DEFAULT_BRIGHTNESS_THRESHOLD: f64 = 50.0;
pub const DEFAULT_SHARPNESS_THRESHOLD: f64 = 10.0;
pub const DEFAULT_RESIZE_FACTOR: f64 = 0.5;
pub const DEFAULT_COMPRESSION_QUALITY: u8 = 50;
