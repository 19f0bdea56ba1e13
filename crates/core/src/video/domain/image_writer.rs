use std::path::Path;

use crate::shared::error::ExportError;
use crate::shared::frame::Frame;

/// Encodes a single frame to an image file.
///
/// The format follows the destination's extension. `jpeg_quality` (0-100,
/// higher means less compression) applies to `.jpg`/`.jpeg` only; other
/// formats use their encoder defaults. Shared across export workers, hence
/// `Sync`.
pub trait ImageWriter: Send + Sync {
    fn write(&self, path: &Path, frame: &Frame, jpeg_quality: u8) -> Result<(), ExportError>;
}
