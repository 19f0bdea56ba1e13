use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Produces frames from a video container or a folder of stills.
///
/// Implementations handle I/O details (codec, container format, image
/// decoding) while the pipeline only sees `Frame` and `VideoMetadata`.
/// `open` may be called again after `close` to rescan the same source.
pub trait FrameSource: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
