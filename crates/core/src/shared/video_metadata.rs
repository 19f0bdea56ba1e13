use std::path::PathBuf;

/// Describes an opened frame source.
///
/// Folders of stills are reported as `fps = 0` with `total_frames` equal to
/// the number of candidate image files (some may still fail to decode).
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Container estimate; 0 when the container does not know.
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    pub fn is_still_sequence(&self) -> bool {
        self.fps == 0.0
    }
}
