use std::path::{Path, PathBuf};

use crate::shared::constants::STILL_IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;

/// Presents a folder of still images as a frame sequence.
///
/// Only `.jpg` and `.png` files are considered, in file-name order. Files
/// that fail to decode are skipped and do not consume an index, so frame
/// indices stay dense over the images that actually loaded.
pub struct ImageDirReader {
    entries: Vec<PathBuf>,
    opened: bool,
}

impl ImageDirReader {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            opened: false,
        }
    }
}

impl Default for ImageDirReader {
    fn default() -> Self {
        Self::new()
    }
}

fn has_still_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| STILL_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn list_candidates(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && has_still_extension(path))
        .collect();
    entries.sort();
    Ok(entries)
}

fn decode_still(path: &Path, index: usize) -> Option<Frame> {
    match image::open(path) {
        Ok(img) => {
            let frame = Frame::from_rgb_image(img.to_rgb8(), index);
            let name = path.file_name()?.to_string_lossy().into_owned();
            Some(frame.with_source_name(name))
        }
        Err(e) => {
            log::debug!("Skipping {}: {e}", path.display());
            None
        }
    }
}

impl FrameSource for ImageDirReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        if !path.is_dir() {
            return Err(format!("Not a directory: {}", path.display()).into());
        }
        self.entries = list_candidates(path)?;
        self.opened = true;

        Ok(VideoMetadata {
            width: 0,
            height: 0,
            fps: 0.0,
            total_frames: self.entries.len(),
            codec: String::new(),
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if !self.opened {
            return Box::new(std::iter::once(Err("ImageDirReader: not opened".into())));
        }
        let mut next_index = 0;
        Box::new(self.entries.iter().filter_map(move |path| {
            let frame = decode_still(path, next_index)?;
            next_index += 1;
            Some(Ok(frame))
        }))
    }

    fn close(&mut self) {
        self.entries.clear();
        self.opened = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, value: u8) {
        let img = image::RgbImage::from_pixel(8, 6, image::Rgb([value, value, value]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_open_missing_dir_errors() {
        let mut reader = ImageDirReader::new();
        assert!(reader.open(Path::new("/nonexistent/frames")).is_err());
    }

    #[test]
    fn test_open_file_instead_of_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 10);
        let mut reader = ImageDirReader::new();
        assert!(reader.open(&dir.path().join("a.png")).is_err());
    }

    #[test]
    fn test_frames_in_name_order_with_names() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "b.png", 20);
        write_png(dir.path(), "a.png", 10);

        let mut reader = ImageDirReader::new();
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!(meta.total_frames, 2);
        assert!(meta.is_still_sequence());

        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].source_name(), Some("a.png"));
        assert_eq!(frames[0].index(), 0);
        assert_eq!(frames[0].data()[0], 10);
        assert_eq!(frames[1].source_name(), Some("b.png"));
        assert_eq!(frames[1].index(), 1);
    }

    #[test]
    fn test_ignores_unrecognized_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "a.png", 10);
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        write_png(dir.path(), "c.bmp", 10);

        let mut reader = ImageDirReader::new();
        let meta = reader.open(dir.path()).unwrap();
        assert_eq!(meta.total_frames, 1);
        assert_eq!(reader.frames().count(), 1);
    }

    #[test]
    fn test_skips_undecodable_files_without_consuming_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"not really a jpeg").unwrap();
        write_png(dir.path(), "b.png", 30);

        let mut reader = ImageDirReader::new();
        reader.open(dir.path()).unwrap();
        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].index(), 0);
        assert_eq!(frames[0].source_name(), Some("b.png"));
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3]));
        img.save_with_format(dir.path().join("SHOT.PNG"), image::ImageFormat::Png)
            .unwrap();

        let mut reader = ImageDirReader::new();
        reader.open(dir.path()).unwrap();
        assert_eq!(reader.frames().count(), 1);
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = ImageDirReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
