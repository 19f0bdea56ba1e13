use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;

use crate::shared::error::ExportError;
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// Writes a single frame to an image file using the `image` crate.
///
/// JPEG output honours the requested quality (clamped to the encoder's
/// 1-100 range); every other format is saved with default settings.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame, jpeg_quality: u8) -> Result<(), ExportError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let format = ImageFormat::from_path(path)
            .map_err(|_| ExportError::UnsupportedFormat(path.to_path_buf()))?;

        let img = frame
            .to_rgb_image()
            .ok_or(ExportError::MalformedFrame(frame.index()))?;

        let encode_err = |source| ExportError::Encode {
            path: path.to_path_buf(),
            source,
        };

        if format == ImageFormat::Jpeg {
            let file = File::create(path).map_err(|source| ExportError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut encoder =
                JpegEncoder::new_with_quality(BufWriter::new(file), jpeg_quality.clamp(1, 100));
            encoder.encode_image(&img).map_err(encode_err)?;
        } else {
            img.save_with_format(path, format).map_err(encode_err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, r: u8, g: u8, b: u8) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for _ in 0..(width * height) {
            data.push(r);
            data.push(g);
            data.push(b);
        }
        Frame::new(data, width, height, 0)
    }

    fn noisy_frame(width: u32, height: u32) -> Frame {
        let data = (0..width * height * 3)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8)
            .collect();
        Frame::new(data, width, height, 0)
    }

    #[test]
    fn test_write_creates_file_and_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let frame = make_frame(100, 80, 50, 100, 200);
        ImageFileWriter::new().write(&path, &frame, 95).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_png_roundtrip_preserves_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let frame = make_frame(50, 50, 50, 100, 200);
        ImageFileWriter::new().write(&path, &frame, 10).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (50, 50));
        assert_eq!(img.get_pixel(0, 0).0, [50, 100, 200]);
    }

    #[test]
    fn test_jpeg_roundtrip_preserves_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let frame = noisy_frame(64, 48);
        ImageFileWriter::new().write(&path, &frame, 100).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!(img.width(), 64);
        assert_eq!(img.height(), 48);
    }

    #[test]
    fn test_lower_jpeg_quality_gives_smaller_file() {
        let dir = tempfile::tempdir().unwrap();
        let frame = noisy_frame(128, 128);
        let high = dir.path().join("high.jpg");
        let low = dir.path().join("low.jpeg");
        let writer = ImageFileWriter::new();
        writer.write(&high, &frame, 100).unwrap();
        writer.write(&low, &frame, 10).unwrap();

        let high_len = std::fs::metadata(&high).unwrap().len();
        let low_len = std::fs::metadata(&low).unwrap().len();
        assert!(low_len < high_len, "{low_len} should be < {high_len}");
    }

    #[test]
    fn test_quality_zero_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.jpg");
        ImageFileWriter::new()
            .write(&path, &noisy_frame(16, 16), 0)
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.unknownext");
        let err = ImageFileWriter::new()
            .write(&path, &make_frame(4, 4, 0, 0, 0), 95)
            .unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_write_into_file_parent_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("out.png");
        assert!(ImageFileWriter::new()
            .write(&path, &make_frame(4, 4, 0, 0, 0), 95)
            .is_err());
    }
}
