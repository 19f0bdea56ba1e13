use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_source::FrameSource;

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`]. The
/// input context is released on `close` or when the reader is dropped.
pub struct FfmpegReader {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    video_stream_index: usize,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            video_stream_index: 0,
        }
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSource for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.video_stream_index = video_stream_index;
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let Some(ictx) = self.input_ctx.as_mut() else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };

        match DecodeStream::new(ictx, self.video_stream_index) {
            Ok(stream) => Box::new(stream),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn close(&mut self) {
        self.input_ctx = None;
    }
}

/// Pulls packets from the container and yields RGB frames in decode order.
///
/// Any ffmpeg error is yielded once and then the stream is exhausted, so a
/// [`DecodeHalt`](crate::video::domain::decode_halt::DecodeHalt) downstream
/// sees it as the end of the video.
struct DecodeStream<'a> {
    input: &'a mut ffmpeg_next::format::context::Input,
    stream_index: usize,
    decoder: ffmpeg_next::decoder::Video,
    to_rgb: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    next_index: usize,
    state: DecodeState,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    Reading,
    Draining,
    Finished,
}

type FrameResult = Result<Frame, Box<dyn std::error::Error>>;

impl<'a> DecodeStream<'a> {
    fn new(
        input: &'a mut ffmpeg_next::format::context::Input,
        stream_index: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let parameters = input
            .stream(stream_index)
            .ok_or("video stream vanished between open and decode")?
            .parameters();
        let decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)?
            .decoder()
            .video()?;

        let (width, height) = (decoder.width(), decoder.height());
        let to_rgb = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            input,
            stream_index,
            decoder,
            to_rgb,
            width,
            height,
            next_index: 0,
            state: DecodeState::Reading,
        })
    }

    /// Converts the next frame buffered in the decoder, if there is one.
    fn receive(&mut self) -> Option<FrameResult> {
        let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
        self.decoder.receive_frame(&mut yuv).ok()?;

        let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.to_rgb.run(&yuv, &mut rgb) {
            return Some(self.fail(e));
        }
        let frame = Frame::new(
            packed_rgb(&rgb, self.width, self.height),
            self.width,
            self.height,
            self.next_index,
        );
        self.next_index += 1;
        Some(Ok(frame))
    }

    fn fail(&mut self, error: ffmpeg_next::Error) -> FrameResult {
        self.state = DecodeState::Finished;
        Err(Box::new(error))
    }

    /// Feeds one video packet to the decoder. `false` once the container is
    /// exhausted and the decoder has been told to flush.
    fn feed(&mut self) -> Result<bool, ffmpeg_next::Error> {
        loop {
            match self.input.packets().next() {
                Some((stream, packet)) if stream.index() == self.stream_index => {
                    self.decoder.send_packet(&packet)?;
                    return Ok(true);
                }
                Some(_) => continue,
                None => {
                    // EOF may already have been signalled by a short stream.
                    let _ = self.decoder.send_eof();
                    return Ok(false);
                }
            }
        }
    }
}

impl Iterator for DecodeStream<'_> {
    type Item = FrameResult;

    fn next(&mut self) -> Option<FrameResult> {
        loop {
            match self.state {
                DecodeState::Finished => return None,
                DecodeState::Draining => {
                    let frame = self.receive();
                    if frame.is_none() {
                        self.state = DecodeState::Finished;
                    }
                    return frame;
                }
                DecodeState::Reading => {
                    if let Some(frame) = self.receive() {
                        return Some(frame);
                    }
                    match self.feed() {
                        Ok(true) => {}
                        Ok(false) => self.state = DecodeState::Draining,
                        Err(e) => return Some(self.fail(e)),
                    }
                }
            }
        }
    }
}

/// Drops the per-row padding ffmpeg adds (stride >= width * 3).
fn packed_rgb(rgb: &ffmpeg_next::util::frame::video::Video, width: u32, height: u32) -> Vec<u8> {
    let stride = rgb.stride(0);
    let row_bytes = width as usize * 3;
    rgb.data(0)
        .chunks(stride)
        .take(height as usize)
        .flat_map(|row| &row[..row_bytes])
        .copied()
        .collect()
}
