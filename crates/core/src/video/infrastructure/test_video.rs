//! Synthetic MPEG-4 clips for tests that need a real container.

use std::path::Path;

const FPS: i32 = 30;

/// Uniform gray that brightens with each frame.
pub fn flat_gray(frame: usize, _row: usize, _col: usize) -> u8 {
    ((frame * 40) % 256) as u8
}

/// Writes `num_frames` gray frames whose luminance comes from `pixel(frame, row, col)`.
pub fn create_test_video(
    path: &Path,
    num_frames: usize,
    width: u32,
    height: u32,
    pixel: impl Fn(usize, usize, usize) -> u8,
) {
    ffmpeg_next::init().unwrap();

    let mut octx = ffmpeg_next::format::output(path).unwrap();

    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
    let mut ost = octx.add_stream(Some(codec)).unwrap();

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();

    encoder_ctx.set_width(width);
    encoder_ctx.set_height(height);
    encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
    encoder_ctx.set_time_base(ffmpeg_next::Rational(1, FPS));
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(FPS, 1)));
    // High bitrate keeps edge content intact through the lossy encode.
    encoder_ctx.set_bit_rate(8_000_000);

    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder = encoder_ctx
        .open_with(ffmpeg_next::Dictionary::new())
        .unwrap();
    ost.set_parameters(&encoder);

    octx.write_header().unwrap();

    let stream_time_base = octx.stream(0).unwrap().time_base();

    let mut scaler = ffmpeg_next::software::scaling::Context::get(
        ffmpeg_next::format::Pixel::RGB24,
        width,
        height,
        ffmpeg_next::format::Pixel::YUV420P,
        width,
        height,
        ffmpeg_next::software::scaling::Flags::BILINEAR,
    )
    .unwrap();

    // One extra step with no frame flushes the encoder.
    for step in (0..num_frames).map(Some).chain(std::iter::once(None)) {
        match step {
            Some(i) => {
                let mut rgb = ffmpeg_next::util::frame::video::Video::new(
                    ffmpeg_next::format::Pixel::RGB24,
                    width,
                    height,
                );
                paint_gray(&mut rgb, |row, col| pixel(i, row, col));

                let mut yuv = ffmpeg_next::util::frame::video::Video::empty();
                scaler.run(&rgb, &mut yuv).unwrap();
                yuv.set_pts(Some(i as i64));
                encoder.send_frame(&yuv).unwrap();
            }
            None => encoder.send_eof().unwrap(),
        }

        let mut packet = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut packet).is_ok() {
            packet.set_stream(0);
            packet.rescale_ts(ffmpeg_next::Rational(1, FPS), stream_time_base);
            packet.write_interleaved(&mut octx).unwrap();
        }
    }

    octx.write_trailer().unwrap();
}

fn paint_gray(frame: &mut ffmpeg_next::util::frame::video::Video, value: impl Fn(usize, usize) -> u8) {
    let (width, height) = (frame.width() as usize, frame.height() as usize);
    let stride = frame.stride(0);
    let data = frame.data_mut(0);
    for row in 0..height {
        for col in 0..width {
            let offset = row * stride + col * 3;
            data[offset..offset + 3].fill(value(row, col));
        }
    }
}
