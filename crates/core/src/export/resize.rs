use crate::shared::frame::{Frame, CHANNELS};

/// Target size for a scale factor: truncated, never below one pixel.
pub fn scaled_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let w = ((width as f64 * factor) as u32).max(1);
    let h = ((height as f64 * factor) as u32).max(1);
    (w, h)
}

/// One output coordinate's two source neighbours and the weight of the second.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Tap {
    lo: usize,
    hi: usize,
    frac: f32,
}

/// Pixel-center aligned taps: `src = (dst + 0.5) * src_len / dst_len - 0.5`,
/// clamped to the source edges.
fn bilinear_taps(src_len: usize, dst_len: usize) -> Vec<Tap> {
    let scale = src_len as f64 / dst_len as f64;
    let last = src_len - 1;
    (0..dst_len)
        .map(|d| {
            let s = ((d as f64 + 0.5) * scale - 0.5).max(0.0);
            let lo = s.floor() as usize;
            if lo >= last {
                Tap { lo: last, hi: last, frac: 0.0 }
            } else {
                Tap { lo, hi: lo + 1, frac: (s - lo as f64) as f32 }
            }
        })
        .collect()
}

/// Downscales a frame by `factor` with 2-tap bilinear sampling.
///
/// Each output pixel blends the four source pixels around its mapped center.
/// A factor of 1.0 (or an empty frame) returns the frame untouched.
pub fn resize_frame(frame: Frame, factor: f64) -> Frame {
    if factor == 1.0 || frame.is_empty() {
        return frame;
    }
    let (w, h) = scaled_dimensions(frame.width(), frame.height(), factor);
    if (w, h) == (frame.width(), frame.height()) {
        return frame;
    }

    let src_w = frame.width() as usize;
    let xs = bilinear_taps(src_w, w as usize);
    let ys = bilinear_taps(frame.height() as usize, h as usize);
    let src = frame.data();
    let at = |x: usize, y: usize, c: usize| src[(y * src_w + x) * CHANNELS + c] as f32;

    let mut out = Vec::with_capacity(xs.len() * ys.len() * CHANNELS);
    for ty in &ys {
        for tx in &xs {
            for c in 0..CHANNELS {
                let top = at(tx.lo, ty.lo, c) * (1.0 - tx.frac) + at(tx.hi, ty.lo, c) * tx.frac;
                let bottom = at(tx.lo, ty.hi, c) * (1.0 - tx.frac) + at(tx.hi, ty.hi, c) * tx.frac;
                let v = top * (1.0 - ty.frac) + bottom * ty.frac;
                out.push(v.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    match image::RgbImage::from_raw(w, h, out) {
        Some(img) => frame.replace_pixels(img),
        None => frame,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::quality::domain::metric_engine::MetricEngine;
    use crate::quality::infrastructure::laplacian_metric_engine::LaplacianMetricEngine;

    fn gray_frame(width: u32, height: u32, value: impl Fn(u32, u32) -> u8) -> Frame {
        let data = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                let v = value(x, y);
                [v, v, v]
            })
            .collect();
        Frame::new(data, width, height, 0)
    }

    fn first_row(frame: &Frame) -> Vec<u8> {
        frame.data()[..frame.width() as usize * CHANNELS]
            .iter()
            .step_by(CHANNELS)
            .copied()
            .collect()
    }

    #[rstest]
    #[case::half(640, 480, 0.5, (320, 240))]
    #[case::truncates(101, 51, 0.5, (50, 25))]
    #[case::identity(33, 17, 1.0, (33, 17))]
    #[case::floor_at_one(3, 3, 0.1, (1, 1))]
    fn test_scaled_dimensions(
        #[case] w: u32,
        #[case] h: u32,
        #[case] factor: f64,
        #[case] expected: (u32, u32),
    ) {
        assert_eq!(scaled_dimensions(w, h, factor), expected);
    }

    #[test]
    fn test_taps_at_half_scale_pair_neighbours() {
        let taps = bilinear_taps(4, 2);
        assert_eq!(taps[0], Tap { lo: 0, hi: 1, frac: 0.5 });
        assert_eq!(taps[1], Tap { lo: 2, hi: 3, frac: 0.5 });
    }

    #[test]
    fn test_taps_clamp_at_edges() {
        let taps = bilinear_taps(3, 1);
        assert_eq!(taps[0], Tap { lo: 1, hi: 2, frac: 0.0 });
        let taps = bilinear_taps(2, 1);
        assert_eq!(taps[0], Tap { lo: 0, hi: 1, frac: 0.5 });
        let taps = bilinear_taps(1, 1);
        assert_eq!(taps[0], Tap { lo: 0, hi: 0, frac: 0.0 });
    }

    #[test]
    fn test_two_pixel_stripes_survive_halving() {
        let stripes = gray_frame(64, 16, |x, _| if (x / 2) % 2 == 0 { 255 } else { 0 });
        let resized = resize_frame(stripes, 0.5);

        assert_eq!((resized.width(), resized.height()), (32, 8));
        let row = first_row(&resized);
        assert_eq!(&row[..6], &[255, 0, 255, 0, 255, 0]);

        // Full-contrast alternation: every luma value is 0 or 255.
        let metrics = LaplacianMetricEngine.measure(&resized);
        assert!(metrics.sharpness > 200_000.0, "sharpness {}", metrics.sharpness);
    }

    #[test]
    fn test_gradient_interpolates_between_neighbours() {
        let ramp = gray_frame(4, 2, |x, _| [0, 100, 200, 250][x as usize]);
        let resized = resize_frame(ramp, 0.5);
        assert_eq!(first_row(&resized), vec![50, 225]);
    }

    #[test]
    fn test_resize_halves_dimensions_and_keeps_identity() {
        let frame = Frame::new(vec![90; 40 * 20 * 3], 40, 20, 7).with_source_name("a.png");
        let resized = resize_frame(frame, 0.5);
        assert_eq!((resized.width(), resized.height()), (20, 10));
        assert_eq!(resized.data().len(), 20 * 10 * 3);
        assert_eq!(resized.index(), 7);
        assert_eq!(resized.source_name(), Some("a.png"));
        assert!(resized.data().iter().all(|&v| v == 90));
    }

    #[test]
    fn test_factor_one_is_noop() {
        let frame = Frame::new((0..48).collect(), 4, 4, 0);
        let original = frame.data().to_vec();
        let resized = resize_frame(frame, 1.0);
        assert_eq!(resized.data(), &original[..]);
    }
}
