use serde::Serialize;

/// Quality metrics computed for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameMetrics {
    /// Variance of the Laplacian of the luminance image.
    pub sharpness: f64,
    /// Mean luminance, in `[0, 255]`.
    pub brightness: f64,
}

/// Immutable per-frame scoring result.
///
/// Refers to its frame by decode index only; the pixel buffer is owned
/// elsewhere (or already dropped, in two-pass mode).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FrameRecord {
    pub index: usize,
    pub sharpness: f64,
    pub brightness: f64,
}

impl FrameRecord {
    pub fn new(index: usize, metrics: FrameMetrics) -> Self {
        Self {
            index,
            sharpness: metrics.sharpness,
            brightness: metrics.brightness,
        }
    }

    /// Composite ranking score: `sharpness + brightness`.
    pub fn composite_score(&self) -> f64 {
        self.sharpness + self.brightness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_copies_metrics() {
        let record = FrameRecord::new(
            3,
            FrameMetrics {
                sharpness: 12.5,
                brightness: 80.0,
            },
        );
        assert_eq!(record.index, 3);
        assert_relative_eq!(record.sharpness, 12.5);
        assert_relative_eq!(record.brightness, 80.0);
    }

    #[test]
    fn test_composite_score_is_sum() {
        let record = FrameRecord {
            index: 0,
            sharpness: 0.25,
            brightness: 100.5,
        };
        assert_eq!(record.composite_score(), 0.25 + 100.5);
    }
}
