use crate::quality::domain::metric_engine::MetricEngine;
use crate::quality::infrastructure::luma::{laplacian, luma_plane};
use crate::shared::frame::Frame;
use crate::shared::frame_record::FrameMetrics;

/// Scores frames by Laplacian variance (sharpness) and mean luma (brightness).
///
/// Both metrics are computed on the 8-bit BT.601 luminance plane. Flat
/// frames of any shade have zero sharpness; an empty frame scores zero on
/// both axes.
#[derive(Clone, Copy, Debug, Default)]
pub struct LaplacianMetricEngine;

impl LaplacianMetricEngine {
    pub fn new() -> Self {
        Self
    }
}

impl MetricEngine for LaplacianMetricEngine {
    fn measure(&self, frame: &Frame) -> FrameMetrics {
        if frame.is_empty() {
            return FrameMetrics {
                sharpness: 0.0,
                brightness: 0.0,
            };
        }

        let plane = luma_plane(frame);
        let count = plane.len() as f64;
        let luma_sum: u64 = plane.iter().map(|&v| v as u64).sum();
        let brightness = luma_sum as f64 / count;

        let lap = laplacian(plane.view());
        let sharpness = lap.var(0.0);

        FrameMetrics {
            sharpness,
            brightness,
        }
    }
}
