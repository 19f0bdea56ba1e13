use crate::shared::frame::Frame;
use crate::shared::frame_record::FrameMetrics;

/// Measures focus and exposure of a single frame.
///
/// Implementations must be pure: the same pixels always produce
/// bit-identical metrics, which lets scoring fan out across threads.
pub trait MetricEngine: Send + Sync {
    fn measure(&self, frame: &Frame) -> FrameMetrics;
}
