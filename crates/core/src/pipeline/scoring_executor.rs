use crate::quality::domain::metric_engine::MetricEngine;
use crate::shared::cancellation::CancellationToken;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::frame_record::FrameRecord;

/// Abstracts how a batch of decoded frames is scored.
///
/// Implementations must return one record per input frame, in input order,
/// regardless of how the work is scheduled.
pub trait ScoringExecutor: Send + Sync {
    fn score(
        &self,
        frames: &[Frame],
        engine: &dyn MetricEngine,
        cancel: &CancellationToken,
    ) -> Result<Vec<FrameRecord>, PipelineError>;
}
