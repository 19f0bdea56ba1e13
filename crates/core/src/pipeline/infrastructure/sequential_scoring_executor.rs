use crate::pipeline::scoring_executor::ScoringExecutor;
use crate::quality::domain::metric_engine::MetricEngine;
use crate::shared::cancellation::CancellationToken;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::frame_record::FrameRecord;

/// Scores frames one after another on the calling thread.
pub struct SequentialScoringExecutor;

impl ScoringExecutor for SequentialScoringExecutor {
    fn score(
        &self,
        frames: &[Frame],
        engine: &dyn MetricEngine,
        cancel: &CancellationToken,
    ) -> Result<Vec<FrameRecord>, PipelineError> {
        frames
            .iter()
            .map(|frame| {
                if cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                Ok(FrameRecord::new(frame.index(), engine.measure(frame)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::frame_record::FrameMetrics;

    struct IndexEngine;

    impl MetricEngine for IndexEngine {
        fn measure(&self, frame: &Frame) -> FrameMetrics {
            FrameMetrics {
                sharpness: frame.index() as f64,
                brightness: frame.data()[0] as f64,
            }
        }
    }

    #[test]
    fn test_scores_in_input_order() {
        let frames: Vec<_> = (0..4).map(|i| Frame::new(vec![i as u8 * 10; 3], 1, 1, i)).collect();
        let records = SequentialScoringExecutor
            .score(&frames, &IndexEngine, &CancellationToken::new())
            .unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3].index, 3);
        assert_eq!(records[3].brightness, 30.0);
    }

    #[test]
    fn test_cancelled_returns_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let frames = vec![Frame::new(vec![0; 3], 1, 1, 0)];
        assert!(matches!(
            SequentialScoringExecutor.score(&frames, &IndexEngine, &cancel),
            Err(PipelineError::Cancelled)
        ));
    }
}
