use crate::pipeline::scoring_executor::ScoringExecutor;
use crate::quality::domain::metric_engine::MetricEngine;
use crate::shared::cancellation::CancellationToken;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::frame_record::FrameRecord;

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Fans metric computation out over scoped worker threads.
///
/// Layout: `feeder → [worker × N] → collector`
///
/// The feeder hands out `(position, &Frame)` pairs over a bounded channel;
/// the collector writes each record back into its input slot, so the result
/// is in decode order no matter which worker finished first.
pub struct ThreadedScoringExecutor {
    workers: usize,
    channel_capacity: usize,
}

impl ThreadedScoringExecutor {
    pub fn new() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_workers(workers)
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl Default for ThreadedScoringExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringExecutor for ThreadedScoringExecutor {
    fn score(
        &self,
        frames: &[Frame],
        engine: &dyn MetricEngine,
        cancel: &CancellationToken,
    ) -> Result<Vec<FrameRecord>, PipelineError> {
        if frames.is_empty() {
            return Ok(Vec::new());
        }

        let cap = self.channel_capacity;
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<(usize, &Frame)>(cap);
        let (record_tx, record_rx) = crossbeam_channel::bounded::<(usize, FrameRecord)>(cap);
        let mut slots: Vec<Option<FrameRecord>> = vec![None; frames.len()];

        std::thread::scope(|scope| {
            for _ in 0..self.workers.min(frames.len()) {
                let frame_rx = frame_rx.clone();
                let record_tx = record_tx.clone();
                scope.spawn(move || {
                    for (position, frame) in frame_rx {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let record = FrameRecord::new(frame.index(), engine.measure(frame));
                        if record_tx.send((position, record)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(frame_rx);
            drop(record_tx);

            scope.spawn(move || {
                for item in frames.iter().enumerate() {
                    if cancel.is_cancelled() || frame_tx.send(item).is_err() {
                        break;
                    }
                }
            });

            for (position, record) in record_rx {
                slots[position] = Some(record);
            }
        });

        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
