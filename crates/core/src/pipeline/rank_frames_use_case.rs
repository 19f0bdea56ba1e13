use std::collections::{HashMap, HashSet};
use std::ops::ControlFlow;
use std::path::Path;
use std::time::Instant;

use crate::export::frame_exporter::{prepare_output_dir, ExportJob, ExportResult, FrameExporter};
use crate::export::output_naming::OutputNaming;
use crate::export::resize::resize_frame;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::pipeline::pipeline_stage::PipelineStage;
use crate::pipeline::scoring_executor::ScoringExecutor;
use crate::quality::domain::metric_engine::MetricEngine;
use crate::ranking::ranker::{rank, RankedRecord};
use crate::ranking::ranking_policy::{FrameRetention, RankingPolicy, ResizeStage};
use crate::shared::cancellation::CancellationToken;
use crate::shared::error::PipelineError;
use crate::shared::frame::Frame;
use crate::shared::frame_record::FrameRecord;
use crate::video::domain::decode_halt::DecodeHalt;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::image_writer::ImageWriter;

/// Frames scored per batch while the two-pass strategy discards pixels.
const TWO_PASS_CHUNK: usize = 32;

/// Decode → score → rank → export for one source.
///
/// Resize timing follows `policy.resize_stage`: `BeforeScoring` downsamples
/// each frame as it is decoded (metrics and exports both see the reduced
/// image), `AfterSelection` scores full frames and only downsamples exports.
pub struct RankFramesUseCase {
    source: Box<dyn FrameSource>,
    engine: Box<dyn MetricEngine>,
    executor: Box<dyn ScoringExecutor>,
    exporter: FrameExporter,
    policy: RankingPolicy,
    naming: OutputNaming,
    logger: Box<dyn PipelineLogger>,
    cancel: CancellationToken,
    stage: PipelineStage,
}

impl RankFramesUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        engine: Box<dyn MetricEngine>,
        executor: Box<dyn ScoringExecutor>,
        image_writer: Box<dyn ImageWriter>,
        policy: RankingPolicy,
        naming: OutputNaming,
    ) -> Result<Self, PipelineError> {
        policy.validate()?;
        let export_resize = match policy.resize_stage {
            ResizeStage::AfterSelection => policy.resize_factor,
            ResizeStage::BeforeScoring => 1.0,
        };
        let exporter =
            FrameExporter::new(image_writer, policy.compression_quality).with_resize(export_resize);
        Ok(Self {
            source,
            engine,
            executor,
            exporter,
            policy,
            naming,
            logger: Box::new(NullPipelineLogger),
            cancel: CancellationToken::new(),
            stage: PipelineStage::Idle,
        })
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_export_workers(mut self, workers: usize) -> Self {
        self.exporter = self.exporter.with_workers(workers);
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Runs the pipeline once, writing selected frames under `output_dir`.
    ///
    /// Returns the exported frames in rank order. Only an unopenable source
    /// or cancellation is an error; everything else shortens the result.
    pub fn execute(
        &mut self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<Vec<ExportResult>, PipelineError> {
        if self.stage != PipelineStage::Idle {
            let reason = if self.stage.is_terminal() {
                "a finished pipeline run cannot be restarted"
            } else {
                "an aborted pipeline run cannot be resumed"
            };
            return Err(PipelineError::InvalidPolicy(reason.into()));
        }

        let total = self.open_source(input)?;
        prepare_output_dir(output_dir);
        self.advance(PipelineStage::Decoding);

        let (records, retained) = match self.policy.retention {
            FrameRetention::InMemory => {
                let frames = self.decode_all(total)?;
                if frames.is_empty() {
                    return Ok(self.finish_empty());
                }
                self.advance(PipelineStage::Scoring);
                let start = Instant::now();
                let records = self
                    .executor
                    .score(&frames, self.engine.as_ref(), &self.cancel)?;
                self.logger.timing("score", elapsed_ms(start));
                (records, Some(frames))
            }
            FrameRetention::TwoPass => {
                // Moves to Scoring when the first chunk is scored.
                let records = self.decode_and_score(total)?;
                if records.is_empty() {
                    return Ok(self.finish_empty());
                }
                (records, None)
            }
        };

        self.advance(PipelineStage::Ranking);
        let start = Instant::now();
        let ranked = rank(&records, &self.policy);
        self.logger.timing("rank", elapsed_ms(start));
        self.logger.metric("frames_scored", records.len() as f64);
        self.logger.metric("frames_selected", ranked.len() as f64);

        self.advance(PipelineStage::Exporting);
        let start = Instant::now();
        let mut selected = match retained {
            Some(frames) => index_frames(frames),
            None => self.rescan_selected(input, &ranked)?,
        };
        let jobs = build_jobs(&ranked, &mut selected);
        let results = self
            .exporter
            .export_batch(jobs, output_dir, &self.naming, &self.cancel)?;
        self.logger.timing("export", elapsed_ms(start));
        self.logger.metric("frames_exported", results.len() as f64);

        self.advance(PipelineStage::Done);
        self.logger.summary();
        Ok(results)
    }

    fn advance(&mut self, next: PipelineStage) {
        advance_stage(&mut self.stage, next);
    }

    fn open_source(&mut self, input: &Path) -> Result<usize, PipelineError> {
        let metadata = self
            .source
            .open(input)
            .map_err(|e| PipelineError::SourceUnavailable {
                path: input.to_path_buf(),
                reason: e.to_string(),
            })?;
        let unit = if metadata.is_still_sequence() {
            "images"
        } else {
            "frames"
        };
        self.logger.info(&format!(
            "Opened {} ({} {unit} expected)",
            input.display(),
            metadata.total_frames
        ));
        Ok(metadata.total_frames)
    }

    fn finish_empty(&mut self) -> Vec<ExportResult> {
        self.logger.info("Source produced no frames");
        self.advance(PipelineStage::Done);
        Vec::new()
    }

    fn decode_all(&mut self, total: usize) -> Result<Vec<Frame>, PipelineError> {
        let start = Instant::now();
        let mut frames = Vec::new();
        let decoded = decode_frames(
            self.source.as_mut(),
            &self.policy,
            &self.cancel,
            self.logger.as_mut(),
            total,
            |frame| {
                frames.push(frame);
                Ok(ControlFlow::Continue(()))
            },
        );
        self.source.close();
        decoded?;
        self.logger.timing("decode", elapsed_ms(start));
        Ok(frames)
    }

    /// First pass of the two-pass strategy: keep records, drop pixels.
    fn decode_and_score(&mut self, total: usize) -> Result<Vec<FrameRecord>, PipelineError> {
        let start = Instant::now();
        let mut scorer = ChunkScorer {
            executor: self.executor.as_ref(),
            engine: self.engine.as_ref(),
            cancel: &self.cancel,
            stage: &mut self.stage,
            chunk: Vec::with_capacity(TWO_PASS_CHUNK),
            records: Vec::new(),
            score_ms: 0.0,
        };

        let decoded = decode_frames(
            self.source.as_mut(),
            &self.policy,
            &self.cancel,
            self.logger.as_mut(),
            total,
            |frame| {
                scorer.push(frame)?;
                Ok(ControlFlow::Continue(()))
            },
        );
        let flushed = decoded.and_then(|_| scorer.flush());
        self.source.close();
        flushed?;

        let ChunkScorer {
            records, score_ms, ..
        } = scorer;
        self.logger.timing("decode", elapsed_ms(start) - score_ms);
        self.logger.timing("score", score_ms);
        Ok(records)
    }

    /// Second pass of the two-pass strategy: re-decode only the winners.
    fn rescan_selected(
        &mut self,
        input: &Path,
        ranked: &[RankedRecord],
    ) -> Result<HashMap<usize, Frame>, PipelineError> {
        let mut wanted: HashSet<usize> = ranked.iter().map(|r| r.record.index).collect();
        let mut found = HashMap::with_capacity(wanted.len());
        if wanted.is_empty() {
            return Ok(found);
        }

        let total = self.open_source(input)?;
        let decoded = decode_frames(
            self.source.as_mut(),
            &self.policy,
            &self.cancel,
            self.logger.as_mut(),
            total,
            |frame| {
                if wanted.remove(&frame.index()) {
                    found.insert(frame.index(), frame);
                }
                Ok(if wanted.is_empty() {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                })
            },
        );
        self.source.close();
        decoded?;

        if !wanted.is_empty() {
            log::warn!(
                "{} selected frame(s) were not found on rescan",
                wanted.len()
            );
        }
        Ok(found)
    }
}

fn advance_stage(stage: &mut PipelineStage, next: PipelineStage) {
    debug_assert!(
        stage.can_advance_to(next),
        "illegal stage transition {stage} -> {next}"
    );
    log::debug!("Stage {stage} -> {next}");
    *stage = next;
}

/// Scores decoded frames in fixed-size batches, keeping records only.
struct ChunkScorer<'a> {
    executor: &'a dyn ScoringExecutor,
    engine: &'a dyn MetricEngine,
    cancel: &'a CancellationToken,
    stage: &'a mut PipelineStage,
    chunk: Vec<Frame>,
    records: Vec<FrameRecord>,
    score_ms: f64,
}

impl ChunkScorer<'_> {
    fn push(&mut self, frame: Frame) -> Result<(), PipelineError> {
        self.chunk.push(frame);
        if self.chunk.len() == TWO_PASS_CHUNK {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), PipelineError> {
        if self.chunk.is_empty() {
            return Ok(());
        }
        if *self.stage == PipelineStage::Decoding {
            advance_stage(self.stage, PipelineStage::Scoring);
        }
        let start = Instant::now();
        let scored = self.executor.score(&self.chunk, self.engine, self.cancel)?;
        self.score_ms += elapsed_ms(start);
        self.records.extend(scored);
        self.chunk.clear();
        Ok(())
    }
}

/// Pulls frames through the decode-halt adapter, applying pre-scoring resize,
/// until the source ends or `sink` breaks. Returns the number of frames decoded.
fn decode_frames(
    source: &mut dyn FrameSource,
    policy: &RankingPolicy,
    cancel: &CancellationToken,
    logger: &mut dyn PipelineLogger,
    total: usize,
    mut sink: impl FnMut(Frame) -> Result<ControlFlow<()>, PipelineError>,
) -> Result<usize, PipelineError> {
    let mut frames = DecodeHalt::new(source.frames());
    while let Some(frame) = frames.next() {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let frame = match policy.resize_stage {
            ResizeStage::BeforeScoring => resize_frame(frame, policy.resize_factor),
            ResizeStage::AfterSelection => frame,
        };
        logger.progress(frames.decoded(), total);
        if sink(frame)?.is_break() {
            break;
        }
    }
    if frames.halted() {
        logger.info(&format!(
            "Source ended early after {} frame(s)",
            frames.decoded()
        ));
    }
    Ok(frames.decoded())
}

fn index_frames(frames: Vec<Frame>) -> HashMap<usize, Frame> {
    frames.into_iter().map(|f| (f.index(), f)).collect()
}

fn build_jobs(ranked: &[RankedRecord], frames: &mut HashMap<usize, Frame>) -> Vec<ExportJob> {
    ranked
        .iter()
        .enumerate()
        .filter_map(|(ordinal, r)| {
            let frame = frames.remove(&r.record.index)?;
            Some(ExportJob {
                ordinal,
                frame,
                score: r.score,
            })
        })
        .collect()
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
