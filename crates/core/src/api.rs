//! Call-style entry points: top-N video frames, fixed-interval sampling and
//! still-image folder ranking.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::export::frame_exporter::ExportResult;
use crate::export::output_naming::OutputNaming;
use crate::pipeline::extract_sampled_frames_use_case::{
    ExtractSampledFramesUseCase, SampledExtraction,
};
use crate::pipeline::infrastructure::sequential_scoring_executor::SequentialScoringExecutor;
use crate::pipeline::infrastructure::threaded_scoring_executor::ThreadedScoringExecutor;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger, StdoutPipelineLogger};
use crate::pipeline::rank_frames_use_case::RankFramesUseCase;
use crate::pipeline::scoring_executor::ScoringExecutor;
use crate::quality::infrastructure::laplacian_metric_engine::LaplacianMetricEngine;
use crate::ranking::ranking_policy::RankingPolicy;
use crate::shared::cancellation::CancellationToken;
use crate::shared::error::PipelineError;
use crate::video::domain::frame_source::FrameSource;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::image_dir_reader::ImageDirReader;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;

/// Per-run knobs that are not part of the ranking policy.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub cancel: CancellationToken,
    /// Scoring and export threads; `None` uses the available parallelism.
    pub workers: Option<usize>,
    /// Log per-stage timings at the end of the run.
    pub log_summary: bool,
}

impl RunOptions {
    fn executor(&self) -> Box<dyn ScoringExecutor> {
        let threaded = match self.workers {
            Some(n) if n <= 1 => return Box::new(SequentialScoringExecutor),
            Some(n) => ThreadedScoringExecutor::with_workers(n),
            None => ThreadedScoringExecutor::new(),
        };
        log::debug!("Scoring on {} worker thread(s)", threaded.workers());
        Box::new(threaded)
    }

    fn export_workers(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    fn logger(&self) -> Box<dyn PipelineLogger> {
        if self.log_summary {
            Box::new(StdoutPipelineLogger::default())
        } else {
            Box::new(NullPipelineLogger)
        }
    }
}

/// Result of ranking a still-image folder, shaped for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankImagesReport {
    pub success: bool,
    pub ranked_images: Vec<ExportResult>,
}

/// Writes the `top_n` sharpest frames of a video as `frame_<i>.jpg`.
pub fn extract_top_frames(
    video: &Path,
    output_dir: &Path,
    top_n: usize,
) -> Result<Vec<PathBuf>, PipelineError> {
    let results = extract_top_frames_with(video, output_dir, top_n, &RunOptions::default())?;
    Ok(results.into_iter().map(|r| r.output_path).collect())
}

pub fn extract_top_frames_with(
    video: &Path,
    output_dir: &Path,
    top_n: usize,
    options: &RunOptions,
) -> Result<Vec<ExportResult>, PipelineError> {
    run_ranking(
        Box::new(FfmpegReader::new()),
        video,
        output_dir,
        RankingPolicy::lexicographic(top_n),
        OutputNaming::frame_jpg(),
        options,
    )
}

/// Saves every `frame_interval`-th frame of a video, unranked.
pub fn extract_sampled_frames(
    video: &Path,
    frame_interval: usize,
    output_dir: &Path,
) -> Result<SampledExtraction, PipelineError> {
    extract_sampled_frames_with(video, frame_interval, output_dir, &RunOptions::default())
}

pub fn extract_sampled_frames_with(
    video: &Path,
    frame_interval: usize,
    output_dir: &Path,
    options: &RunOptions,
) -> Result<SampledExtraction, PipelineError> {
    ExtractSampledFramesUseCase::new(Box::new(FfmpegReader::new()), Box::new(ImageFileWriter))
        .with_logger(options.logger())
        .with_cancellation(options.cancel.clone())
        .execute(video, frame_interval, output_dir)
}

/// Ranks the `jpg`/`png` files of `input_dir` and writes the winners as
/// `ranked_<rank>_<original name>` under `output_dir`.
///
/// A missing `input_dir` is reported before anything touches the filesystem.
pub fn rank_images(
    input_dir: &Path,
    output_dir: &Path,
    policy: &RankingPolicy,
) -> Result<RankImagesReport, PipelineError> {
    rank_images_with(input_dir, output_dir, policy, &RunOptions::default())
}

pub fn rank_images_with(
    input_dir: &Path,
    output_dir: &Path,
    policy: &RankingPolicy,
    options: &RunOptions,
) -> Result<RankImagesReport, PipelineError> {
    if !input_dir.is_dir() {
        return Err(PipelineError::InputDirMissing(input_dir.to_path_buf()));
    }
    let ranked_images = run_ranking(
        Box::new(ImageDirReader::new()),
        input_dir,
        output_dir,
        policy.clone(),
        OutputNaming::RankedOriginal,
        options,
    )?;
    Ok(RankImagesReport {
        success: true,
        ranked_images,
    })
}

fn run_ranking(
    source: Box<dyn FrameSource>,
    input: &Path,
    output_dir: &Path,
    policy: RankingPolicy,
    naming: OutputNaming,
    options: &RunOptions,
) -> Result<Vec<ExportResult>, PipelineError> {
    let mut use_case = RankFramesUseCase::new(
        source,
        Box::new(LaplacianMetricEngine),
        options.executor(),
        Box::new(ImageFileWriter),
        policy,
        naming,
    )?
    .with_logger(options.logger())
    .with_cancellation(options.cancel.clone())
    .with_export_workers(options.export_workers());

    use_case.execute(input, output_dir)
}
