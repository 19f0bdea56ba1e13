use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::export::output_naming::OutputNaming;
use crate::export::resize::resize_frame;
use crate::shared::cancellation::CancellationToken;
use crate::shared::error::{ExportError, PipelineError};
use crate::shared::frame::Frame;
use crate::video::domain::image_writer::ImageWriter;

/// One successfully persisted frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportResult {
    pub source_index: usize,
    #[serde(rename = "path")]
    pub output_path: PathBuf,
    pub score: f64,
}

/// A selected frame waiting to be written, with its rank position.
pub struct ExportJob {
    pub ordinal: usize,
    pub frame: Frame,
    pub score: f64,
}

/// Creates the output directory once per run.
///
/// Failure is logged rather than returned: each export then fails on its
/// own and is dropped from the results.
pub fn prepare_output_dir(dir: &Path) -> bool {
    match std::fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Cannot create output directory {}: {e}", dir.display());
            false
        }
    }
}

/// Optionally downsamples, encodes and writes selected frames.
///
/// Each frame is exported independently: a failed write is logged and
/// excluded from the results without affecting its siblings.
pub struct FrameExporter {
    writer: Box<dyn ImageWriter>,
    jpeg_quality: u8,
    resize_factor: f64,
    workers: usize,
}

impl FrameExporter {
    pub fn new(writer: Box<dyn ImageWriter>, jpeg_quality: u8) -> Self {
        Self {
            writer,
            jpeg_quality,
            resize_factor: 1.0,
            workers: 1,
        }
    }

    /// Scale applied to each frame right before encoding.
    pub fn with_resize(mut self, factor: f64) -> Self {
        self.resize_factor = factor;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn export_one(&self, job: ExportJob, path: &Path) -> Result<ExportResult, ExportError> {
        let source_index = job.frame.index();
        let frame = resize_frame(job.frame, self.resize_factor);
        self.writer.write(path, &frame, self.jpeg_quality)?;
        Ok(ExportResult {
            source_index,
            output_path: path.to_path_buf(),
            score: job.score,
        })
    }

    /// Writes every job under `output_dir`, returning results in ordinal order.
    pub fn export_batch(
        &self,
        jobs: Vec<ExportJob>,
        output_dir: &Path,
        naming: &OutputNaming,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExportResult>, PipelineError> {
        let planned: Vec<(PathBuf, ExportJob)> = jobs
            .into_iter()
            .map(|job| {
                let name = naming.file_name(job.ordinal, job.frame.index(), job.frame.source_name());
                (output_dir.join(name), job)
            })
            .collect();

        let planned_len = planned.len();
        let mut outcomes = if self.workers <= 1 || planned_len <= 1 {
            self.export_sequential(planned, cancel)
        } else {
            self.export_parallel(planned, cancel)
        };

        // Only a skipped job means the run was cut short.
        if outcomes.len() < planned_len {
            return Err(PipelineError::Cancelled);
        }

        outcomes.sort_by_key(|(ordinal, _)| *ordinal);
        Ok(outcomes
            .into_iter()
            .filter_map(|(_, outcome)| match outcome {
                Ok(result) => Some(result),
                Err(e) => {
                    log::warn!("Export failed: {e}");
                    None
                }
            })
            .collect())
    }

    fn export_sequential(
        &self,
        planned: Vec<(PathBuf, ExportJob)>,
        cancel: &CancellationToken,
    ) -> Vec<(usize, Result<ExportResult, ExportError>)> {
        let mut outcomes = Vec::with_capacity(planned.len());
        for (path, job) in planned {
            if cancel.is_cancelled() {
                break;
            }
            let ordinal = job.ordinal;
            outcomes.push((ordinal, self.export_one(job, &path)));
        }
        outcomes
    }

    fn export_parallel(
        &self,
        planned: Vec<(PathBuf, ExportJob)>,
        cancel: &CancellationToken,
    ) -> Vec<(usize, Result<ExportResult, ExportError>)> {
        let total = planned.len();
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(PathBuf, ExportJob)>();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        for item in planned {
            // Receiver is alive until the scope below ends.
            let _ = job_tx.send(item);
        }
        drop(job_tx);

        std::thread::scope(|scope| {
            for _ in 0..self.workers.min(total) {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (path, job) in job_rx {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let ordinal = job.ordinal;
                        if result_tx.send((ordinal, self.export_one(job, &path))).is_err() {
                            break;
                        }
                    }
                });
            }
        });
        drop(result_tx);

        result_rx.into_iter().collect()
    }
}
