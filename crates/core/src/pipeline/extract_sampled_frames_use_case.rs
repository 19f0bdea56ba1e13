use std::path::{Path, PathBuf};

use crate::export::frame_exporter::prepare_output_dir;
use crate::export::output_naming::OutputNaming;
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::shared::cancellation::CancellationToken;
use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::error::PipelineError;
use crate::video::domain::decode_halt::DecodeHalt;
use crate::video::domain::frame_sampler::FrameSampler;
use crate::video::domain::frame_source::FrameSource;
use crate::video::domain::image_writer::ImageWriter;

/// Outcome of a fixed-interval extraction run.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledExtraction {
    pub saved_count: usize,
    pub message: String,
    pub saved_paths: Vec<PathBuf>,
}

/// Writes every `frame_interval`-th decoded frame, unscored.
///
/// Output names count successful writes only, so a failed write leaves no
/// gap in the `frame_<n>.jpg` sequence.
pub struct ExtractSampledFramesUseCase {
    source: Box<dyn FrameSource>,
    writer: Box<dyn ImageWriter>,
    naming: OutputNaming,
    jpeg_quality: u8,
    logger: Box<dyn PipelineLogger>,
    cancel: CancellationToken,
}

impl ExtractSampledFramesUseCase {
    pub fn new(source: Box<dyn FrameSource>, writer: Box<dyn ImageWriter>) -> Self {
        Self {
            source,
            writer,
            naming: OutputNaming::frame_jpg(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            logger: Box::new(NullPipelineLogger),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn execute(
        &mut self,
        input: &Path,
        frame_interval: usize,
        output_dir: &Path,
    ) -> Result<SampledExtraction, PipelineError> {
        if frame_interval < 1 {
            return Err(PipelineError::InvalidPolicy(
                "frame_interval must be at least 1".into(),
            ));
        }

        let metadata = self
            .source
            .open(input)
            .map_err(|e| PipelineError::SourceUnavailable {
                path: input.to_path_buf(),
                reason: e.to_string(),
            })?;
        prepare_output_dir(output_dir);

        let result = self.write_samples(frame_interval, metadata.total_frames, output_dir);
        self.source.close();
        let saved_paths = result?;

        let saved_count = saved_paths.len();
        let message = format!("Frame extraction complete! Total frames saved: {saved_count}");
        self.logger.info(&message);
        self.logger.metric("frames_saved", saved_count as f64);
        self.logger.summary();

        Ok(SampledExtraction {
            saved_count,
            message,
            saved_paths,
        })
    }

    fn write_samples(
        &mut self,
        frame_interval: usize,
        total: usize,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, PipelineError> {
        let decoded = DecodeHalt::new(self.source.frames());
        let mut sampler = FrameSampler::new(decoded, frame_interval)
            .map_err(|e| PipelineError::InvalidPolicy(e.into()))?;

        let mut saved = Vec::new();
        while let Some(frame) = sampler.next() {
            if self.cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            self.logger.progress(sampler.decoded_count(), total);

            let name = self.naming.file_name(saved.len(), frame.index(), None);
            let path = output_dir.join(name);
            match self.writer.write(&path, &frame, self.jpeg_quality) {
                Ok(()) => saved.push(path),
                Err(e) => log::warn!("Skipping frame {}: {e}", frame.index()),
            }
        }

        let sampled = sampler.sampled_count();
        self.logger.metric("frames_sampled", sampled as f64);
        if sampled > saved.len() {
            log::warn!(
                "{} of {sampled} sampled frame(s) could not be written",
                sampled - saved.len()
            );
        }
        Ok(saved)
    }
}
