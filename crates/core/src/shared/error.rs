use std::path::PathBuf;

use thiserror::Error;

/// Conditions that stop a pipeline run before it produces results.
///
/// Everything else (mid-stream decode failures, undecodable folder entries,
/// single failed exports, empty input) degrades to a shorter result list.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source unavailable at {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },
    #[error("Folder '{0}' does not exist.")]
    InputDirMissing(PathBuf),
    #[error("invalid ranking policy: {0}")]
    InvalidPolicy(String),
    #[error("run cancelled")]
    Cancelled,
}

/// Failure to persist one selected frame.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cannot infer an image format from {0}")]
    UnsupportedFormat(PathBuf),
    #[error("frame {0} has a pixel buffer that does not match its dimensions")]
    MalformedFrame(usize),
}
