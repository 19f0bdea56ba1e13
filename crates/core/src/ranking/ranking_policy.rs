use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    DEFAULT_BRIGHTNESS_THRESHOLD, DEFAULT_COMPRESSION_QUALITY, DEFAULT_JPEG_QUALITY,
    DEFAULT_RESIZE_FACTOR, DEFAULT_SHARPNESS_THRESHOLD, DEFAULT_TOP_N,
};
use crate::shared::error::PipelineError;

/// How frames are ordered before truncation to `top_n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// `(sharpness, brightness)` descending, no filtering.
    Lexicographic,
    /// Drop frames at or below either threshold, then `sharpness + brightness` descending.
    ThresholdComposite,
}

/// When the resize step runs relative to scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeStage {
    /// Frames are downscaled on decode; metrics see the reduced image.
    BeforeScoring,
    /// Metrics see full-resolution frames; only exports are downscaled.
    AfterSelection,
}

/// Whether decoded pixels stay in memory until export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameRetention {
    /// Keep every decoded frame for the whole run.
    InMemory,
    /// Keep only records while scoring, then rescan the source for the winners.
    TwoPass,
}

/// Selection and export settings for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingPolicy {
    pub top_n: usize,
    pub brightness_threshold: f64,
    pub sharpness_threshold: f64,
    /// Scale applied to both dimensions, in `(0, 1]`.
    pub resize_factor: f64,
    /// JPEG quality 0-100; higher means less compression.
    pub compression_quality: u8,
    pub sort_key: SortKey,
    pub resize_stage: ResizeStage,
    pub retention: FrameRetention,
}

impl RankingPolicy {
    /// Plain top-N by `(sharpness, brightness)`, full-size exports.
    pub fn lexicographic(top_n: usize) -> Self {
        Self {
            top_n,
            brightness_threshold: 0.0,
            sharpness_threshold: 0.0,
            resize_factor: 1.0,
            compression_quality: DEFAULT_JPEG_QUALITY,
            sort_key: SortKey::Lexicographic,
            resize_stage: ResizeStage::AfterSelection,
            retention: FrameRetention::InMemory,
        }
    }

    /// Threshold-filtered composite ranking on downscaled, recompressed frames.
    pub fn threshold_composite() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            brightness_threshold: DEFAULT_BRIGHTNESS_THRESHOLD,
            sharpness_threshold: DEFAULT_SHARPNESS_THRESHOLD,
            resize_factor: DEFAULT_RESIZE_FACTOR,
            compression_quality: DEFAULT_COMPRESSION_QUALITY,
            sort_key: SortKey::ThresholdComposite,
            resize_stage: ResizeStage::BeforeScoring,
            retention: FrameRetention::InMemory,
        }
    }

    pub fn with_retention(mut self, retention: FrameRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Loads a policy from JSON; missing fields take threshold-composite defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::InvalidPolicy(format!("cannot read {}: {e}", path.display()))
        })?;
        let policy: Self = serde_json::from_str(&json).map_err(|e| {
            PipelineError::InvalidPolicy(format!("cannot parse {}: {e}", path.display()))
        })?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.top_n < 1 {
            return Err(PipelineError::InvalidPolicy(
                "top_n must be at least 1".into(),
            ));
        }
        if !(self.resize_factor > 0.0 && self.resize_factor <= 1.0) {
            return Err(PipelineError::InvalidPolicy(format!(
                "resize_factor must be in (0, 1], got {}",
                self.resize_factor
            )));
        }
        if self.compression_quality > 100 {
            return Err(PipelineError::InvalidPolicy(format!(
                "compression_quality must be between 0 and 100, got {}",
                self.compression_quality
            )));
        }
        if !self.brightness_threshold.is_finite() || !self.sharpness_threshold.is_finite() {
            return Err(PipelineError::InvalidPolicy(
                "thresholds must be finite".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self::threshold_composite()
    }
}
