use std::collections::BTreeMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Keeps use cases independent of how progress is surfaced (log output,
/// an HTTP job table, nothing at all).
pub trait PipelineLogger: Send {
    /// Report decode progress. `total` is 0 when the source length is unknown.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named stage took.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time count or measurement (e.g. frames selected).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: accumulates stage durations and the latest value of
/// each metric, reporting through `log::info!`.
///
/// Decode progress is printed every `throttle_frames` frames and on the last
/// frame when the total is known.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    stage_ms: BTreeMap<String, StageTotal>,
    metrics: BTreeMap<String, Vec<f64>>,
    started: Instant,
    frames_seen: usize,
    messages: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct StageTotal {
    calls: usize,
    total_ms: f64,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            stage_ms: BTreeMap::new(),
            metrics: BTreeMap::new(),
            started: Instant::now(),
            frames_seen: 0,
            messages: Vec::new(),
        }
    }

    /// Formatted end-of-run report, `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.stage_ms.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let wall_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let mut out = format!(
            "Run summary ({} frames decoded, {:.1}s total):",
            self.frames_seen,
            wall_ms / 1000.0
        );

        for (stage, t) in &self.stage_ms {
            let share = if wall_ms > 0.0 { t.total_ms / wall_ms * 100.0 } else { 0.0 };
            out.push_str(&format!(
                "\n  {stage:8}: {:8.1}ms over {} call(s) ({share:4.1}%)",
                t.total_ms, t.calls
            ));
        }
        for (name, values) in &self.metrics {
            if let Some(last) = values.last() {
                out.push_str(&format!("\n  {name}: {last}"));
            }
        }
        if self.frames_seen > 0 && wall_ms > 0.0 {
            let rate = self.frames_seen as f64 * 1000.0 / wall_ms;
            out.push_str(&format!("\n  Decode rate: {rate:.1} frames/s"));
        }
        Some(out)
    }

    /// Total milliseconds recorded for `stage`.
    pub fn stage_total_ms(&self, stage: &str) -> Option<f64> {
        self.stage_ms.get(stage).map(|t| t.total_ms)
    }

    pub fn metric_values(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(Vec::as_slice)
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = current;
        let last = total > 0 && current == total;
        if current % self.throttle_frames != 0 && !last {
            return;
        }
        match total {
            0 => log::info!("Decoded {current} frames"),
            _ => log::info!(
                "Decoded {current}/{total} frames ({:.1}%)",
                current as f64 * 100.0 / total as f64
            ),
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let entry = self.stage_ms.entry(stage.to_owned()).or_default();
        entry.calls += 1;
        entry.total_ms += duration_ms;
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics.entry(name.to_owned()).or_default().push(value);
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
        self.messages.push(message.to_owned());
    }

    fn summary(&self) {
        if let Some(report) = self.summary_string() {
            log::info!("{report}");
        }
    }
}
