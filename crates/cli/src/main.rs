use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use framepick_core::api::{
    extract_sampled_frames_with, extract_top_frames_with, rank_images_with, RunOptions,
};
use framepick_core::ranking::ranking_policy::{
    FrameRetention, RankingPolicy, ResizeStage, SortKey,
};
use framepick_core::shared::cancellation::CancellationToken;
use framepick_core::shared::constants::{DEFAULT_FRAME_INTERVAL, DEFAULT_TOP_N};

/// Pick the sharpest, best-lit frames from videos and image folders.
#[derive(Parser)]
#[command(name = "framepick")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Save the top-N frames of a video by (sharpness, brightness).
    Top {
        /// Input video file.
        video: PathBuf,

        /// Directory that receives frame_<i>.jpg.
        output_dir: PathBuf,

        /// Number of frames to keep.
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Save every Nth frame of a video without scoring.
    Sample {
        /// Input video file.
        video: PathBuf,

        /// Directory that receives frame_<n>.jpg.
        output_dir: PathBuf,

        /// Keep decoded frames 0, N, 2N, ...
        #[arg(long, default_value_t = DEFAULT_FRAME_INTERVAL)]
        frame_interval: usize,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Rank the jpg/png files of a folder and save the best ones.
    Rank {
        /// Folder of still images.
        input_dir: PathBuf,

        /// Directory that receives ranked_<rank>_<name>.
        output_dir: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Ranking policy overrides, applied on top of `--policy` (or the
/// threshold-composite defaults).
#[derive(Args)]
struct PolicyArgs {
    /// JSON file with a base ranking policy.
    #[arg(long)]
    policy: Option<PathBuf>,

    #[arg(long)]
    top_n: Option<usize>,

    /// Keep images whose mean luma is strictly above this.
    #[arg(long)]
    brightness_threshold: Option<f64>,

    /// Keep images whose Laplacian variance is strictly above this.
    #[arg(long)]
    sharpness_threshold: Option<f64>,

    /// Downscale factor in (0, 1].
    #[arg(long)]
    resize_factor: Option<f64>,

    /// JPEG quality for exported images (0-100).
    #[arg(long)]
    compression_quality: Option<u8>,

    /// Ranking mode: lexicographic or threshold-composite.
    #[arg(long)]
    sort_key: Option<String>,

    /// When to downscale: before-scoring or after-selection.
    #[arg(long)]
    resize_stage: Option<String>,

    /// Keep only metrics in memory and re-read the winners afterwards.
    #[arg(long)]
    two_pass: bool,
}

#[derive(Args)]
struct RunArgs {
    /// Scoring and export threads (default: all cores).
    #[arg(long)]
    workers: Option<usize>,

    /// Abort the run after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,

    /// Log per-stage timings when the run finishes.
    #[arg(long)]
    summary: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Top {
            video,
            output_dir,
            top_n,
            run,
        } => {
            let results = extract_top_frames_with(&video, &output_dir, top_n, &run.options())?;
            for result in &results {
                println!("{}", result.output_path.display());
            }
            log::info!(
                "Saved {} frame(s) to {}",
                results.len(),
                output_dir.display()
            );
        }
        Command::Sample {
            video,
            output_dir,
            frame_interval,
            run,
        } => {
            let result =
                extract_sampled_frames_with(&video, frame_interval, &output_dir, &run.options())?;
            println!("{}", result.message);
        }
        Command::Rank {
            input_dir,
            output_dir,
            policy,
            run,
        } => {
            // Failures are reported as JSON on stdout, like successes.
            let outcome = policy
                .build()
                .and_then(|p| Ok(rank_images_with(&input_dir, &output_dir, &p, &run.options())?));
            match outcome {
                Ok(report) => println!("{}", serde_json::to_string_pretty(&report)?),
                Err(e) => {
                    println!("{}", serde_json::json!({ "error": e.to_string() }));
                    process::exit(1);
                }
            }
        }
    }
    Ok(())
}

impl RunArgs {
    fn options(&self) -> RunOptions {
        let cancel = match self.timeout {
            Some(secs) => CancellationToken::new().with_timeout(Duration::from_secs(secs)),
            None => CancellationToken::new(),
        };
        RunOptions {
            cancel,
            workers: self.workers,
            log_summary: self.summary,
        }
    }
}

impl PolicyArgs {
    fn build(&self) -> Result<RankingPolicy, Box<dyn std::error::Error>> {
        let mut policy = match &self.policy {
            Some(path) => RankingPolicy::from_json_file(path)?,
            None => RankingPolicy::threshold_composite(),
        };
        if let Some(n) = self.top_n {
            policy.top_n = n;
        }
        if let Some(t) = self.brightness_threshold {
            policy.brightness_threshold = t;
        }
        if let Some(t) = self.sharpness_threshold {
            policy.sharpness_threshold = t;
        }
        if let Some(f) = self.resize_factor {
            policy.resize_factor = f;
        }
        if let Some(q) = self.compression_quality {
            policy.compression_quality = q;
        }
        if let Some(key) = &self.sort_key {
            policy.sort_key = parse_sort_key(key)?;
        }
        if let Some(stage) = &self.resize_stage {
            policy.resize_stage = parse_resize_stage(stage)?;
        }
        if self.two_pass {
            policy.retention = FrameRetention::TwoPass;
        }
        policy.validate()?;
        Ok(policy)
    }
}

fn parse_sort_key(key: &str) -> Result<SortKey, Box<dyn std::error::Error>> {
    match key {
        "lexicographic" => Ok(SortKey::Lexicographic),
        "threshold-composite" => Ok(SortKey::ThresholdComposite),
        other => Err(format!(
            "Sort key must be 'lexicographic' or 'threshold-composite', got '{other}'"
        )
        .into()),
    }
}

fn parse_resize_stage(stage: &str) -> Result<ResizeStage, Box<dyn std::error::Error>> {
    match stage {
        "before-scoring" => Ok(ResizeStage::BeforeScoring),
        "after-selection" => Ok(ResizeStage::AfterSelection),
        other => Err(format!(
            "Resize stage must be 'before-scoring' or 'after-selection', got '{other}'"
        )
        .into()),
    }
}
