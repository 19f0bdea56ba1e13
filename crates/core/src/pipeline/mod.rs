pub mod extract_sampled_frames_use_case;
pub mod infrastructure;
pub mod pipeline_logger;
pub mod pipeline_stage;
pub mod rank_frames_use_case;
pub mod scoring_executor;
