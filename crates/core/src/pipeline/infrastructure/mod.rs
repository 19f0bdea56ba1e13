pub mod sequential_scoring_executor;
pub mod threaded_scoring_executor;
