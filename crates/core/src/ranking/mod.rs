pub mod ranker;
pub mod ranking_policy;
