pub mod api;
pub mod export;
pub mod pipeline;
pub mod quality;
pub mod ranking;
pub mod shared;
pub mod video;
