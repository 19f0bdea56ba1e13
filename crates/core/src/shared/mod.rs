pub mod cancellation;
pub mod constants;
pub mod error;
pub mod frame;
pub mod frame_record;
pub mod video_metadata;
