pub mod decode_halt;
pub mod frame_sampler;
pub mod frame_source;
pub mod image_writer;
