pub mod frame_exporter;
pub mod output_naming;
pub mod resize;
