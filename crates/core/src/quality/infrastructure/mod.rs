pub mod laplacian_metric_engine;
mod luma;
