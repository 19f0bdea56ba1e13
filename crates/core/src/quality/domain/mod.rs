pub mod metric_engine;
