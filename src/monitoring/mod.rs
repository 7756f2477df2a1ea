pub mod metrics;

pub use metrics::EngineMetrics;
