pub mod artifact;
pub mod cache;

pub use artifact::{ArtifactStore, NbeatsModel};
pub use cache::ModelCache;

use crate::errors::ForecastError;

/// An execution-ready forecasting model: fixed-length window in, one
/// prediction per horizon step out. Stateless given an input, so a single
/// instance serves concurrent inference calls.
pub trait Forecaster: Send + Sync {
    /// Version tag baked into the artifact (e.g. "N-BEATS-FP32").
    fn version(&self) -> &str;

    /// Number of steps one call predicts.
    fn horizon(&self) -> usize;

    fn predict(&self, window: &[f64]) -> Result<Vec<f64>, ForecastError>;
}
