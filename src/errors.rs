use thiserror::Error;

/// Failures the engine surfaces to callers.
///
/// Cache faults never appear here: the result cache degrades to a no-op
/// internally and callers cannot observe it failing.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// No trained artifact exists for the symbol. A normal operational
    /// condition, not an internal fault.
    #[error("no trained model for {0}")]
    ModelNotFound(String),

    /// Artifact exists but could not be read or deserialized.
    #[error("failed to load model for {symbol}: {reason}")]
    ModelLoadFailed { symbol: String, reason: String },

    /// The forward pass raised (shape mismatch, non-finite output, panic).
    #[error("prediction failed: {0}")]
    PredictionFailed(String),

    /// The inbound window failed boundary validation.
    #[error("invalid input window: {0}")]
    InvalidWindow(String),
}

impl ForecastError {
    /// Outcome label used on the prediction counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            ForecastError::ModelNotFound(_) => "error_not_found",
            ForecastError::ModelLoadFailed { .. } => "error_load",
            ForecastError::PredictionFailed(_) => "error_prediction",
            ForecastError::InvalidWindow(_) => "error_bad_request",
        }
    }
}
