use crate::errors::ForecastError;

/// Number of closing prices every model in this deployment consumes.
pub const WINDOW_LEN: usize = 60;

/// An ordered window of recent closing prices, oldest first.
///
/// Validated once at the boundary: exactly [`WINDOW_LEN`] values, all finite.
#[derive(Debug, Clone, PartialEq)]
pub struct InputWindow(Vec<f64>);

impl InputWindow {
    pub fn new(values: Vec<f64>) -> Result<Self, ForecastError> {
        if values.len() != WINDOW_LEN {
            return Err(ForecastError::InvalidWindow(format!(
                "expected {} values, got {}",
                WINDOW_LEN,
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidWindow(
                "window contains non-finite values".to_string(),
            ));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn into_values(self) -> Vec<f64> {
        self.0
    }
}
