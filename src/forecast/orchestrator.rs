use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::sync::Arc;
use tracing::warn;

use crate::errors::ForecastError;
use crate::forecast::types::{ForecastBundle, FutureForecast, PriceHistory, ValidationForecast};
use crate::service::ForecastService;
use crate::types::WINDOW_LEN;

/// Length of the held-out back-test tail.
pub const VALIDATION_TARGET_LEN: usize = 30;

/// Minimum history for a validation forecast: one input window plus the
/// held-out target.
pub const MIN_VALIDATION_POINTS: usize = WINDOW_LEN + VALIDATION_TARGET_LEN;

/// Turns raw model output into a back-tested validation window and a
/// confidence-bounded forward forecast, driving the full cache/load/infer
/// pipeline for each sub-forecast.
pub struct ForecastOrchestrator {
    service: Arc<ForecastService>,
}

impl ForecastOrchestrator {
    pub fn new(service: Arc<ForecastService>) -> Self {
        Self { service }
    }

    /// Build both sub-forecasts for one symbol. Each fails in isolation: a
    /// validation fault still leaves the future forecast attempted, and vice
    /// versa. Insufficient history skips a half rather than failing it.
    pub async fn analyze(&self, symbol: &str, history: &PriceHistory) -> ForecastBundle {
        if history.dates.len() != history.closes.len() {
            warn!(
                "Mismatched history for {}: {} dates vs {} closes",
                symbol,
                history.dates.len(),
                history.closes.len()
            );
            return ForecastBundle::default();
        }

        let validation = match self.validation_forecast(symbol, history).await {
            Ok(validation) => validation,
            Err(e) => {
                warn!("Validation forecast failed for {}: {}", symbol, e);
                None
            }
        };

        let mae = validation.as_ref().map(|v| v.mae).unwrap_or(0.0);
        let future = match self.future_forecast(symbol, history, mae).await {
            Ok(future) => future,
            Err(e) => {
                warn!("Future forecast failed for {}: {}", symbol, e);
                None
            }
        };

        ForecastBundle { validation, future }
    }

    /// Back-test: predict the last 30 points from the 60 before them and
    /// score the prediction against the actuals.
    async fn validation_forecast(
        &self,
        symbol: &str,
        history: &PriceHistory,
    ) -> Result<Option<ValidationForecast>, ForecastError> {
        let n = history.len();
        if n < MIN_VALIDATION_POINTS {
            return Ok(None);
        }

        let input =
            history.closes[n - MIN_VALIDATION_POINTS..n - VALIDATION_TARGET_LEN].to_vec();
        let actual = &history.closes[n - VALIDATION_TARGET_LEN..];
        let dates = &history.dates[n - VALIDATION_TARGET_LEN..];

        let response = self.service.predict(symbol, input).await?;
        let mae = mean_absolute_error(actual, &response.forecast);

        Ok(Some(ValidationForecast {
            dates: dates.to_vec(),
            actual: actual.to_vec(),
            predicted: response.forecast,
            mae,
        }))
    }

    /// Forward forecast from the most recent window, dated over upcoming
    /// business days, with `predicted ± mae` bounds.
    async fn future_forecast(
        &self,
        symbol: &str,
        history: &PriceHistory,
        mae: f64,
    ) -> Result<Option<FutureForecast>, ForecastError> {
        let n = history.len();
        if n < WINDOW_LEN {
            return Ok(None);
        }
        let Some(&last_date) = history.dates.last() else {
            return Ok(None);
        };

        let input = history.closes[n - WINDOW_LEN..].to_vec();
        let response = self.service.predict(symbol, input).await?;

        let dates = business_days_after(last_date, response.forecast.len());
        let upper = response.forecast.iter().map(|p| p + mae).collect();
        let lower = response.forecast.iter().map(|p| p - mae).collect();

        Ok(Some(FutureForecast {
            dates,
            predicted: response.forecast,
            upper,
            lower,
            mae,
        }))
    }
}

/// Mean absolute error over the overlapping prefix of the two series.
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / n as f64
}

/// The next `count` business days after `start`, advancing one calendar day
/// at a time and skipping Saturdays and Sundays.
pub fn business_days_after(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = start;
    while dates.len() < count {
        current = current + Duration::days(1);
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(current);
        }
    }
    dates
}
