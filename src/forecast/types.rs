use chrono::NaiveDate;
use serde::Serialize;

/// Full cleaned price history for one symbol: parallel vectors of trading
/// dates and closing prices, oldest first.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
}

impl PriceHistory {
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Back-test over the held-out tail of the history: what the model predicted
/// for a period whose actuals are already known, plus the error between them.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationForecast {
    pub dates: Vec<NaiveDate>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
    pub mae: f64,
}

/// Forward forecast over the next horizon of business days, with empirical
/// confidence bounds of `predicted ± mae`. `mae` is 0 (zero-width bands)
/// when no validation was possible.
#[derive(Debug, Clone, Serialize)]
pub struct FutureForecast {
    pub dates: Vec<NaiveDate>,
    pub predicted: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub mae: f64,
}

/// Both sub-forecasts for one analysis request. Either half may be absent:
/// skipped for lack of history, or failed in isolation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ForecastBundle {
    pub validation: Option<ValidationForecast>,
    pub future: Option<FutureForecast>,
}
