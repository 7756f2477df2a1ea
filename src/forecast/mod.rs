pub mod orchestrator;
pub mod types;

pub use orchestrator::ForecastOrchestrator;
pub use types::{ForecastBundle, FutureForecast, PriceHistory, ValidationForecast};
