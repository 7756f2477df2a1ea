//! Forecast serving and caching engine.
//!
//! Serves multi-step price forecasts from per-symbol models loaded lazily
//! from an on-disk artifact store, with a Redis-backed result cache and a
//! bounded worker pool for the CPU-bound forward pass.

pub mod cache;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod inference;
pub mod models;
pub mod monitoring;
pub mod service;
pub mod types;

pub use errors::ForecastError;
pub use service::{ForecastService, PredictionResponse};
pub use types::{InputWindow, WINDOW_LEN};

#[cfg(test)]
pub(crate) mod testutil;
