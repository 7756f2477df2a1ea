use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

/// Per-request counters and latency observations, exported in Prometheus
/// text format for an external scraper. Recording is a pure side channel;
/// it never feeds back into response content or control flow.
pub struct EngineMetrics {
    registry: Registry,
    predictions: IntCounterVec,
    latency: HistogramVec,
}

impl EngineMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let predictions = IntCounterVec::new(
            Opts::new(
                "prediction_requests_total",
                "Prediction requests by symbol and outcome",
            ),
            &["symbol", "outcome"],
        )?;
        let latency = HistogramVec::new(
            HistogramOpts::new(
                "prediction_latency_seconds",
                "End-to-end prediction latency by symbol",
            ),
            &["symbol"],
        )?;

        registry.register(Box::new(predictions.clone()))?;
        registry.register(Box::new(latency.clone()))?;

        Ok(Self {
            registry,
            predictions,
            latency,
        })
    }

    /// Outcome is one of `fresh`, `cached`, or an `error_*` kind.
    pub fn record(&self, symbol: &str, outcome: &str, elapsed: Duration) {
        self.predictions
            .with_label_values(&[symbol, outcome])
            .inc();
        self.latency
            .with_label_values(&[symbol])
            .observe(elapsed.as_secs_f64());
    }

    pub fn prediction_count(&self, symbol: &str, outcome: &str) -> u64 {
        self.predictions.with_label_values(&[symbol, outcome]).get()
    }

    /// Render everything in Prometheus text exposition format.
    pub fn export(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
