//! Shared test doubles and fixtures.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::cache::{cache_key, CachedForecast, ResultCache};
use crate::errors::ForecastError;
use crate::models::Forecaster;
use crate::types::{InputWindow, WINDOW_LEN};

/// In-process TTL cache standing in for the Redis backend.
pub(crate) struct MemoryCache {
    entries: DashMap<String, (CachedForecast, Instant)>,
    ttl: Duration,
}

impl MemoryCache {
    pub(crate) fn new() -> Self {
        Self::with_ttl(Duration::from_secs(3600))
    }

    pub(crate) fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn lookup(&self, symbol: &str, window: &InputWindow) -> Option<CachedForecast> {
        let key = cache_key(symbol, window);
        let entry = self.entries.get(&key)?;
        let (cached, inserted) = entry.value();
        if inserted.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(&key);
            return None;
        }
        Some(cached.clone())
    }

    async fn store(&self, symbol: &str, window: &InputWindow, entry: &CachedForecast) {
        self.entries
            .insert(cache_key(symbol, window), (entry.clone(), Instant::now()));
    }

    async fn invalidate(&self, symbol: &str, window: &InputWindow) {
        self.entries.remove(&cache_key(symbol, window));
    }
}

/// Counting model that predicts a constant level, or fails on demand.
pub(crate) struct StubModel {
    horizon: usize,
    level: f64,
    fail: bool,
    calls: AtomicUsize,
}

impl StubModel {
    pub(crate) fn new(horizon: usize, level: f64) -> Self {
        Self {
            horizon,
            level,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing(horizon: usize) -> Self {
        Self {
            fail: true,
            ..Self::new(horizon, 0.0)
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Forecaster for StubModel {
    fn version(&self) -> &str {
        "stub"
    }

    fn horizon(&self) -> usize {
        self.horizon
    }

    fn predict(&self, _window: &[f64]) -> Result<Vec<f64>, ForecastError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ForecastError::PredictionFailed("stub failure".to_string()));
        }
        Ok(vec![self.level; self.horizon])
    }
}

/// Model whose forward pass panics, for worker-pool fault tests.
pub(crate) struct PanicModel;

impl Forecaster for PanicModel {
    fn version(&self) -> &str {
        "panic"
    }

    fn horizon(&self) -> usize {
        30
    }

    fn predict(&self, _window: &[f64]) -> Result<Vec<f64>, ForecastError> {
        panic!("forward pass blew up");
    }
}

/// Artifact JSON for a model that ignores its input and predicts `level`
/// for every horizon step (zero weights, constant bias).
pub(crate) fn flat_artifact(horizon: usize, level: f64) -> String {
    serde_json::json!({
        "version": "N-BEATS-FP32",
        "input_size": WINDOW_LEN,
        "horizon": horizon,
        "model": {
            "weights": vec![vec![0.0; WINDOW_LEN]; horizon],
            "bias": vec![level; horizon],
        }
    })
    .to_string()
}

pub(crate) fn write_artifact(dir: &Path, symbol: &str, json: &str) {
    std::fs::write(dir.join(format!("{}_nbeats.json", symbol)), json).unwrap();
}
