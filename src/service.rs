use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use crate::cache::{CachedForecast, ResultCache};
use crate::errors::ForecastError;
use crate::inference::InferenceExecutor;
use crate::models::{Forecaster, ModelCache};
use crate::monitoring::EngineMetrics;
use crate::types::InputWindow;

/// A served forecast. `model_version` distinguishes a freshly computed
/// result from a cache-served one (the latter carries a `-CACHED` suffix).
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResponse {
    pub symbol: String,
    pub forecast: Vec<f64>,
    pub model_version: String,
}

/// The request-facing pipeline: result-cache lookup, model load, inference
/// dispatch, best-effort cache write. Shared by `Arc` across all in-flight
/// requests; requests are independent of each other.
pub struct ForecastService {
    models: ModelCache,
    cache: Arc<dyn ResultCache>,
    executor: InferenceExecutor,
    metrics: Arc<EngineMetrics>,
}

impl ForecastService {
    pub fn new(
        models: ModelCache,
        cache: Arc<dyn ResultCache>,
        executor: InferenceExecutor,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            models,
            cache,
            executor,
            metrics,
        }
    }

    /// Serve one forecast for `symbol` from the given inbound values.
    ///
    /// Validates the window at this boundary, then runs the pipeline in
    /// fixed order: cache lookup, then inference, then cache store, all for
    /// the same content-derived key.
    pub async fn predict(
        &self,
        symbol: &str,
        data: Vec<f64>,
    ) -> Result<PredictionResponse, ForecastError> {
        let symbol = symbol.to_uppercase();
        let start = Instant::now();

        let window = match InputWindow::new(data) {
            Ok(window) => window,
            Err(e) => {
                error!("Rejected window for {}: {}", symbol, e);
                self.metrics.record(&symbol, e.outcome(), start.elapsed());
                return Err(e);
            }
        };

        if let Some(entry) = self.cache.lookup(&symbol, &window).await {
            self.metrics.record(&symbol, "cached", start.elapsed());
            return Ok(PredictionResponse {
                model_version: format!("{}-CACHED", entry.version),
                forecast: entry.forecast,
                symbol,
            });
        }

        let model = match self.models.get_or_load(&symbol).await {
            Ok(model) => model,
            Err(e) => {
                error!("Model unavailable for {}: {}", symbol, e);
                self.metrics.record(&symbol, e.outcome(), start.elapsed());
                return Err(e);
            }
        };

        let forecast = match self.executor.run(model.clone(), window.clone()).await {
            Ok(forecast) => forecast,
            Err(e) => {
                error!("Prediction failed for {}: {}", symbol, e);
                self.metrics.record(&symbol, e.outcome(), start.elapsed());
                return Err(e);
            }
        };

        let entry = CachedForecast {
            version: model.version().to_string(),
            forecast: forecast.clone(),
        };
        self.cache.store(&symbol, &window, &entry).await;

        self.metrics.record(&symbol, "fresh", start.elapsed());
        Ok(PredictionResponse {
            model_version: model.version().to_string(),
            forecast,
            symbol,
        })
    }

    pub fn models(&self) -> &ModelCache {
        &self.models
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoopCache;
    use crate::models::ArtifactStore;
    use crate::testutil::{flat_artifact, write_artifact, MemoryCache};
    use crate::types::WINDOW_LEN;
    use std::path::Path;
    use std::time::Duration;

    fn service(dir: &Path, cache: Arc<dyn ResultCache>) -> ForecastService {
        ForecastService::new(
            ModelCache::new(ArtifactStore::new(dir)),
            cache,
            InferenceExecutor::new(2),
            Arc::new(EngineMetrics::new().unwrap()),
        )
    }

    fn window() -> Vec<f64> {
        vec![100.0; WINDOW_LEN]
    }

    #[tokio::test]
    async fn test_second_identical_request_is_served_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "NVDA", &flat_artifact(30, 100.0));
        let service = service(dir.path(), Arc::new(MemoryCache::new()));

        let first = service.predict("NVDA", window()).await.unwrap();
        let second = service.predict("NVDA", window()).await.unwrap();

        assert_eq!(first.forecast, second.forecast);
        assert_eq!(first.model_version, "N-BEATS-FP32");
        assert_eq!(second.model_version, "N-BEATS-FP32-CACHED");

        // Inference ran exactly once: one fresh outcome, one cached.
        assert_eq!(service.metrics().prediction_count("NVDA", "fresh"), 1);
        assert_eq!(service.metrics().prediction_count("NVDA", "cached"), 1);
    }

    #[tokio::test]
    async fn test_cache_outage_never_fails_requests() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "NVDA", &flat_artifact(30, 100.0));
        let service = service(dir.path(), Arc::new(NoopCache));

        for _ in 0..100 {
            let response = service.predict("NVDA", window()).await.unwrap();
            assert_eq!(response.forecast, vec![100.0; 30]);
        }

        // Every request recomputed; none was cache-served, none failed.
        assert_eq!(service.metrics().prediction_count("NVDA", "fresh"), 100);
        assert_eq!(service.metrics().prediction_count("NVDA", "cached"), 0);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), Arc::new(MemoryCache::new()));

        let err = service.predict("AAA", window()).await.unwrap_err();
        assert!(matches!(err, ForecastError::ModelNotFound(_)));
        assert!(service.models().is_empty());
        assert_eq!(
            service.metrics().prediction_count("AAA", "error_not_found"),
            1
        );
    }

    #[tokio::test]
    async fn test_symbol_is_uppercased() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "NVDA", &flat_artifact(30, 100.0));
        let service = service(dir.path(), Arc::new(MemoryCache::new()));

        let response = service.predict("nvda", window()).await.unwrap();
        assert_eq!(response.symbol, "NVDA");
    }

    #[tokio::test]
    async fn test_distinct_windows_miss_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "NVDA", &flat_artifact(30, 100.0));
        let service = service(dir.path(), Arc::new(MemoryCache::new()));

        service.predict("NVDA", window()).await.unwrap();

        let mut values = vec![100.0; WINDOW_LEN];
        values[0] = 100.01;
        service.predict("NVDA", values).await.unwrap();

        assert_eq!(service.metrics().prediction_count("NVDA", "fresh"), 2);
        assert_eq!(service.metrics().prediction_count("NVDA", "cached"), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_misses_and_recomputes() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "NVDA", &flat_artifact(30, 100.0));
        let service = service(
            dir.path(),
            Arc::new(MemoryCache::with_ttl(Duration::from_millis(50))),
        );

        service.predict("NVDA", window()).await.unwrap();
        let second = service.predict("NVDA", window()).await.unwrap();
        assert_eq!(second.model_version, "N-BEATS-FP32-CACHED");

        // Past the TTL the entry must read as a miss and be recomputed.
        tokio::time::sleep(Duration::from_millis(120)).await;
        let third = service.predict("NVDA", window()).await.unwrap();
        assert_eq!(third.model_version, "N-BEATS-FP32");

        assert_eq!(service.metrics().prediction_count("NVDA", "fresh"), 2);
        assert_eq!(service.metrics().prediction_count("NVDA", "cached"), 1);
    }

    #[tokio::test]
    async fn test_malformed_window_is_rejected_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "NVDA", &flat_artifact(30, 100.0));
        let service = service(dir.path(), Arc::new(MemoryCache::new()));

        let err = service.predict("NVDA", vec![100.0; 59]).await.unwrap_err();
        assert!(matches!(err, ForecastError::InvalidWindow(_)));

        // Rejected before any model work: nothing resident, outcome counted.
        assert!(service.models().is_empty());
        assert_eq!(
            service
                .metrics()
                .prediction_count("NVDA", "error_bad_request"),
            1
        );
    }
}
