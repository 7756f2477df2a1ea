use anyhow::Result;
use std::sync::Arc;

use forecast_engine::cache;
use forecast_engine::config::{Config, EnvConfig};
use forecast_engine::inference::InferenceExecutor;
use forecast_engine::models::{ArtifactStore, Forecaster, ModelCache};
use forecast_engine::monitoring::EngineMetrics;
use forecast_engine::ForecastService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Forecast engine starting...");

    // Load configuration
    tracing::info!("Loading configuration...");
    let config = Config::load("config.toml")?;
    let env_config = EnvConfig::load()?;

    tracing::info!("Model artifact dir: {}", config.engine.model_dir);
    tracing::info!("Inference workers: {}", config.engine.inference_workers);
    tracing::info!("Result cache TTL: {}s", config.cache.ttl_secs);

    // Probe the result cache backing store; degrade to no-op on failure
    let result_cache = cache::connect(&env_config.redis_url, config.cache.ttl_secs).await;

    let metrics = Arc::new(EngineMetrics::new()?);
    let service = Arc::new(ForecastService::new(
        ModelCache::new(ArtifactStore::new(&config.engine.model_dir)),
        result_cache,
        InferenceExecutor::new(config.engine.inference_workers),
        metrics.clone(),
    ));

    // Warm-load known symbols so first requests skip the artifact read
    for symbol in &config.engine.warmup_symbols {
        match service.models().get_or_load(symbol).await {
            Ok(model) => tracing::info!("Warmed model {} ({})", symbol, model.version()),
            Err(e) => tracing::warn!("Warmup skipped for {}: {}", symbol, e),
        }
    }

    tracing::info!(
        "✅ Engine ready ({} models resident)",
        service.models().len()
    );

    // TODO: mount the gateway boundary onto ForecastService::predict once
    // the HTTP crate lands

    tokio::signal::ctrl_c().await?;

    if config.monitoring.prometheus_enabled {
        tracing::info!("Final metrics:\n{}", metrics.export()?);
    }
    tracing::info!("Shutting down...");

    Ok(())
}
