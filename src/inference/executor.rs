use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

use crate::errors::ForecastError;
use crate::models::Forecaster;
use crate::types::InputWindow;

/// Dispatches the CPU-bound forward pass onto a bounded worker pool.
///
/// The semaphore caps true inference parallelism independently of how many
/// requests are in flight; callers suspend on submission rather than
/// blocking a runtime thread. The spawned task is detachable, so a caller
/// that disappears mid-flight leaves the task to finish and drop its result.
pub struct InferenceExecutor {
    permits: Arc<Semaphore>,
}

impl InferenceExecutor {
    pub fn new(workers: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Run one forward pass. Model faults and worker panics both come back
    /// as `PredictionFailed`; neither poisons the pool.
    pub async fn run(
        &self,
        model: Arc<dyn Forecaster>,
        window: InputWindow,
    ) -> Result<Vec<f64>, ForecastError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ForecastError::PredictionFailed("executor shut down".to_string()))?;

        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            model.predict(window.values())
        });

        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!("Inference worker aborted: {}", e);
                Err(ForecastError::PredictionFailed(format!(
                    "inference task aborted: {}",
                    e
                )))
            }
        }
    }
}
