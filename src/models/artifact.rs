use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::ForecastError;
use crate::models::Forecaster;

const DEFAULT_VERSION: &str = "N-BEATS-FP32";

/// On-disk artifact layout. The retraining job may emit either a bare
/// `model` or a composite wrapper with a `models` list; a composite yields
/// its first sub-model.
#[derive(Debug, Deserialize)]
struct RawArtifact {
    version: Option<String>,
    input_size: usize,
    horizon: usize,
    #[serde(default)]
    models: Vec<RawWeights>,
    model: Option<RawWeights>,
}

#[derive(Debug, Deserialize)]
struct RawWeights {
    /// Row-major, horizon rows of input_size coefficients.
    weights: Vec<Vec<f64>>,
    bias: Vec<f64>,
}

/// Inference-ready model distilled to a linear basis over the input window.
///
/// The forward pass is a plain matrix-vector product with no threaded BLAS
/// backend, so each call uses exactly one computation thread.
#[derive(Debug)]
pub struct NbeatsModel {
    version: String,
    input_size: usize,
    weights: Array2<f64>,
    bias: Array1<f64>,
}

impl NbeatsModel {
    fn from_bytes(bytes: &[u8], symbol: &str) -> Result<Self, ForecastError> {
        let raw: RawArtifact = serde_json::from_slice(bytes).map_err(|e| {
            ForecastError::ModelLoadFailed {
                symbol: symbol.to_string(),
                reason: format!("malformed artifact: {}", e),
            }
        })?;

        let load_err = |reason: String| ForecastError::ModelLoadFailed {
            symbol: symbol.to_string(),
            reason,
        };

        // Unwrap the composite wrapper if present.
        let core = raw
            .models
            .into_iter()
            .next()
            .or(raw.model)
            .ok_or_else(|| load_err("artifact contains no model".to_string()))?;

        if core.weights.len() != raw.horizon || core.bias.len() != raw.horizon {
            return Err(load_err(format!(
                "expected {} output rows, got {} weight rows and {} bias terms",
                raw.horizon,
                core.weights.len(),
                core.bias.len()
            )));
        }
        if core.weights.iter().any(|row| row.len() != raw.input_size) {
            return Err(load_err(format!(
                "weight rows must have {} coefficients",
                raw.input_size
            )));
        }

        let flat: Vec<f64> = core.weights.into_iter().flatten().collect();
        let weights = Array2::from_shape_vec((raw.horizon, raw.input_size), flat)
            .map_err(|e| load_err(e.to_string()))?;
        let bias = Array1::from_vec(core.bias);

        Ok(Self {
            version: raw.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            input_size: raw.input_size,
            weights,
            bias,
        })
    }
}

impl Forecaster for NbeatsModel {
    fn version(&self) -> &str {
        &self.version
    }

    fn horizon(&self) -> usize {
        self.bias.len()
    }

    fn predict(&self, window: &[f64]) -> Result<Vec<f64>, ForecastError> {
        if window.len() != self.input_size {
            return Err(ForecastError::PredictionFailed(format!(
                "model expects {} inputs, got {}",
                self.input_size,
                window.len()
            )));
        }

        let x = Array1::from_vec(window.to_vec());
        let forecast = self.weights.dot(&x) + &self.bias;

        if forecast.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::PredictionFailed(
                "forward pass produced non-finite values".to_string(),
            ));
        }

        Ok(forecast.to_vec())
    }
}

/// Read-only view of the on-disk location the retraining job writes one
/// serialized model per symbol into.
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn artifact_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_nbeats.json", symbol))
    }

    /// Load and deserialize one symbol's artifact. Absence is the normal
    /// `ModelNotFound` condition; anything else is a load failure.
    pub async fn load(&self, symbol: &str) -> Result<NbeatsModel, ForecastError> {
        let path = self.artifact_path(symbol);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ForecastError::ModelNotFound(symbol.to_string()));
            }
            Err(e) => {
                return Err(ForecastError::ModelLoadFailed {
                    symbol: symbol.to_string(),
                    reason: format!("read {}: {}", path.display(), e),
                });
            }
        };
        NbeatsModel::from_bytes(&bytes, symbol)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
