use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;

use crate::errors::ForecastError;
use crate::models::{ArtifactStore, NbeatsModel};

/// Process-wide map from symbol to resident, execution-ready model.
///
/// Loads lazily on first use and never evicts; resident memory grows by one
/// model per distinct symbol ever served. Two requests racing to load the
/// same symbol both load and the last insert wins, which is harmless because
/// artifacts are immutable and idempotent to reload.
pub struct ModelCache {
    store: ArtifactStore,
    loaded: DashMap<String, Arc<NbeatsModel>>,
}

impl ModelCache {
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            loaded: DashMap::new(),
        }
    }

    /// Return the resident model for `symbol`, loading it from the artifact
    /// store on first use. A failed load leaves no entry behind.
    pub async fn get_or_load(&self, symbol: &str) -> Result<Arc<NbeatsModel>, ForecastError> {
        if let Some(model) = self.loaded.get(symbol) {
            return Ok(model.clone());
        }

        info!("Loading model for {}...", symbol);
        let model = Arc::new(self.store.load(symbol).await?);
        self.loaded.insert(symbol.to_string(), model.clone());
        Ok(model)
    }

    pub fn loaded_symbols(&self) -> Vec<String> {
        self.loaded.iter().map(|e| e.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}
