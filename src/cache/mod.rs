pub mod store;

pub use store::{connect, NoopCache, RedisCache};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::InputWindow;

/// Default lifetime of a cached forecast, matching the retraining cadence.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// One cached result: the forecast plus the version tag of the model that
/// produced it. Expiry is delegated entirely to the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedForecast {
    pub version: String,
    pub forecast: Vec<f64>,
}

/// Content-addressed forecast cache over an external expiring key-value
/// store. Implementations recover every backend fault internally: `lookup`
/// degrades to a miss, `store` and `invalidate` to no-ops, and nothing
/// propagates to the request path.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn lookup(&self, symbol: &str, window: &InputWindow) -> Option<CachedForecast>;

    /// Best effort: the forecast is already computed, so a failed write is
    /// logged and swallowed.
    async fn store(&self, symbol: &str, window: &InputWindow, entry: &CachedForecast);

    /// Manual eviction hook. Normal expiry never needs it.
    async fn invalidate(&self, symbol: &str, window: &InputWindow);
}

/// Derive the cache key for one (symbol, window) pair.
///
/// The digest covers the exact little-endian bit patterns of the ordered
/// values, so only bitwise-identical windows hit the same entry; windows
/// that differ by so much as a rounding ulp are distinct keys.
pub fn cache_key(symbol: &str, window: &InputWindow) -> String {
    let mut hasher = Sha256::new();
    for value in window.values() {
        hasher.update(value.to_bits().to_le_bytes());
    }
    let digest = hasher.finalize();
    format!("pred:{}:{}", symbol, hex::encode(&digest[..16]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WINDOW_LEN;
    use rand::Rng;
    use std::collections::HashSet;

    fn window(values: Vec<f64>) -> InputWindow {
        InputWindow::new(values).unwrap()
    }

    #[test]
    fn test_key_is_deterministic() {
        let a = window(vec![101.5; WINDOW_LEN]);
        let b = window(vec![101.5; WINDOW_LEN]);
        assert_eq!(cache_key("NVDA", &a), cache_key("NVDA", &b));
    }

    #[test]
    fn test_key_is_scoped_by_symbol() {
        let w = window(vec![101.5; WINDOW_LEN]);
        assert_ne!(cache_key("NVDA", &w), cache_key("AAPL", &w));
    }

    #[test]
    fn test_single_element_change_changes_key() {
        let base = vec![101.5; WINDOW_LEN];
        let mut nudged = base.clone();
        nudged[42] += f64::EPSILON * 101.5;

        assert_ne!(
            cache_key("NVDA", &window(base)),
            cache_key("NVDA", &window(nudged))
        );
    }

    #[test]
    fn test_no_collisions_over_random_windows() {
        let mut rng = rand::thread_rng();
        let mut keys = HashSet::new();
        for _ in 0..1000 {
            let values: Vec<f64> = (0..WINDOW_LEN).map(|_| rng.gen_range(1.0..500.0)).collect();
            keys.insert(cache_key("NVDA", &window(values)));
        }
        assert_eq!(keys.len(), 1000);
    }
}
