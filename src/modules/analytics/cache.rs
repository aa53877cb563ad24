// Per-tenant analytics cache.
//
// Read-through, keyed by (tenant, metric), bounded by a TTL as the safety
// net against missed invalidations. Invalidation is deliberately coarse:
// any mutation of a tenant's source entities evicts every metric for that
// tenant, so correctness never depends on knowing which entity feeds which
// metric. Best-effort accelerator only — financial decisions always read
// the ledger.

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::core::{EngineError, Result};
use crate::modules::analytics::models::{EntityKind, Metric};

struct CacheEntry {
    value: serde_json::Value,
    expires_at: Instant,
}

pub struct AnalyticsCache {
    ttl: Duration,
    entries: RwLock<HashMap<(i64, Metric), CacheEntry>>,
}

impl AnalyticsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cached value for the key, unless missing or past its TTL
    pub fn get(&self, tenant_id: i64, metric: Metric) -> Option<serde_json::Value> {
        let entries = self.entries.read().expect("analytics cache lock poisoned");
        let entry = entries.get(&(tenant_id, metric))?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.value.clone())
    }

    pub fn put(&self, tenant_id: i64, metric: Metric, value: serde_json::Value) {
        let mut entries = self.entries.write().expect("analytics cache lock poisoned");
        entries.insert(
            (tenant_id, metric),
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Read-through accessor: on a miss, run `compute` against the current
    /// ledger state, store the value with the TTL, and return it.
    pub async fn get_or_compute<T, F, Fut>(
        &self,
        tenant_id: i64,
        metric: Metric,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(tenant_id, metric) {
            if let Ok(cached) = serde_json::from_value::<T>(value) {
                debug!(tenant_id, metric = %metric, "analytics cache hit");
                return Ok(cached);
            }
        }

        debug!(tenant_id, metric = %metric, "analytics cache miss");
        let fresh = compute().await?;
        let value = serde_json::to_value(&fresh).map_err(|e| {
            EngineError::internal(format!("Failed to serialize analytics value: {}", e))
        })?;
        self.put(tenant_id, metric, value);
        Ok(fresh)
    }

    /// Evict every metric for the tenant, unconditionally.
    ///
    /// Called synchronously by whichever operation mutated one of the
    /// tenant's source entities; `entity` is only recorded for diagnosis.
    pub fn invalidate(&self, tenant_id: i64, entity: EntityKind) {
        let mut entries = self.entries.write().expect("analytics cache lock poisoned");
        let before = entries.len();
        entries.retain(|(tenant, _), _| *tenant != tenant_id);
        debug!(
            tenant_id,
            entity = %entity,
            evicted = before - entries.len(),
            "analytics cache invalidated"
        );
    }
}
