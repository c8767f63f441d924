use crate::errors::ValidationError;
use crate::execution::effects::{OutputState, TransactionEffects};
use crate::transaction::ObjectRef;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Last known state of an on-chain object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSnapshot {
    pub object_id: String,
    pub version: u64,
    pub digest: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
}

impl ObjectSnapshot {
    pub fn new(object_id: impl Into<String>, version: u64, digest: impl Into<String>) -> Self {
        Self { object_id: object_id.into(), version, digest: digest.into(), owner: None, object_type: None }
    }

    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id.clone(), self.version, self.digest.clone())
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }
}

/// Write-through object cache shared between executors.
///
/// Three independent buckets: general objects, owned objects kept live from execution
/// effects, and an application-defined custom bucket. Nothing is evicted implicitly.
#[derive(Debug, Default)]
pub struct ObjectCache {
    objects: DashMap<String, ObjectSnapshot>,
    owned_objects: DashMap<String, ObjectSnapshot>,
    custom: DashMap<String, Value>,
    pub stats: CacheStats,
}

impl ObjectCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<ObjectSnapshot> {
        self.objects.get(id).map(|entry| entry.value().clone())
    }

    pub fn set(&self, snapshot: ObjectSnapshot) {
        self.objects.insert(snapshot.object_id.clone(), snapshot);
    }

    /// Removes `id` from every bucket.
    pub fn delete(&self, id: &str) {
        let removed = self.objects.remove(id).is_some()
            | self.owned_objects.remove(id).is_some()
            | self.custom.remove(id).is_some();
        if removed {
            self.stats.record_eviction();
        }
    }

    pub fn get_owned_object(&self, id: &str) -> Option<ObjectSnapshot> {
        match self.owned_objects.get(id) {
            Some(entry) => {
                self.stats.record_hit();
                Some(entry.value().clone())
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    pub fn set_owned_object(&self, snapshot: ObjectSnapshot) {
        self.owned_objects.insert(snapshot.object_id.clone(), snapshot);
    }

    pub fn get_custom(&self, key: &str) -> Option<Value> {
        self.custom.get(key).map(|entry| entry.value().clone())
    }

    pub fn set_custom(&self, key: impl Into<String>, value: Value) -> Result<(), ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::InvalidCacheKey(key));
        }
        self.custom.insert(key, value);
        Ok(())
    }

    pub fn delete_custom(&self, key: &str) -> Option<Value> {
        self.custom.remove(key).map(|(_, value)| value)
    }

    pub fn clear_owned_objects(&self) {
        self.owned_objects.clear();
    }

    pub fn clear_custom(&self) {
        self.custom.clear();
    }

    pub fn clear_all(&self) {
        self.objects.clear();
        self.owned_objects.clear();
        self.custom.clear();
    }

    pub fn sizes(&self) -> CacheSizes {
        CacheSizes { objects: self.objects.len(), owned_objects: self.owned_objects.len(), custom: self.custom.len() }
    }

    /// Refreshes the owned bucket from execution effects.
    ///
    /// Live writes replace the owned snapshot, deleted or wrapped objects are dropped from
    /// every bucket.
    pub fn apply_effects(&self, effects: &TransactionEffects) {
        for changed in &effects.changed_objects {
            match changed.output_state {
                OutputState::ObjectWrite => match (changed.output_version, &changed.output_digest) {
                    (Some(version), Some(digest)) => {
                        let snapshot = ObjectSnapshot {
                            object_id: changed.object_id.clone(),
                            version,
                            digest: digest.clone(),
                            owner: changed.output_owner.clone(),
                            object_type: changed.object_type.clone(),
                        };
                        self.set_owned_object(snapshot);
                    }
                    _ => {
                        debug!("Live write for {} without version/digest, dropping cached copy", changed.object_id);
                        self.delete(&changed.object_id);
                    }
                },
                OutputState::PackageWrite => {}
                OutputState::DoesNotExist => self.delete(&changed.object_id),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSizes {
    pub objects: usize,
    pub owned_objects: usize,
    pub custom: usize,
}
