//! LRU cache of built enforcers
//!
//! Building an enforcer means building and closing a trie, so enforcers are
//! kept per policy id and revision and shared through `Arc`. A new revision
//! of a policy replaces the older ones; a revision older than the cached one
//! is built for the caller but never cached.

use super::TrieBasedPolicyEnforcer;
use crate::config::EnforcerConfig;
use crate::error::{PolicyError, Result};
use crate::model::Policy;
use crate::validation::PolicyId;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache key for built enforcers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    policy_id: PolicyId,
    revision: i64,
}

/// Thread-safe LRU cache of enforcers
pub struct EnforcerCache {
    cache: Mutex<LruCache<CacheKey, Arc<TrieBasedPolicyEnforcer>>>,
    max_policy_entries: Option<usize>,
}

impl EnforcerCache {
    /// Create a cache from a validated configuration
    pub fn new(config: &EnforcerConfig) -> Result<Self> {
        config.check()?;
        let capacity = NonZeroUsize::new(config.cache_capacity).ok_or_else(|| {
            PolicyError::InvalidConfig("cache-capacity must be at least 1".to_string())
        })?;
        Ok(EnforcerCache {
            cache: Mutex::new(LruCache::new(capacity)),
            max_policy_entries: config.max_policy_entries,
        })
    }

    /// Create a cache with the default configuration
    pub fn new_default() -> Self {
        EnforcerCache {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(crate::config::DEFAULT_CACHE_CAPACITY)
                    .unwrap_or(NonZeroUsize::MIN),
            )),
            max_policy_entries: None,
        }
    }

    /// Cached enforcer of this policy revision, building it on a miss
    ///
    /// Policies without an id are built every time and never cached.
    pub fn get_or_build(&self, policy: &Policy) -> Result<Arc<TrieBasedPolicyEnforcer>> {
        if let Some(max) = self.max_policy_entries {
            if policy.len() > max {
                let policy_id = policy
                    .id()
                    .map_or_else(|| "<anonymous>".to_string(), ToString::to_string);
                warn!(
                    "Rejecting policy {} with {} entries (max {})",
                    policy_id,
                    policy.len(),
                    max
                );
                return Err(PolicyError::TooManyEntries {
                    policy_id,
                    count: policy.len(),
                    max,
                });
            }
        }

        let Some(policy_id) = policy.id() else {
            return Ok(Arc::new(TrieBasedPolicyEnforcer::new(policy)));
        };
        let key = CacheKey {
            policy_id: policy_id.clone(),
            revision: policy.revision(),
        };

        if let Some(enforcer) = self.cache.lock().get(&key) {
            debug!("Enforcer cache hit: {} revision {}", key.policy_id, key.revision);
            return Ok(Arc::clone(enforcer));
        }
        debug!("Enforcer cache miss: {} revision {}", key.policy_id, key.revision);

        // Built without holding the lock; a concurrent build of the same
        // revision is harmless, the last insert wins.
        let enforcer = Arc::new(TrieBasedPolicyEnforcer::new(policy));

        let mut cache = self.cache.lock();
        let newer = cache
            .iter()
            .filter(|(cached, _)| cached.policy_id == key.policy_id)
            .map(|(cached, _)| cached.revision)
            .filter(|&revision| revision > key.revision)
            .max();
        if let Some(newer) = newer {
            debug!(
                "Not caching {} revision {}: revision {} is cached",
                key.policy_id, key.revision, newer
            );
            return Ok(enforcer);
        }

        let stale: Vec<CacheKey> = cache
            .iter()
            .filter(|(cached, _)| {
                cached.policy_id == key.policy_id && cached.revision < key.revision
            })
            .map(|(cached, _)| cached.clone())
            .collect();
        for cached in stale {
            debug!("Evicting {} revision {}", cached.policy_id, cached.revision);
            cache.pop(&cached);
        }
        cache.put(key, Arc::clone(&enforcer));
        Ok(enforcer)
    }

    /// Cached enforcer without building
    pub fn get(
        &self,
        policy_id: &PolicyId,
        revision: i64,
    ) -> Option<Arc<TrieBasedPolicyEnforcer>> {
        let key = CacheKey {
            policy_id: policy_id.clone(),
            revision,
        };
        self.cache.lock().get(&key).cloned()
    }

    /// Drop every cached revision of a policy, returning how many were dropped
    pub fn invalidate(&self, policy_id: &PolicyId) -> usize {
        let mut cache = self.cache.lock();
        let keys: Vec<CacheKey> = cache
            .iter()
            .filter(|(key, _)| &key.policy_id == policy_id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            cache.pop(key);
        }
        if !keys.is_empty() {
            debug!("Invalidated {} enforcers of {}", keys.len(), policy_id);
        }
        keys.len()
    }

    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

impl Default for EnforcerCache {
    fn default() -> Self {
        Self::new_default()
    }
}
