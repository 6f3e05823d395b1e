//! Time-bounded memoization cache.

use std::hash::Hash;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A TTL cache: key to (value, deadline).
///
/// Entries are evicted lazily on read. Writers may race on a cold key; both
/// produce equivalent values, so last-write-wins is acceptable. This is a
/// bandwidth saver, not a correctness mechanism: upstream sends no
/// invalidation, and staleness up to the TTL is expected.
pub struct TtlCache<K, V> {
    entries: DashMap<K, (V, Instant)>,
    ttl: Duration,
}

impl<K, V> std::fmt::Debug for TtlCache<K, V>
where
    K: Eq + Hash + std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("entries", &self.entries)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Look up a live entry, dropping it if its deadline has passed.
    pub fn get(&self, key: &K) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) if Instant::now() < entry.value().1 => {
                return Some(entry.value().0.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.insert(key, (value, Instant::now() + self.ttl));
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, (_, deadline)| now < *deadline);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
