//! Small TTL cache: an `(Instant, V)` map behind a `RwLock`, with hit/miss counters for `setup`.
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, (Instant, V)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns a clone of a fresh entry. Expired entries are removed eagerly.
    pub async fn get(&self, key: &K) -> Option<V> {
        // Fast path: read lock
        match self.entries.read().await.get(key) {
            Some((ts, val)) if ts.elapsed() < self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(val.clone());
            }
            Some(_) => {}
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        }
        let mut write = self.entries.write().await;
        if let Some((ts, _)) = write.get(key)
            && ts.elapsed() >= self.ttl
        {
            write.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    pub async fn insert(&self, key: K, value: V) {
        self.entries
            .write()
            .await
            .insert(key, (Instant::now(), value));
    }

    /// `(hits, misses)` since startup.
    pub fn stats(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn entries_expire() {
        let cache: TtlCache<&str, i32> = TtlCache::new(Duration::from_millis(20));
        assert_eq!(cache.get(&"btc").await, None);
        cache.insert("btc", 7).await;
        assert_eq!(cache.get(&"btc").await, Some(7));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(&"btc").await, None);
        assert_eq!(cache.stats(), (1, 2));
    }
}
