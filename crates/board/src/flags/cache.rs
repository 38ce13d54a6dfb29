use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// A key/value cache holding resolved flag values.
///
/// The flag service only needs get, put-with-TTL and forget; anything from an
/// in-process map to a shared cache server can sit behind this.
pub trait FlagCache: Send + Sync {
    /// The cached value, or `None` when absent or expired.
    fn get(&self, key: &str) -> Option<bool>;

    /// Store `value` under `key` for `ttl`.
    fn put(&self, key: &str, value: bool, ttl: Duration);

    /// Drop `key`. Forgetting a missing key is not an error.
    fn forget(&self, key: &str);
}

struct Entry {
    value: bool,
    expires_at: Instant,
}

/// In-process [`FlagCache`] with per-entry expiry.
///
/// Expiry is measured with `tokio::time::Instant`, so tests running on a
/// paused clock can step past a TTL with `tokio::time::advance`.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.lock()
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FlagCache for MemoryCache {
    fn get(&self, key: &str) -> Option<bool> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if entry.expires_at > Instant::now() {
            return Some(entry.value);
        }
        entries.remove(key);
        None
    }

    fn put(&self, key: &str, value: bool, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.lock()
            .insert(key.to_owned(), Entry { value, expires_at });
    }

    fn forget(&self, key: &str) {
        self.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = MemoryCache::new();
        cache.put("feature_flag_a", true, Duration::from_secs(300));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(cache.get("feature_flag_a"), Some(true));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("feature_flag_a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn forget_removes_only_that_key() {
        let cache = MemoryCache::new();
        cache.put("a", true, Duration::from_secs(60));
        cache.put("b", false, Duration::from_secs(60));

        cache.forget("a");
        cache.forget("missing");

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(false));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn put_overwrites_previous_value() {
        let cache = MemoryCache::new();
        cache.put("a", true, Duration::from_secs(60));
        cache.put("a", false, Duration::from_secs(60));
        assert_eq!(cache.get("a"), Some(false));
    }
}
