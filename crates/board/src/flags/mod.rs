//! Cached boolean feature gates.
//!
//! [`FeatureFlags`] reads through a [`FlagCache`] into a [`FlagStore`]. Every
//! mutator writes the store and then evicts the flag's cache entry before
//! returning, so a caller always reads back what it just wrote. Unknown flags
//! are `false`.
//!
//! ```
//! use board::flags::FeatureFlags;
//!
//! let flags = FeatureFlags::in_memory();
//! flags.enable("new_answer_features");
//! assert!(flags.is_enabled("new_answer_features"));
//! assert!(!flags.is_enabled("does_not_exist"));
//! ```

mod cache;
mod store;

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;

pub use cache::{FlagCache, MemoryCache};
pub use store::{DECLARED_FLAGS, FlagStore, MemoryFlagStore, env_key};

/// Prefix of every flag's cache key.
pub const CACHE_PREFIX: &str = "feature_flag_";

/// How long a resolved flag stays cached.
pub const CACHE_TTL: Duration = Duration::from_secs(300);

/// Flags guarding destructive schema work.
pub const MIGRATION_SAFETY_FLAGS: &[&str] = &[
    "safe_migration_mode",
    "migration_rollback_protection",
    "database_backup_before_migration",
];

/// Flags guarding framework upgrade paths.
pub const UPGRADE_FLAGS: &[&str] = &[
    "laravel_upgrade_new_syntax",
    "laravel_upgrade_new_middleware",
    "laravel_upgrade_new_validation",
    "laravel_upgrade_new_database_features",
];

/// Cache key for `name`.
pub fn cache_key(name: &str) -> String {
    format!("{CACHE_PREFIX}{name}")
}

/// The feature flag gate.
#[derive(Clone)]
pub struct FeatureFlags {
    cache: Arc<dyn FlagCache>,
    store: Arc<dyn FlagStore>,
    ttl: Duration,
}

impl FeatureFlags {
    pub fn new(cache: Arc<dyn FlagCache>, store: Arc<dyn FlagStore>) -> Self {
        Self {
            cache,
            store,
            ttl: CACHE_TTL,
        }
    }

    /// An in-process cache over the declared flags, with environment overrides.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCache::new()),
            Arc::new(MemoryFlagStore::from_env()),
        )
    }

    /// Cache resolved flags for `ttl` instead of [`CACHE_TTL`].
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Whether `name` is on. Misses fall through to the store and are cached.
    pub fn is_enabled(&self, name: &str) -> bool {
        let key = cache_key(name);
        if let Some(value) = self.cache.get(&key) {
            return value;
        }

        let value = self.store.get(name).unwrap_or(false);
        self.cache.put(&key, value, self.ttl);
        tracing::trace!(flag = name, value, "feature flag resolved");
        value
    }

    pub fn enable(&self, name: &str) {
        self.set(name, true);
    }

    pub fn disable(&self, name: &str) {
        self.set(name, false);
    }

    /// Flip `name` and return its new state.
    pub fn toggle(&self, name: &str) -> bool {
        let value = !self.is_enabled(name);
        self.set(name, value);
        value
    }

    /// Every declared flag, resolved through the cache.
    pub fn all_flags(&self) -> IndexMap<String, bool> {
        self.store
            .declared()
            .into_iter()
            .map(|name| {
                let value = self.is_enabled(&name);
                (name, value)
            })
            .collect()
    }

    /// Evict one flag, or every declared flag when `name` is `None`.
    pub fn clear_cache(&self, name: Option<&str>) {
        match name {
            Some(name) => self.cache.forget(&cache_key(name)),
            None => {
                for name in self.store.declared() {
                    self.cache.forget(&cache_key(&name));
                }
            }
        }
    }

    /// Run `f` when `name` is on.
    pub fn when<T>(&self, name: &str, f: impl FnOnce() -> T) -> Option<T> {
        self.is_enabled(name).then(f)
    }

    /// Run `on` when `name` is on, `off` otherwise.
    pub fn when_else<T>(&self, name: &str, on: impl FnOnce() -> T, off: impl FnOnce() -> T) -> T {
        if self.is_enabled(name) { on() } else { off() }
    }

    /// Run `f` when `name` is off.
    pub fn unless<T>(&self, name: &str, f: impl FnOnce() -> T) -> Option<T> {
        (!self.is_enabled(name)).then(f)
    }

    /// Run `off` when `name` is off, `on` otherwise.
    pub fn unless_else<T>(&self, name: &str, off: impl FnOnce() -> T, on: impl FnOnce() -> T) -> T {
        if self.is_enabled(name) { on() } else { off() }
    }

    fn set(&self, name: &str, value: bool) {
        self.store.set(name, value);
        self.cache.forget(&cache_key(name));
        tracing::info!(flag = name, value, "feature flag changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flags_over(store: MemoryFlagStore) -> (FeatureFlags, Arc<MemoryCache>, Arc<MemoryFlagStore>) {
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(store);
        let flags = FeatureFlags::new(cache.clone(), store.clone());
        (flags, cache, store)
    }

    #[test]
    fn unknown_flag_is_disabled() {
        let (flags, _, _) = flags_over(MemoryFlagStore::with_defaults());
        assert!(!flags.is_enabled("non_existent_feature"));
    }

    #[test]
    fn reads_are_cached_until_cleared() {
        let (flags, cache, store) = flags_over(MemoryFlagStore::empty());
        store.set("test_feature", true);
        assert!(flags.is_enabled("test_feature"));
        assert_eq!(cache.get("feature_flag_test_feature"), Some(true));

        // a write that bypasses the service is invisible until the entry goes
        store.set("test_feature", false);
        assert!(flags.is_enabled("test_feature"));

        flags.clear_cache(Some("test_feature"));
        assert!(!flags.is_enabled("test_feature"));
    }

    #[test]
    fn enable_then_disable_is_visible_immediately() {
        let (flags, _, _) = flags_over(MemoryFlagStore::with_defaults());

        flags.enable("safe_migration_mode");
        assert!(flags.is_enabled("safe_migration_mode"));

        flags.disable("safe_migration_mode");
        assert!(!flags.is_enabled("safe_migration_mode"));
    }

    #[test]
    fn toggle_flips_and_reports() {
        let (flags, _, store) = flags_over(MemoryFlagStore::empty());
        store.set("test_feature", false);

        assert!(flags.toggle("test_feature"));
        assert!(flags.is_enabled("test_feature"));
        assert!(!flags.toggle("test_feature"));
        assert!(!flags.is_enabled("test_feature"));
    }

    #[test]
    fn all_flags_follows_declaration_order() {
        let (flags, _, _) = flags_over(MemoryFlagStore::from_flags([
            ("feature_one", true),
            ("feature_two", false),
            ("feature_three", true),
        ]));

        let all: Vec<(String, bool)> = flags.all_flags().into_iter().collect();
        assert_eq!(
            all,
            vec![
                ("feature_one".to_owned(), true),
                ("feature_two".to_owned(), false),
                ("feature_three".to_owned(), true),
            ]
        );
    }

    #[test]
    fn clear_all_evicts_every_declared_flag() {
        let (flags, cache, _) = flags_over(MemoryFlagStore::with_defaults());
        flags.all_flags();
        assert_eq!(cache.len(), DECLARED_FLAGS.len());

        flags.clear_cache(None);
        assert!(cache.is_empty());
    }

    #[test]
    fn when_and_unless_branch_on_the_flag() {
        let (flags, _, store) = flags_over(MemoryFlagStore::empty());
        store.set("on", true);
        store.set("off", false);

        assert_eq!(flags.when("on", || "feature_enabled"), Some("feature_enabled"));
        assert_eq!(flags.when("off", || "feature_enabled"), None);
        assert_eq!(flags.when_else("off", || "main", || "fallback"), "fallback");

        assert_eq!(flags.unless("off", || "feature_disabled"), Some("feature_disabled"));
        assert_eq!(flags.unless("on", || "feature_disabled"), None);
        assert_eq!(flags.unless_else("on", || "main", || "fallback"), "fallback");
    }

    #[tokio::test(start_paused = true)]
    async fn stale_entries_refresh_after_ttl() {
        let (flags, _, store) = flags_over(MemoryFlagStore::empty());
        store.set("test_feature", true);
        assert!(flags.is_enabled("test_feature"));

        store.set("test_feature", false);
        tokio::time::advance(CACHE_TTL - Duration::from_secs(1)).await;
        assert!(flags.is_enabled("test_feature"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!flags.is_enabled("test_feature"));
    }

    #[tokio::test(start_paused = true)]
    async fn custom_ttl_shortens_staleness() {
        let (flags, _, store) = flags_over(MemoryFlagStore::empty());
        let flags = flags.with_ttl(Duration::from_secs(5));
        store.set("test_feature", true);
        assert!(flags.is_enabled("test_feature"));

        store.set("test_feature", false);
        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(flags.is_enabled("test_feature"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!flags.is_enabled("test_feature"));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Enable(usize),
        Disable(usize),
        Toggle(usize),
        Read,
    }

    const NAMES: &[&str] = &["alpha", "beta", "safe_migration_mode"];

    fn op() -> impl Strategy<Value = Op> {
        let idx = 0..NAMES.len();
        prop_oneof![
            idx.clone().prop_map(Op::Enable),
            idx.clone().prop_map(Op::Disable),
            idx.prop_map(Op::Toggle),
            Just(Op::Read),
        ]
    }

    proptest! {
        #[test]
        fn reads_always_see_the_last_write(ops in proptest::collection::vec(op(), 1..64)) {
            let (flags, _, _) = flags_over(MemoryFlagStore::empty());
            let mut model = [false; 3];

            for op in ops {
                match op {
                    Op::Enable(i) => { flags.enable(NAMES[i]); model[i] = true; }
                    Op::Disable(i) => { flags.disable(NAMES[i]); model[i] = false; }
                    Op::Toggle(i) => {
                        model[i] = !model[i];
                        prop_assert_eq!(flags.toggle(NAMES[i]), model[i]);
                    }
                    Op::Read => {}
                }
                for (i, name) in NAMES.iter().enumerate() {
                    prop_assert_eq!(flags.is_enabled(name), model[i]);
                }
            }
        }
    }
}
