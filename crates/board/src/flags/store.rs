use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;

use crate::config::parse_bool;

/// Flags shipped with the board and their defaults, in declaration order.
pub const DECLARED_FLAGS: &[(&str, bool)] = &[
    // framework upgrade
    ("laravel_upgrade_new_syntax", false),
    ("laravel_upgrade_new_middleware", false),
    ("laravel_upgrade_new_validation", false),
    ("laravel_upgrade_new_database_features", false),
    // migration safety
    ("safe_migration_mode", true),
    ("migration_rollback_protection", true),
    ("database_backup_before_migration", true),
    // application
    ("new_answer_features", false),
    ("enhanced_question_search", false),
    ("user_profile_enhancements", false),
    ("admin_dashboard_v2", false),
    // performance
    ("query_optimization", false),
    ("cache_improvements", false),
    ("lazy_loading", false),
    // testing
    ("enhanced_test_coverage", true),
    ("integration_test_suite", true),
    ("performance_test_suite", false),
    // development
    ("debug_mode_enhancements", false),
    ("development_tools", false),
    ("api_versioning", false),
    // security
    ("enhanced_csrf_protection", false),
    ("rate_limiting_improvements", false),
    ("audit_logging", false),
];

/// The source of truth for flag values (the `features.*` namespace).
pub trait FlagStore: Send + Sync {
    /// The stored value, or `None` when the flag was never declared or set.
    fn get(&self, name: &str) -> Option<bool>;

    fn set(&self, name: &str, value: bool);

    /// Every known flag name, in declaration order.
    fn declared(&self) -> Vec<String>;
}

/// Environment variable that overrides the default of `name`.
pub fn env_key(name: &str) -> String {
    format!("FEATURE_{}", name.to_ascii_uppercase())
}

/// In-process [`FlagStore`].
///
/// Values live for the lifetime of the process; setting a flag does not
/// write back to the environment.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flags: RwLock<IndexMap<String, bool>>,
}

impl MemoryFlagStore {
    /// A store with no flags at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The declared flags with their shipped defaults.
    pub fn with_defaults() -> Self {
        Self::from_lookup(|_| None)
    }

    /// The declared flags, each overridden by `FEATURE_<NAME>` when set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// The declared flags, reading overrides through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::from_flags(DECLARED_FLAGS.iter().map(|&(name, default)| {
            let value = lookup(&env_key(name))
                .map(|raw| parse_bool(&raw))
                .unwrap_or(default);
            (name, value)
        }))
    }

    /// Replace the declared set with `flags`.
    pub fn from_flags<N: Into<String>>(flags: impl IntoIterator<Item = (N, bool)>) -> Self {
        let flags = flags
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();
        Self {
            flags: RwLock::new(flags),
        }
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, name: &str) -> Option<bool> {
        self.flags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .copied()
    }

    fn set(&self, name: &str, value: bool) {
        self.flags
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_owned(), value);
    }

    fn declared(&self) -> Vec<String> {
        self.flags
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}
