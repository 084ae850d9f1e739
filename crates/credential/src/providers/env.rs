//! Environment variable sources

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

/// Bearer token for the provisioning service, read on every call
pub const TOKEN_VAR: &str = "mysql_token";

/// Provisioning endpoint override, read once at initialization
pub const CONNECTION_URL_VAR: &str = "vault_mysql_db";

/// Source of environment variables
pub trait Environment: Send + Sync + fmt::Debug {
    /// Value of `key`, or `None` when unset or not valid UTF-8
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory environment, mutable at runtime
#[derive(Default)]
pub struct StaticEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.vars.write().remove(key)
    }
}

impl Environment for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).cloned()
    }
}

impl fmt::Debug for StaticEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vars = self.vars.read();
        let mut keys: Vec<&String> = vars.keys().collect();
        keys.sort();
        f.debug_struct("StaticEnv").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_static_env() {
        let env = StaticEnv::new().with(TOKEN_VAR, "s3cr3t");
        assert_eq!(env.var(TOKEN_VAR).as_deref(), Some("s3cr3t"));

        env.set(TOKEN_VAR, "rotated");
        assert_eq!(env.var(TOKEN_VAR).as_deref(), Some("rotated"));

        assert_eq!(env.remove(TOKEN_VAR).as_deref(), Some("rotated"));
        assert_eq!(env.var(TOKEN_VAR), None);
    }

    #[test]
    fn test_debug_lists_keys_only() {
        let env = StaticEnv::new().with(TOKEN_VAR, "s3cr3t");
        let debug = format!("{env:?}");
        assert!(debug.contains(TOKEN_VAR));
        assert!(!debug.contains("s3cr3t"));
    }
}
