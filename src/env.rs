//! Environment Sources
//!
//! Where override candidates come from. The process environment is the default;
//! an in-memory source lets tests and embedders supply variables without
//! touching global state.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// A readable set of environment variables.
pub trait EnvSource: Send + Sync {
    /// All variables, in the source's iteration order.
    fn vars(&self) -> Vec<(String, String)>;
}

impl<E: EnvSource + ?Sized> EnvSource for Arc<E> {
    fn vars(&self) -> Vec<(String, String)> {
        (**self).vars()
    }
}

/// The real process environment. Variables that are not valid Unicode are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect()
    }
}

/// Shared in-memory environment. Clones see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: Arc<RwLock<IndexMap<String, String>>>,
}

impl MapEnv {
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
        self.vars.write().shift_remove(key)
    }

    pub fn clear(&self) {
        self.vars.write().clear();
    }
}

impl EnvSource for MapEnv {
    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A variable that matched the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Full variable name as found in the environment.
    pub variable: String,
    pub raw: String,
}

/// Scan `source` for variables starting with `prefix` (case-sensitive).
///
/// Keys are the prefix-stripped, lower-cased remainder. When two variables map
/// to the same key the one seen last in iteration order wins.
pub fn scan_prefixed(source: &dyn EnvSource, prefix: &str) -> IndexMap<String, Candidate> {
    let mut candidates = IndexMap::new();
    for (variable, raw) in source.vars() {
        let Some(rest) = variable.strip_prefix(prefix) else {
            continue;
        };
        let key = rest.to_lowercase();
        if let Some(previous) = candidates.get(&key).map(|c: &Candidate| c.variable.clone()) {
            tracing::debug!(
                key = %key,
                previous = %previous,
                variable = %variable,
                "environment variables collide after prefix strip, keeping the later one"
            );
        }
        candidates.insert(key, Candidate { variable, raw });
    }
    candidates
}
