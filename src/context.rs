//! Run context and cancellation.
//!
//! A [`RunContext`] carries everything the environment contributes to a run:
//! an opaque key-value configuration map (cache directories, install paths)
//! and the working directory used to resolve relative guard probes. The core
//! never interprets the values; guards and bodies read what they need.
//!
//! Replaces any process-global configuration lookup so runs are isolated and
//! tests can execute in parallel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Configuration passed into a single run.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    values: HashMap<String, String>,
    working_dir: Option<PathBuf>,
}

impl RunContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a configuration value, returning the context for chaining.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Set the working directory for relative guard probes and bodies.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Insert a configuration value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a configuration value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// All configuration values.
    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Working directory, falling back to the process current dir.
    pub fn working_dir(&self) -> PathBuf {
        self.working_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Resolve a path against the working directory unless already absolute.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.working_dir().join(p)
        }
    }
}

/// Cloneable handle requesting an orderly stop of a run.
///
/// Cancellation is observed at action boundaries: the currently executing
/// attempt completes (or is cut at its timeout), and everything not yet
/// started finalizes as not-run.
///
/// # Example
///
/// ```
/// use cairn::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
