//! Action definition and construction.
//!
//! An [`Action`] is a named, idempotency-guarded unit of provisioning work:
//! an opaque body, an optional guard, ordering dependencies, notify targets,
//! a retry policy, and a per-attempt timeout. The core never inspects what
//! a guard or body actually does.

mod guard;

pub use guard::{All, Any, CommandSucceeds, FileExists, FnGuard, Guard, GuardReport, PathContains};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::context::RunContext;

/// The effectful operation an action runs when its guard is unsatisfied.
pub type Body = Arc<dyn Fn(&RunContext) -> anyhow::Result<()> + Send + Sync>;

/// Retry policy for a single action.
///
/// Backoff is a fixed delay between attempts, matching the bounded,
/// short-lived nature of provisioning steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,

    /// Fixed delay between attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Policy with the given attempt count and backoff, clamping attempts to 1.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

/// A named, idempotency-guarded unit of provisioning work.
#[derive(Clone)]
pub struct Action {
    /// Unique identifier, stable across runs.
    pub id: String,

    /// Optional precondition probe; satisfied means the body is skipped.
    pub guard: Option<Arc<dyn Guard>>,

    /// The effectful operation.
    pub body: Body,

    /// Action ids that must complete (success or no-op) before this one.
    pub requires: Vec<String>,

    /// Refresh triggers to mark pending when the body actually ran.
    pub notifies: Vec<String>,

    /// Retry policy for the body.
    pub retry: RetryPolicy,

    /// Max wall-clock duration per attempt; zero means unbounded.
    pub timeout: Duration,

    /// Refresh trigger: runs only when notified, never on its own.
    pub refresh_only: bool,
}

impl Action {
    /// Start building an action with the given id.
    pub fn builder(id: impl Into<String>) -> ActionBuilder {
        ActionBuilder::new(id)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("has_guard", &self.guard.is_some())
            .field("requires", &self.requires)
            .field("notifies", &self.notifies)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("refresh_only", &self.refresh_only)
            .finish()
    }
}

/// Builder for constructing an [`Action`].
pub struct ActionBuilder {
    id: String,
    guard: Option<Arc<dyn Guard>>,
    body: Option<Body>,
    requires: Vec<String>,
    notifies: Vec<String>,
    retry: RetryPolicy,
    timeout: Duration,
    refresh_only: bool,
}

impl ActionBuilder {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            guard: None,
            body: None,
            requires: Vec::new(),
            notifies: Vec::new(),
            retry: RetryPolicy::default(),
            timeout: Duration::ZERO,
            refresh_only: false,
        }
    }

    /// Attach a precondition guard.
    pub fn guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guard = Some(Arc::new(guard));
        self
    }

    /// Attach an already-shared guard.
    pub fn guard_arc(mut self, guard: Arc<dyn Guard>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Set the effectful body.
    pub fn body<F>(mut self, body: F) -> Self
    where
        F: Fn(&RunContext) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.body = Some(Arc::new(body));
        self
    }

    /// Add an ordering dependency on another action.
    pub fn requires(mut self, id: impl Into<String>) -> Self {
        self.requires.push(id.into());
        self
    }

    /// Add a refresh trigger to notify when the body actually runs.
    pub fn notifies(mut self, id: impl Into<String>) -> Self {
        self.notifies.push(id.into());
        self
    }

    /// Set the retry policy.
    pub fn retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.retry = RetryPolicy::new(max_attempts, backoff);
        self
    }

    /// Bound each attempt by the given wall-clock duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Mark this action as a refresh trigger.
    pub fn refresh_only(mut self) -> Self {
        self.refresh_only = true;
        self
    }

    /// Finish building. Actions without a body get a no-op body.
    pub fn build(self) -> Action {
        Action {
            id: self.id,
            guard: self.guard,
            body: self.body.unwrap_or_else(|| Arc::new(|_| Ok(()))),
            requires: self.requires,
            notifies: self.notifies,
            retry: self.retry,
            timeout: self.timeout,
            refresh_only: self.refresh_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let action = Action::builder("download").build();

        assert_eq!(action.id, "download");
        assert!(action.guard.is_none());
        assert!(action.requires.is_empty());
        assert!(action.notifies.is_empty());
        assert_eq!(action.retry.max_attempts, 1);
        assert_eq!(action.timeout, Duration::ZERO);
        assert!(!action.refresh_only);
    }

    #[test]
    fn builder_collects_edges() {
        let action = Action::builder("set_path")
            .requires("unzip")
            .requires("download")
            .notifies("refresh_env")
            .build();

        assert_eq!(action.requires, vec!["unzip", "download"]);
        assert_eq!(action.notifies, vec!["refresh_env"]);
    }

    #[test]
    fn builder_sets_retry_and_timeout() {
        let action = Action::builder("download")
            .retry(3, Duration::from_millis(500))
            .timeout(Duration::from_secs(120))
            .build();

        assert_eq!(action.retry.max_attempts, 3);
        assert_eq!(action.retry.backoff, Duration::from_millis(500));
        assert_eq!(action.timeout, Duration::from_secs(120));
    }

    #[test]
    fn retry_policy_clamps_zero_attempts() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts, 1);
    }

    #[test]
    fn default_body_is_noop() {
        let action = Action::builder("noop").build();
        let ctx = RunContext::new();
        assert!((action.body)(&ctx).is_ok());
    }

    #[test]
    fn refresh_only_flag() {
        let action = Action::builder("refresh_env").refresh_only().build();
        assert!(action.refresh_only);
    }

    #[test]
    fn debug_omits_callables() {
        let action = Action::builder("download")
            .guard(FnGuard::new("probe", |_| Ok(false)))
            .build();

        let repr = format!("{:?}", action);
        assert!(repr.contains("download"));
        assert!(repr.contains("has_guard: true"));
    }
}
