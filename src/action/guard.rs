//! Guard implementations.
//!
//! Guards determine whether an action's effect is already in place so the
//! body can be skipped. A guard is a pure read-only probe: it never mutates
//! the environment it inspects.
//!
//! A probe that itself fails (permission denied, unreadable state) is
//! reported through `Err` and fails the owning action; it is not the same
//! as "not yet done".

use std::path::Path;

use crate::context::RunContext;
use crate::shell::execute_check;

/// Result of evaluating a guard.
///
/// The `description` field is user-visible: it appears in skip messages
/// (e.g., "Skipped (file exists: /opt/php)") and in the run report.
#[derive(Debug, Clone)]
pub struct GuardReport {
    /// Whether the precondition is already satisfied.
    pub satisfied: bool,

    /// Description of what was probed.
    pub description: String,
}

impl GuardReport {
    /// Create a satisfied report.
    pub fn satisfied(description: impl Into<String>) -> Self {
        Self {
            satisfied: true,
            description: description.into(),
        }
    }

    /// Create an unsatisfied report.
    pub fn unsatisfied(description: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            description: description.into(),
        }
    }
}

/// Precondition probe for an action.
///
/// `Err` means the probe itself failed and is treated as a hard failure of
/// the owning action, distinct from an unsatisfied precondition.
pub trait Guard: Send + Sync {
    /// Evaluate the probe against the current environment.
    fn evaluate(&self, ctx: &RunContext) -> anyhow::Result<GuardReport>;
}

/// Check if a file or directory exists.
pub struct FileExists {
    path: String,
}

impl FileExists {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Guard for FileExists {
    fn evaluate(&self, ctx: &RunContext) -> anyhow::Result<GuardReport> {
        let full_path = ctx.resolve_path(&self.path);

        if full_path.exists() {
            Ok(GuardReport::satisfied(format!("file exists: {}", self.path)))
        } else {
            Ok(GuardReport::unsatisfied(format!(
                "file missing: {}",
                self.path
            )))
        }
    }
}

/// Check if a probe command succeeds (exit code 0).
pub struct CommandSucceeds {
    command: String,
}

impl CommandSucceeds {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Guard for CommandSucceeds {
    fn evaluate(&self, ctx: &RunContext) -> anyhow::Result<GuardReport> {
        let cwd = ctx.working_dir();
        if execute_check(&self.command, Some(&cwd)) {
            Ok(GuardReport::satisfied(format!(
                "command succeeded: {}",
                truncate(&self.command, 50)
            )))
        } else {
            Ok(GuardReport::unsatisfied(format!(
                "command failed: {}",
                truncate(&self.command, 50)
            )))
        }
    }
}

/// Check if a directory is already present on the `PATH` variable.
///
/// This is the idempotency probe for PATH-mutating provisioning steps: if
/// the entry is present, re-appending it would be a no-op.
pub struct PathContains {
    entry: String,
}

impl PathContains {
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
        }
    }

    fn separator() -> char {
        if cfg!(windows) {
            ';'
        } else {
            ':'
        }
    }
}

impl Guard for PathContains {
    fn evaluate(&self, _ctx: &RunContext) -> anyhow::Result<GuardReport> {
        let path = std::env::var("PATH").unwrap_or_default();
        let present = path
            .split(Self::separator())
            .any(|part| Path::new(part) == Path::new(&self.entry));

        if present {
            Ok(GuardReport::satisfied(format!(
                "PATH contains {}",
                self.entry
            )))
        } else {
            Ok(GuardReport::unsatisfied(format!(
                "PATH missing {}",
                self.entry
            )))
        }
    }
}

/// All guards must be satisfied.
pub struct All {
    guards: Vec<Box<dyn Guard>>,
}

impl All {
    pub fn new(guards: Vec<Box<dyn Guard>>) -> Self {
        Self { guards }
    }
}

impl Guard for All {
    fn evaluate(&self, ctx: &RunContext) -> anyhow::Result<GuardReport> {
        let mut unsatisfied = Vec::new();
        for guard in &self.guards {
            let report = guard.evaluate(ctx)?;
            if !report.satisfied {
                unsatisfied.push(report.description);
            }
        }

        if unsatisfied.is_empty() {
            Ok(GuardReport::satisfied(format!(
                "all {} probes satisfied",
                self.guards.len()
            )))
        } else {
            Ok(GuardReport::unsatisfied(format!(
                "{}/{} probes unsatisfied: {}",
                unsatisfied.len(),
                self.guards.len(),
                unsatisfied.join("; ")
            )))
        }
    }
}

/// Any guard being satisfied is sufficient.
pub struct Any {
    guards: Vec<Box<dyn Guard>>,
}

impl Any {
    pub fn new(guards: Vec<Box<dyn Guard>>) -> Self {
        Self { guards }
    }
}

impl Guard for Any {
    fn evaluate(&self, ctx: &RunContext) -> anyhow::Result<GuardReport> {
        let mut descriptions = Vec::new();
        for guard in &self.guards {
            let report = guard.evaluate(ctx)?;
            if report.satisfied {
                return Ok(GuardReport::satisfied(report.description));
            }
            descriptions.push(report.description);
        }

        Ok(GuardReport::unsatisfied(format!(
            "none of {} probes satisfied: {}",
            self.guards.len(),
            descriptions.join("; ")
        )))
    }
}

/// Closure adapter for library callers and tests.
pub struct FnGuard<F> {
    description: String,
    probe: F,
}

impl<F> FnGuard<F>
where
    F: Fn(&RunContext) -> anyhow::Result<bool> + Send + Sync,
{
    pub fn new(description: impl Into<String>, probe: F) -> Self {
        Self {
            description: description.into(),
            probe,
        }
    }
}

impl<F> Guard for FnGuard<F>
where
    F: Fn(&RunContext) -> anyhow::Result<bool> + Send + Sync,
{
    fn evaluate(&self, ctx: &RunContext) -> anyhow::Result<GuardReport> {
        if (self.probe)(ctx)? {
            Ok(GuardReport::satisfied(self.description.clone()))
        } else {
            Ok(GuardReport::unsatisfied(self.description.clone()))
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}
