//! Action graph execution.
//!
//! The executor performs one convergence run: validate the graph, walk it in
//! topological order honoring guards and retry policy, propagate failures
//! along requires edges, then fire notified refresh triggers exactly once
//! each. All run state is created per invocation and discarded afterwards;
//! the only persistence is whatever the guards observe in the external
//! environment.

mod report;

pub use report::{format_duration, ActionOutcome, ActionReport, RunReport};

use std::collections::{HashSet, VecDeque};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::action::Action;
use crate::context::{CancelToken, RunContext};
use crate::error::Result;
use crate::graph::ActionGraph;

/// Outcome of one bounded call: completed, cut at the timeout, or the
/// worker thread died before reporting back.
enum Bounded<T> {
    Done(T),
    TimedOut,
    Crashed,
}

/// Executes action graphs.
#[derive(Debug, Clone, Default)]
pub struct Executor {
    cancel: CancelToken,
}

impl Executor {
    /// Create an executor with a fresh cancellation token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor observing an external cancellation token.
    pub fn with_cancel_token(cancel: CancelToken) -> Self {
        Self { cancel }
    }

    /// Handle for requesting cancellation of an in-progress run.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the graph to convergence.
    ///
    /// Construction-time errors (dangling edges, cycles, bad notify targets)
    /// abort the run before anything executes. Per-action runtime failures
    /// never escape: they are captured in the report and block only
    /// downstream dependents.
    pub fn run(&self, graph: &ActionGraph, ctx: &RunContext) -> Result<RunReport> {
        let start = Instant::now();

        graph.validate()?;
        let order = graph.topological_order()?;

        debug!(actions = order.len(), "starting run");

        let mut entries: Vec<ActionReport> = Vec::new();
        let mut blocked: HashSet<String> = HashSet::new();
        // Refresh targets queued this run; the set guarantees at most one
        // firing per target even with multiple notifying predecessors.
        let mut queued: HashSet<String> = HashSet::new();
        let mut refresh_queue: VecDeque<String> = VecDeque::new();

        // Topological pass.
        for id in &order {
            let action = graph.get(id).expect("ordered id exists in graph");

            if let Some(dep) = self.failed_dependency(action, &entries, &blocked) {
                debug!(action = %id, dependency = %dep, "blocked by failed dependency");
                blocked.insert(id.clone());
                entries.push(ActionReport::not_run(
                    id,
                    format!("dependency '{}' failed", dep),
                ));
                continue;
            }

            // Refresh triggers never run on their own schedule.
            if action.refresh_only {
                continue;
            }

            if self.cancel.is_cancelled() {
                entries.push(ActionReport::not_run(id, "cancelled"));
                continue;
            }

            match self.evaluate_guard(action, ctx) {
                GuardDecision::Satisfied(description) => {
                    debug!(action = %id, %description, "guard satisfied, skipping");
                    entries.push(ActionReport::skipped(id, description));
                    continue;
                }
                GuardDecision::Unsatisfied => {}
                GuardDecision::ProbeFailed(detail) => {
                    warn!(action = %id, %detail, "guard probe failed");
                    entries.push(ActionReport::failed(id, 0, Duration::ZERO, detail));
                    continue;
                }
            }

            let entry = self.execute_with_retry(action, ctx);

            if entry.outcome == ActionOutcome::Succeeded {
                for target in &action.notifies {
                    if queued.insert(target.clone()) {
                        debug!(action = %id, refresh = %target, "queueing refresh");
                        refresh_queue.push_back(target.clone());
                    }
                }
            }

            entries.push(entry);
        }

        // Refresh pass: fire notified triggers, guard bypassed, exactly once
        // each. A trigger that succeeds may notify further triggers; the
        // queue drains those in the same pass.
        while let Some(id) = refresh_queue.pop_front() {
            if blocked.contains(&id) {
                continue;
            }

            if self.cancel.is_cancelled() {
                entries.push(ActionReport::not_run(&id, "cancelled"));
                continue;
            }

            let action = graph.get(&id).expect("queued id exists in graph");
            debug!(action = %id, "firing refresh trigger");
            let entry = self.execute_with_retry(action, ctx);

            if entry.outcome == ActionOutcome::Succeeded {
                for target in &action.notifies {
                    if queued.insert(target.clone()) {
                        refresh_queue.push_back(target.clone());
                    }
                }
            }

            entries.push(entry);
        }

        // Refresh triggers that were never notified have nothing to do.
        for id in &order {
            let action = graph.get(id).expect("ordered id exists in graph");
            if action.refresh_only && !queued.contains(id) && !blocked.contains(id) {
                entries.push(ActionReport::skipped(id, "not notified"));
            }
        }

        let report = RunReport {
            actions: entries,
            duration: start.elapsed(),
        };
        debug!(
            succeeded = report.count(ActionOutcome::Succeeded),
            skipped = report.count(ActionOutcome::Skipped),
            failed = report.count(ActionOutcome::Failed),
            not_run = report.count(ActionOutcome::NotRun),
            "run finished"
        );

        Ok(report)
    }

    /// First requires-dependency of `action` that failed or was blocked.
    fn failed_dependency(
        &self,
        action: &Action,
        entries: &[ActionReport],
        blocked: &HashSet<String>,
    ) -> Option<String> {
        action
            .requires
            .iter()
            .find(|dep| {
                blocked.contains(dep.as_str())
                    || entries.iter().any(|e| {
                        e.id == **dep
                            && matches!(e.outcome, ActionOutcome::Failed | ActionOutcome::NotRun)
                    })
            })
            .cloned()
    }

    /// Evaluate the action's guard, bounded by the action timeout.
    fn evaluate_guard(&self, action: &Action, ctx: &RunContext) -> GuardDecision {
        let Some(guard) = &action.guard else {
            return GuardDecision::Unsatisfied;
        };

        let guard = guard.clone();
        let probe_ctx = ctx.clone();
        let outcome = call_bounded(action.timeout, move || guard.evaluate(&probe_ctx));

        match outcome {
            Bounded::Done(Ok(report)) if report.satisfied => {
                GuardDecision::Satisfied(report.description)
            }
            Bounded::Done(Ok(_)) => GuardDecision::Unsatisfied,
            Bounded::Done(Err(e)) => {
                GuardDecision::ProbeFailed(format!("guard probe failed: {}", e))
            }
            Bounded::TimedOut => GuardDecision::ProbeFailed(format!(
                "guard probe timed out after {}",
                format_duration(action.timeout)
            )),
            Bounded::Crashed => GuardDecision::ProbeFailed("guard probe panicked".to_string()),
        }
    }

    /// Run the action body with fixed-delay retry, each attempt bounded by
    /// the action timeout.
    fn execute_with_retry(&self, action: &Action, ctx: &RunContext) -> ActionReport {
        let start = Instant::now();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            debug!(action = %action.id, attempt = attempts, "executing body");

            let body = action.body.clone();
            let attempt_ctx = ctx.clone();
            let outcome = call_bounded(action.timeout, move || body(&attempt_ctx));

            let last_error = match outcome {
                Bounded::Done(Ok(())) => {
                    return ActionReport::succeeded(&action.id, attempts, start.elapsed());
                }
                Bounded::Done(Err(e)) => e.to_string(),
                Bounded::TimedOut => format!(
                    "attempt timed out after {}",
                    format_duration(action.timeout)
                ),
                Bounded::Crashed => "body panicked".to_string(),
            };

            warn!(
                action = %action.id,
                attempt = attempts,
                max_attempts = action.retry.max_attempts,
                error = %last_error,
                "attempt failed"
            );

            if attempts >= action.retry.max_attempts {
                return ActionReport::failed(&action.id, attempts, start.elapsed(), last_error);
            }

            // Cancellation stops the retry loop after the in-flight attempt.
            if self.cancel.is_cancelled() {
                return ActionReport::failed(
                    &action.id,
                    attempts,
                    start.elapsed(),
                    format!("{} (cancelled before retry)", last_error),
                );
            }

            thread::sleep(action.retry.backoff);
        }
    }
}

enum GuardDecision {
    Satisfied(String),
    Unsatisfied,
    ProbeFailed(String),
}

/// Run `f`, bounding it by `timeout` on a spawned thread. A zero timeout
/// waits unbounded and runs inline.
fn call_bounded<T, F>(timeout: Duration, f: F) -> Bounded<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    if timeout.is_zero() {
        return Bounded::Done(f());
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });

    match rx.recv_timeout(timeout) {
        Ok(value) => Bounded::Done(value),
        Err(RecvTimeoutError::Timeout) => Bounded::TimedOut,
        Err(RecvTimeoutError::Disconnected) => Bounded::Crashed,
    }
}
