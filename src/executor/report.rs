//! Run report types.
//!
//! A [`RunReport`] enumerates every action with its outcome, attempt count,
//! duration, and failure detail, in the order actions reached a terminal
//! state. Enough to diagnose which guard or body failed without re-running.

use std::time::Duration;

use serde::Serialize;

/// Terminal result of one action within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Guard satisfied; body not run.
    Skipped,

    /// Body ran and succeeded within the retry budget.
    Succeeded,

    /// Body ran; all attempts exhausted.
    Failed,

    /// Blocked by an upstream failure or by cancellation.
    NotRun,
}

impl ActionOutcome {
    /// Whether this outcome counts toward a converged run.
    pub fn is_converged(&self) -> bool {
        matches!(self, ActionOutcome::Succeeded | ActionOutcome::Skipped)
    }

    /// Get a display character for this outcome.
    pub fn display_char(&self) -> char {
        match self {
            ActionOutcome::Skipped => '⊘',
            ActionOutcome::Succeeded => '✓',
            ActionOutcome::Failed => '✗',
            ActionOutcome::NotRun => '○',
        }
    }
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActionOutcome::Skipped => "skipped",
            ActionOutcome::Succeeded => "succeeded",
            ActionOutcome::Failed => "failed",
            ActionOutcome::NotRun => "not run",
        };
        write!(f, "{}", s)
    }
}

/// Per-action entry in a run report.
#[derive(Debug, Clone, Serialize)]
pub struct ActionReport {
    /// Action id.
    pub id: String,

    /// Terminal outcome.
    pub outcome: ActionOutcome,

    /// Body attempts made (0 for skipped and not-run actions).
    pub attempts: u32,

    /// Wall-clock time spent on this action.
    #[serde(with = "duration_millis")]
    pub duration: Duration,

    /// Skip reason, last error, or block reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ActionReport {
    /// Create a skipped entry.
    pub fn skipped(id: &str, detail: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            outcome: ActionOutcome::Skipped,
            attempts: 0,
            duration: Duration::ZERO,
            detail: Some(detail.into()),
        }
    }

    /// Create a succeeded entry.
    pub fn succeeded(id: &str, attempts: u32, duration: Duration) -> Self {
        Self {
            id: id.to_string(),
            outcome: ActionOutcome::Succeeded,
            attempts,
            duration,
            detail: None,
        }
    }

    /// Create a failed entry with the last error detail.
    pub fn failed(id: &str, attempts: u32, duration: Duration, detail: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            outcome: ActionOutcome::Failed,
            attempts,
            duration,
            detail: Some(detail.into()),
        }
    }

    /// Create a not-run entry with the block reason.
    pub fn not_run(id: &str, detail: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            outcome: ActionOutcome::NotRun,
            attempts: 0,
            duration: Duration::ZERO,
            detail: Some(detail.into()),
        }
    }

    /// Generate a summary line for display.
    pub fn summary_line(&self) -> String {
        match self.outcome {
            ActionOutcome::Succeeded => {
                let retry_note = if self.attempts > 1 {
                    format!(", attempt {}", self.attempts)
                } else {
                    String::new()
                };
                format!(
                    "{} {} ({}{})",
                    self.outcome.display_char(),
                    self.id,
                    format_duration(self.duration),
                    retry_note
                )
            }
            ActionOutcome::Skipped => {
                let reason = self.detail.as_deref().unwrap_or("already satisfied");
                format!("{} {} ({})", self.outcome.display_char(), self.id, reason)
            }
            ActionOutcome::Failed => {
                let error = self.detail.as_deref().unwrap_or("unknown error");
                format!(
                    "{} {} - {} (after {} attempt{})",
                    self.outcome.display_char(),
                    self.id,
                    error,
                    self.attempts,
                    if self.attempts == 1 { "" } else { "s" }
                )
            }
            ActionOutcome::NotRun => {
                let reason = self.detail.as_deref().unwrap_or("blocked");
                format!("{} {} ({})", self.outcome.display_char(), self.id, reason)
            }
        }
    }
}

/// Result of running an action graph.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Per-action entries in terminal-state order.
    pub actions: Vec<ActionReport>,

    /// Total run duration.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl RunReport {
    /// Whether every terminal result is succeeded or skipped.
    pub fn success(&self) -> bool {
        self.actions.iter().all(|a| a.outcome.is_converged())
    }

    /// Look up the entry for an action id.
    pub fn outcome_of(&self, id: &str) -> Option<&ActionReport> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// Count entries with the given outcome.
    pub fn count(&self, outcome: ActionOutcome) -> usize {
        self.actions.iter().filter(|a| a.outcome == outcome).count()
    }
}

/// Format a duration for display.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{}s", secs, millis / 100)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_is_converged() {
        assert!(ActionOutcome::Succeeded.is_converged());
        assert!(ActionOutcome::Skipped.is_converged());
        assert!(!ActionOutcome::Failed.is_converged());
        assert!(!ActionOutcome::NotRun.is_converged());
    }

    #[test]
    fn outcome_display_char() {
        assert_eq!(ActionOutcome::Succeeded.display_char(), '✓');
        assert_eq!(ActionOutcome::Failed.display_char(), '✗');
        assert_eq!(ActionOutcome::Skipped.display_char(), '⊘');
        assert_eq!(ActionOutcome::NotRun.display_char(), '○');
    }

    #[test]
    fn outcome_display() {
        assert_eq!(format!("{}", ActionOutcome::Succeeded), "succeeded");
        assert_eq!(format!("{}", ActionOutcome::NotRun), "not run");
    }

    #[test]
    fn report_success_requires_all_converged() {
        let report = RunReport {
            actions: vec![
                ActionReport::succeeded("a", 1, Duration::from_secs(1)),
                ActionReport::skipped("b", "file exists: x"),
            ],
            duration: Duration::from_secs(1),
        };
        assert!(report.success());

        let report = RunReport {
            actions: vec![
                ActionReport::succeeded("a", 1, Duration::from_secs(1)),
                ActionReport::failed("b", 2, Duration::from_secs(1), "boom"),
            ],
            duration: Duration::from_secs(2),
        };
        assert!(!report.success());
    }

    #[test]
    fn report_outcome_lookup_and_count() {
        let report = RunReport {
            actions: vec![
                ActionReport::succeeded("a", 1, Duration::ZERO),
                ActionReport::not_run("b", "dependency 'a' failed"),
                ActionReport::not_run("c", "cancelled"),
            ],
            duration: Duration::ZERO,
        };

        assert_eq!(
            report.outcome_of("b").unwrap().outcome,
            ActionOutcome::NotRun
        );
        assert_eq!(report.count(ActionOutcome::NotRun), 2);
        assert!(report.outcome_of("missing").is_none());
    }

    #[test]
    fn summary_line_includes_status_glyph() {
        let entry = ActionReport::succeeded("download", 1, Duration::from_secs(1));
        let line = entry.summary_line();
        assert!(line.contains('✓'));
        assert!(line.contains("download"));
    }

    #[test]
    fn summary_line_notes_retries() {
        let entry = ActionReport::succeeded("download", 3, Duration::from_secs(1));
        assert!(entry.summary_line().contains("attempt 3"));
    }

    #[test]
    fn summary_line_failed_shows_attempts_and_error() {
        let entry = ActionReport::failed("unzip", 2, Duration::from_secs(1), "exit code 9");
        let line = entry.summary_line();
        assert!(line.contains("exit code 9"));
        assert!(line.contains("2 attempts"));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = RunReport {
            actions: vec![ActionReport::skipped("a", "file exists: x")],
            duration: Duration::from_millis(42),
        };

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"skipped\""));
        assert!(json.contains("\"file exists: x\""));
    }

    #[test]
    fn format_duration_formats_correctly() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.0s");
        assert_eq!(format_duration(Duration::from_secs(65)), "1m 5s");
    }
}
