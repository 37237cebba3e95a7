//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

pub mod check;
pub mod plan;
pub mod run;

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::context::RunContext;
use crate::error::{CairnError, Result};

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, returning an exit-code carrying result.
    fn execute(&self) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    working_dir: PathBuf,
    quiet: bool,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given working directory.
    pub fn new(working_dir: PathBuf, quiet: bool) -> Self {
        Self { working_dir, quiet }
    }

    /// Get the working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => {
                run::RunCommand::new(&self.working_dir, args.clone(), self.quiet).execute()
            }
            Some(Commands::Plan(args)) => {
                plan::PlanCommand::new(&self.working_dir, args.clone()).execute()
            }
            Some(Commands::Check(args)) => {
                check::CheckCommand::new(&self.working_dir, args.clone()).execute()
            }
            None => {
                // Default to run with default args
                run::RunCommand::new(&self.working_dir, RunArgs::default(), self.quiet).execute()
            }
        }
    }
}

/// Whether an error is a construction-time failure (bad recipe or graph),
/// mapped to exit code 2 before anything executes.
pub(crate) fn is_construction_error(err: &CairnError) -> bool {
    matches!(
        err,
        CairnError::DuplicateAction { .. }
            | CairnError::UnknownAction { .. }
            | CairnError::InvalidNotifyTarget { .. }
            | CairnError::GraphCycle { .. }
            | CairnError::RecipeNotFound { .. }
            | CairnError::RecipeParseError { .. }
            | CairnError::RecipeValidationError { .. }
    )
}

/// Resolve the recipe path against the working directory.
pub(crate) fn recipe_path(working_dir: &Path, recipe: &Path) -> PathBuf {
    if recipe.is_absolute() {
        recipe.to_path_buf()
    } else {
        working_dir.join(recipe)
    }
}

/// Build a run context from the working directory and `--set` pairs.
pub(crate) fn build_context(working_dir: &Path, set: &[String]) -> Result<RunContext> {
    let mut ctx = RunContext::new().with_working_dir(working_dir);
    for pair in set {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(CairnError::Other(anyhow::anyhow!(
                "invalid --set '{}': expected KEY=VALUE",
                pair
            )));
        };
        ctx.set(key, value);
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(2);
        assert!(!result.success);
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"), false);
        assert_eq!(dispatcher.working_dir(), Path::new("/test"));
    }

    #[test]
    fn recipe_path_joins_relative() {
        let path = recipe_path(Path::new("/project"), Path::new("cairn.yml"));
        assert_eq!(path, PathBuf::from("/project/cairn.yml"));
    }

    #[test]
    fn recipe_path_keeps_absolute() {
        let path = recipe_path(Path::new("/project"), Path::new("/etc/cairn.yml"));
        assert_eq!(path, PathBuf::from("/etc/cairn.yml"));
    }

    #[test]
    fn build_context_parses_set_pairs() {
        let ctx = build_context(
            Path::new("/project"),
            &["cache_dir=/tmp/cache".to_string()],
        )
        .unwrap();
        assert_eq!(ctx.get("cache_dir"), Some("/tmp/cache"));
    }

    #[test]
    fn build_context_rejects_malformed_pair() {
        let result = build_context(Path::new("/project"), &["no-equals".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn construction_errors_are_classified() {
        assert!(is_construction_error(&CairnError::GraphCycle {
            cycle: "a -> a".into()
        }));
        assert!(is_construction_error(&CairnError::RecipeNotFound {
            path: PathBuf::from("x")
        }));
        assert!(!is_construction_error(&CairnError::CommandFailed {
            command: "x".into(),
            code: None
        }));
    }
}
