//! Run command implementation.
//!
//! `cairn run` loads a recipe, compiles it into an action graph, and runs it
//! to convergence. Exit code 0 when every action succeeded or was skipped,
//! 1 when any action failed or was blocked, 2 on recipe or graph
//! construction errors.

use std::path::{Path, PathBuf};

use console::style;

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::executor::{format_duration, ActionOutcome, Executor, RunReport};
use crate::recipe::{load_recipe, resolve_recipe};

use super::{build_context, is_construction_error, recipe_path, Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    working_dir: PathBuf,
    args: RunArgs,
    quiet: bool,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(working_dir: &Path, args: RunArgs, quiet: bool) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            args,
            quiet,
        }
    }

    fn print_report(&self, report: &RunReport) {
        for entry in &report.actions {
            let line = entry.summary_line();
            let styled = match entry.outcome {
                ActionOutcome::Succeeded => style(line).green().to_string(),
                ActionOutcome::Failed => style(line).red().to_string(),
                ActionOutcome::Skipped => style(line).dim().to_string(),
                ActionOutcome::NotRun => style(line).yellow().to_string(),
            };
            println!("  {}", styled);
        }

        let summary = format!(
            "{} succeeded, {} skipped, {} failed, {} not run ({})",
            report.count(ActionOutcome::Succeeded),
            report.count(ActionOutcome::Skipped),
            report.count(ActionOutcome::Failed),
            report.count(ActionOutcome::NotRun),
            format_duration(report.duration)
        );
        if report.success() {
            println!("{}", style(summary).bold());
        } else {
            println!("{}", style(summary).bold().red());
        }
    }
}

impl Command for RunCommand {
    fn execute(&self) -> Result<CommandResult> {
        let path = recipe_path(&self.working_dir, &self.args.recipe);

        let recipe = match load_recipe(&path) {
            Ok(recipe) => recipe,
            Err(e) if is_construction_error(&e) => {
                eprintln!("{}", style(format!("Error: {}", e)).red());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let graph = match resolve_recipe(&recipe) {
            Ok(graph) => graph,
            Err(e) if is_construction_error(&e) => {
                eprintln!("{}", style(format!("Error: {}", e)).red());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let ctx = build_context(&self.working_dir, &self.args.set)?;

        if !self.quiet && !self.args.json {
            let name = recipe.name.as_deref().unwrap_or("recipe");
            println!("{}", style(format!("Converging {}", name)).bold());
        }

        let report = Executor::new().run(&graph, &ctx)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?;
            println!("{}", json);
        } else if !self.quiet {
            self.print_report(&report);
        }

        if report.success() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
