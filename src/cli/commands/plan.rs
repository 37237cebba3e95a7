//! Plan command implementation.
//!
//! `cairn plan` shows the execution order and current guard status without
//! running anything: which actions would run, which would be skipped, and
//! which refresh triggers wait on notification.

use std::path::{Path, PathBuf};

use console::style;

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::recipe::{load_recipe, resolve_recipe};

use super::{build_context, is_construction_error, recipe_path, Command, CommandResult};

/// The plan command implementation.
pub struct PlanCommand {
    working_dir: PathBuf,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(working_dir: &Path, args: PlanArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            args,
        }
    }
}

impl Command for PlanCommand {
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
        let order = graph.topological_order()?;

        let name = recipe.name.as_deref().unwrap_or("recipe");
        println!(
            "{}",
            style(format!("Plan for {} ({} actions)", name, order.len())).bold()
        );

        for (index, id) in order.iter().enumerate() {
            let action = graph.get(id).expect("ordered id exists in graph");

            let status = if action.refresh_only {
                style("on notify".to_string()).dim()
            } else {
                match &action.guard {
                    None => style("run".to_string()).green(),
                    Some(guard) => match guard.evaluate(&ctx) {
                        Ok(report) if report.satisfied => {
                            style(format!("skip ({})", report.description)).dim()
                        }
                        Ok(report) => style(format!("run ({})", report.description)).green(),
                        Err(e) => style(format!("probe error: {}", e)).red(),
                    },
                }
            };

            println!("  {}. {:<20} {}", index + 1, id, status);
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn plan_validates_recipe() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cairn.yml"),
            r#"
            actions:
              - id: download
                command: echo hi
              - id: unzip
                command: echo hi
                requires: [download]
        "#,
        )
        .unwrap();

        let args = PlanArgs {
            recipe: PathBuf::from("cairn.yml"),
            set: vec![],
        };
        let result = PlanCommand::new(temp.path(), args).execute().unwrap();
        assert!(result.success);
    }

    #[test]
    fn plan_rejects_invalid_recipe() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cairn.yml"),
            r#"
            actions:
              - id: unzip
                command: echo hi
                requires: [missing]
        "#,
        )
        .unwrap();

        let args = PlanArgs {
            recipe: PathBuf::from("cairn.yml"),
            set: vec![],
        };
        let result = PlanCommand::new(temp.path(), args).execute().unwrap();
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn plan_does_not_execute_bodies() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cairn.yml"),
            r#"
            actions:
              - id: touch
                command: touch ran.txt
        "#,
        )
        .unwrap();

        let args = PlanArgs {
            recipe: PathBuf::from("cairn.yml"),
            set: vec![],
        };
        PlanCommand::new(temp.path(), args).execute().unwrap();

        assert!(!temp.path().join("ran.txt").exists());
    }
}
