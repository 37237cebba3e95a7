//! Check command implementation.
//!
//! `cairn check` validates a recipe and its action graph without touching
//! the environment: parse errors, empty commands, dangling edges, bad
//! notify targets, and dependency cycles are all reported here.

use std::path::{Path, PathBuf};

use console::style;

use crate::cli::args::CheckArgs;
use crate::error::Result;
use crate::recipe::{load_recipe, resolve_recipe};

use super::{is_construction_error, recipe_path, Command, CommandResult};

/// The check command implementation.
pub struct CheckCommand {
    working_dir: PathBuf,
    args: CheckArgs,
}

impl CheckCommand {
    /// Create a new check command.
    pub fn new(working_dir: &Path, args: CheckArgs) -> Self {
        Self {
            working_dir: working_dir.to_path_buf(),
            args,
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self) -> Result<CommandResult> {
        let path = recipe_path(&self.working_dir, &self.args.recipe);

        let outcome = load_recipe(&path).and_then(|recipe| {
            let graph = resolve_recipe(&recipe)?;
            Ok((recipe, graph))
        });

        match outcome {
            Ok((recipe, graph)) => {
                let name = recipe.name.as_deref().unwrap_or("recipe");
                println!(
                    "{}",
                    style(format!("{} OK ({} actions)", name, graph.len())).green()
                );
                Ok(CommandResult::success())
            }
            Err(e) if is_construction_error(&e) => {
                eprintln!("{}", style(format!("Error: {}", e)).red());
                Ok(CommandResult::failure(2))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn check(dir: &Path) -> CommandResult {
        let args = CheckArgs {
            recipe: PathBuf::from("cairn.yml"),
        };
        CheckCommand::new(dir, args).execute().unwrap()
    }

    #[test]
    fn check_accepts_valid_recipe() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cairn.yml"),
            r#"
            actions:
              - id: download
                command: echo hi
        "#,
        )
        .unwrap();

        assert_eq!(check(temp.path()).exit_code, 0);
    }

    #[test]
    fn check_rejects_missing_recipe() {
        let temp = TempDir::new().unwrap();
        assert_eq!(check(temp.path()).exit_code, 2);
    }

    #[test]
    fn check_rejects_cycle() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cairn.yml"),
            r#"
            actions:
              - { id: a, command: echo a, requires: [b] }
              - { id: b, command: echo b, requires: [a] }
        "#,
        )
        .unwrap();

        assert_eq!(check(temp.path()).exit_code, 2);
    }

    #[test]
    fn check_rejects_bad_notify_target() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("cairn.yml"),
            r#"
            actions:
              - { id: a, command: echo a, notifies: [b] }
              - { id: b, command: echo b }
        "#,
        )
        .unwrap();

        assert_eq!(check(temp.path()).exit_code, 2);
    }
}
