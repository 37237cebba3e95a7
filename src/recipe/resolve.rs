//! Recipe resolution.
//!
//! Compiles a parsed [`Recipe`] into an [`ActionGraph`] of shell-command
//! actions. Guards become the built-in probes; bodies execute through the
//! shell module with the recipe environment merged under the action
//! environment, and run-context values layered on top so `--set` overrides
//! reach commands.

use std::collections::HashMap;

use tracing::debug;

use crate::action::{Action, All, Any, CommandSucceeds, FileExists, Guard, PathContains};
use crate::error::Result;
use crate::graph::ActionGraph;
use crate::recipe::schema::{ActionConfig, GuardConfig, Recipe};
use crate::shell::{execute, CommandOptions};
use std::sync::Arc;
use std::time::Duration;

/// Build an executable action graph from a recipe.
pub fn resolve_recipe(recipe: &Recipe) -> Result<ActionGraph> {
    recipe.validate()?;

    let mut graph = ActionGraph::new();

    for config in &recipe.actions {
        let action = resolve_action(config, &recipe.env);
        debug!(action = %config.id, "resolved recipe action");
        graph.add_action(action)?;
    }

    graph.validate()?;
    Ok(graph)
}

fn resolve_action(config: &ActionConfig, global_env: &HashMap<String, String>) -> Action {
    let mut builder = Action::builder(&config.id);

    if let Some(guard) = &config.guard {
        builder = builder.guard_arc(Arc::from(resolve_guard(guard)));
    }

    for dep in &config.requires {
        builder = builder.requires(dep);
    }
    for target in &config.notifies {
        builder = builder.notifies(target);
    }

    if let Some(retry) = &config.retry {
        builder = builder.retry(retry.max_attempts, Duration::from_millis(retry.backoff_ms));
    }

    builder = builder.timeout(Duration::from_secs(config.timeout_secs));

    if config.refresh_only {
        builder = builder.refresh_only();
    }

    // Environment layering: recipe < action < run-context values.
    let mut env = global_env.clone();
    env.extend(config.env.iter().map(|(k, v)| (k.clone(), v.clone())));

    let command = config.command.clone();
    builder
        .body(move |ctx| {
            let mut merged = env.clone();
            merged.extend(ctx.values().iter().map(|(k, v)| (k.clone(), v.clone())));

            let options = CommandOptions {
                cwd: Some(ctx.working_dir()),
                env: merged,
            };

            let result = execute(&command, &options)?;
            if result.success {
                Ok(())
            } else {
                anyhow::bail!(
                    "command exited with code {:?}: {}",
                    result.exit_code,
                    tail(&result.stderr, 200)
                )
            }
        })
        .build()
}

fn resolve_guard(config: &GuardConfig) -> Box<dyn Guard> {
    match config {
        GuardConfig::FileExists { path } => Box::new(FileExists::new(path.clone())),
        GuardConfig::CommandSucceeds { command } => {
            Box::new(CommandSucceeds::new(command.clone()))
        }
        GuardConfig::PathContains { entry } => Box::new(PathContains::new(entry.clone())),
        GuardConfig::All { guards } => {
            Box::new(All::new(guards.iter().map(resolve_guard).collect()))
        }
        GuardConfig::Any { guards } => {
            Box::new(Any::new(guards.iter().map(resolve_guard).collect()))
        }
    }
}

/// Last `max` characters of command output, for failure details.
fn tail(s: &str, max: usize) -> String {
    let trimmed = s.trim();
    if trimmed.len() <= max {
        trimmed.to_string()
    } else {
        let start = trimmed.len() - max;
        // Avoid slicing mid-codepoint.
        let boundary = (start..trimmed.len())
            .find(|&i| trimmed.is_char_boundary(i))
            .unwrap_or(start);
        format!("...{}", &trimmed[boundary..])
    }
}
