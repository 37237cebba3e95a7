//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::recipe::DEFAULT_RECIPE_FILE;

/// cairn - Idempotent provisioning orchestration.
#[derive(Debug, Parser)]
#[command(name = "cairn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Working directory for the run (overrides current directory)
    #[arg(short = 'C', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a recipe to convergence (default if no command specified)
    Run(RunArgs),

    /// Show the execution order and guard status without running anything
    Plan(PlanArgs),

    /// Validate a recipe and its action graph
    Check(CheckArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    /// Recipe file
    #[arg(default_value = DEFAULT_RECIPE_FILE)]
    pub recipe: PathBuf,

    /// Set a context value passed to guards and bodies (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            recipe: PathBuf::from(DEFAULT_RECIPE_FILE),
            set: Vec::new(),
            json: false,
        }
    }
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, clap::Args)]
pub struct PlanArgs {
    /// Recipe file
    #[arg(default_value = DEFAULT_RECIPE_FILE)]
    pub recipe: PathBuf,

    /// Set a context value used when probing guards (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CheckArgs {
    /// Recipe file
    #[arg(default_value = DEFAULT_RECIPE_FILE)]
    pub recipe: PathBuf,
}
