//! Command-line interface.
//!
//! Argument parsing lives in [`args`]; each subcommand is implemented in
//! [`commands`] behind the [`Command`](commands::Command) trait.

pub mod args;
pub mod commands;

pub use args::{CheckArgs, Cli, Commands, PlanArgs, RunArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
