//! Shell command execution.
//!
//! Used by the recipe layer (command bodies) and the command-probe guard.
//! The orchestration core never calls into this module; it only sees the
//! opaque callables built on top of it.

mod command;

pub use command::{execute, execute_check, CommandOptions, CommandResult};
