//! Error types for cairn operations.
//!
//! This module defines [`CairnError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Graph construction errors (`DuplicateAction`, `UnknownAction`,
//!   `InvalidNotifyTarget`, `GraphCycle`) are fatal: the executor aborts
//!   before anything runs.
//! - Per-action runtime failures never surface here; they are captured in
//!   the run report and propagate only along `requires` edges.
//! - Use `anyhow::Error` (via `CairnError::Other`) for unexpected errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cairn operations.
#[derive(Debug, Error)]
pub enum CairnError {
    /// An action id was registered twice in the same graph.
    #[error("Duplicate action id: {id}")]
    DuplicateAction { id: String },

    /// An edge references an action id not present in the graph.
    #[error("Edge '{from}' -> '{to}' references unknown action '{unknown}'")]
    UnknownAction {
        from: String,
        to: String,
        unknown: String,
    },

    /// A notify edge points at an action that is not a refresh trigger.
    #[error("Action '{from}' notifies '{to}', which is not marked refresh_only")]
    InvalidNotifyTarget { from: String, to: String },

    /// The requires relation contains a cycle.
    #[error("Dependency cycle detected: {cycle}")]
    GraphCycle { cycle: String },

    /// Recipe file not found at the expected location.
    #[error("Recipe not found: {path}")]
    RecipeNotFound { path: PathBuf },

    /// Failed to parse a recipe file.
    #[error("Failed to parse recipe at {path}: {message}")]
    RecipeParseError { path: PathBuf, message: String },

    /// Invalid recipe structure or values.
    #[error("Invalid recipe: {message}")]
    RecipeValidationError { message: String },

    /// Shell command could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for cairn operations.
pub type Result<T> = std::result::Result<T, CairnError>;
