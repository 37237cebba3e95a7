//! cairn - Idempotent provisioning orchestration.
//!
//! cairn is the single-host convergence engine behind a declarative
//! provisioning recipe: it decides what to run, in what order, and whether
//! to skip it. Actions carry an idempotency guard, explicit ordering
//! dependencies, a retry policy, and "refresh-on-change" notify edges;
//! the executor walks the graph in topological order, propagates failures
//! along dependency chains, and fires notified refresh triggers exactly
//! once per run.
//!
//! # Modules
//!
//! - [`action`] - Action definition, builder, and guard probes
//! - [`cli`] - Command-line interface and argument parsing
//! - [`context`] - Run context and cancellation
//! - [`error`] - Error types and result aliases
//! - [`executor`] - Graph execution, retry, timeout, and reporting
//! - [`graph`] - Action graph construction and validation
//! - [`recipe`] - Declarative YAML recipe loading and resolution
//! - [`shell`] - Shell command execution
//!
//! # Example
//!
//! ```
//! use cairn::{Action, ActionGraph, Executor, FnGuard, RunContext};
//!
//! let mut graph = ActionGraph::new();
//! graph.add_action(
//!     Action::builder("install")
//!         .guard(FnGuard::new("already installed", |_| Ok(true)))
//!         .body(|_| Ok(()))
//!         .build(),
//! ).unwrap();
//!
//! let report = Executor::new().run(&graph, &RunContext::new()).unwrap();
//! assert!(report.success());
//! ```

pub mod action;
pub mod cli;
pub mod context;
pub mod error;
pub mod executor;
pub mod graph;
pub mod recipe;
pub mod shell;

pub use action::{Action, ActionBuilder, FnGuard, Guard, GuardReport, RetryPolicy};
pub use context::{CancelToken, RunContext};
pub use error::{CairnError, Result};
pub use executor::{ActionOutcome, ActionReport, Executor, RunReport};
pub use graph::ActionGraph;
