//! Error types for phasr
//!
//! Uses `miette` for pretty error reporting with error codes and help text.

use miette::Diagnostic;
use thiserror::Error;

use crate::phase::Phase;

/// Error type returned by a task action.
///
/// Actions are host-supplied closures, so any error they produce is carried
/// opaquely and surfaced through [`PhasrError::TaskFailed`].
pub type ActionError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for phasr operations
#[derive(Error, Diagnostic, Debug)]
pub enum PhasrError {
    #[error("Target name for the {phase} task is empty")]
    #[diagnostic(
        code(phasr::task::empty_target),
        help("Pass a non-empty target name, e.g. build_task(&mut registry, \"Sln\", true, \"\")")
    )]
    EmptyTargetName {
        phase: Phase,
    },

    #[error("Nested {phase} task '{target}' has no parent task name")]
    #[diagnostic(
        code(phasr::task::missing_parent),
        help("Nested tasks (is_target = false) must name the target task they belong to")
    )]
    MissingParentTask {
        target: String,
        phase: Phase,
    },

    #[error("Task '{name}' not found")]
    #[diagnostic(
        code(phasr::task::not_found),
        help("Check TaskRegistry::task_names() for the registered tasks")
    )]
    TaskNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Circular dependency detected: {cycle}")]
    #[diagnostic(
        code(phasr::graph::cycle),
        help("Check manually wired dependencies for loops")
    )]
    CyclicDependency {
        cycle: String,
    },

    #[error("Task '{task}' failed")]
    #[diagnostic(code(phasr::run::failed))]
    TaskFailed {
        task: String,
        #[source]
        source: ActionError,
    },
}

/// Result type alias for phasr operations
pub type Result<T> = std::result::Result<T, PhasrError>;
