//! Target execution
//!
//! Runs a task and its transitive dependencies sequentially in dependency
//! order. Tasks without actions are grouping nodes and are reported as
//! skipped rather than executed.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{PhasrError, Result};
use crate::registry::TaskRegistry;

/// How a task ended up in a [`RunReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    /// At least one action ran
    Executed,
    /// No actions attached
    Skipped,
}

/// Result of running a single task
#[derive(Debug, Clone, Serialize)]
pub struct TaskRun {
    pub task: String,
    pub outcome: TaskOutcome,
    pub duration_ms: u64,
}

/// Report for one [`run_target`] invocation
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: String,
    pub started_at: DateTime<Utc>,
    pub tasks: Vec<TaskRun>,
    pub total_ms: u64,
}

impl RunReport {
    /// Number of tasks that ran at least one action
    pub fn executed(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.outcome == TaskOutcome::Executed)
            .count()
    }

    /// Number of tasks with no actions
    pub fn skipped(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.outcome == TaskOutcome::Skipped)
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for task in &self.tasks {
            let status = match task.outcome {
                TaskOutcome::Executed => style("✓").green(),
                TaskOutcome::Skipped => style("-").dim(),
            };

            writeln!(
                f,
                "{} {} {}",
                status,
                style(&task.task).bold(),
                style(format!("{:.2}s", task.duration_ms as f64 / 1000.0)).dim()
            )?;
        }

        writeln!(f)?;
        write!(
            f,
            "{} {} tasks completed in {:.2}s ({} skipped)",
            style("✓").green().bold(),
            self.executed(),
            self.total_ms as f64 / 1000.0,
            self.skipped()
        )
    }
}

/// Run a task and everything it depends on.
///
/// Actions run sequentially in dependency order; the first failure stops
/// the run and surfaces as [`PhasrError::TaskFailed`]. Actions stay
/// attached afterwards, so a target can be run again.
pub fn run_target(registry: &mut TaskRegistry, target_name: &str) -> Result<RunReport> {
    let order = registry.execution_order(target_name)?;
    let started_at = Utc::now();
    let run_start = Instant::now();

    info!(tasks = order.len(), "running target {}", target_name);

    let mut tasks = Vec::with_capacity(order.len());

    for id in order {
        let start = Instant::now();
        let node = registry.node_mut(id);
        let name = node.name.clone();
        let outcome = if node.has_actions() {
            TaskOutcome::Executed
        } else {
            TaskOutcome::Skipped
        };

        for action in node.actions_mut() {
            if let Err(source) = action() {
                return Err(PhasrError::TaskFailed { task: name, source });
            }
        }

        debug!(task = %name, outcome = ?outcome, "task finished");

        tasks.push(TaskRun {
            task: name,
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        });
    }

    Ok(RunReport {
        target: target_name.to_string(),
        started_at,
        tasks,
        total_ms: run_start.elapsed().as_millis() as u64,
    })
}
