//! Work items, terminal statuses and outcome types for the batch runner

use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

/// One unit of batch work: a shader source and the artifact it produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Shader source path handed to the compiler
    pub source: PathBuf,
    /// Artifact path the compiler writes
    pub dest: PathBuf,
}

impl WorkItem {
    /// Builds a work item from a source/destination pair
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }
}

/// Status of a work item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Queued, waiting for a pool slot
    Pending,
    /// Holding a pool slot, compiler in flight
    Running,
    /// Compiler exited with status zero
    Succeeded,
    /// Compiler failed, could not be launched, or the worker was lost
    Failed,
    /// Only produced when the runner was configured with a deadline
    TimedOut,
}

/// Terminal record of one work item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskOutcome {
    /// The work item this outcome settles
    pub item: WorkItem,
    /// Terminal status the item reached
    pub status: TaskStatus,
    /// Captured standard output of the invocation
    pub stdout: String,
    /// Captured standard error of the invocation
    pub stderr: String,
    /// Why the item failed, when it did (exit code, launch error, deadline)
    pub error: Option<String>,
    /// Wall-clock time the item spent executing
    pub duration: Duration,
}

impl TaskOutcome {
    /// True when the item compiled cleanly
    pub fn succeeded(&self) -> bool {
        matches!(self.status, TaskStatus::Succeeded)
    }
}

/// Aggregate counts for a finished batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Items submitted
    pub total: usize,
    /// Items that compiled cleanly
    pub succeeded: usize,
    /// Items that failed to compile or run
    pub failed: usize,
    /// Items that exceeded the configured deadline
    pub timed_out: usize,
}

impl BatchSummary {
    /// Tallies the outcome list of a finished batch.
    ///
    /// Outcomes are expected to carry terminal statuses; a stray `Pending`
    /// or `Running` is tallied as failed rather than dropped.
    pub fn from_outcomes(outcomes: &[TaskOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                TaskStatus::Succeeded => summary.succeeded += 1,
                TaskStatus::TimedOut => summary.timed_out += 1,
                TaskStatus::Pending | TaskStatus::Running | TaskStatus::Failed => {
                    summary.failed += 1
                }
            }
        }
        summary
    }

    /// True when every item reached `Succeeded`
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.timed_out == 0
    }
}
