//! Batch runner implementation
//!
//! Concurrent shader compilation with:
//! - Semaphore-bounded worker pool
//! - Destination provisioning before any work is dispatched
//! - Per-item failure isolation and captured diagnostics
//! - Optional per-item deadline
//! - Outcome collection in submission order

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};

use crate::batch::types::{BatchSummary, TaskOutcome, TaskStatus, WorkItem};
use crate::tool::{GlslangValidator, ToolInvoker};
use crate::{Result, SpirvBatchError};

/// Batch runner for compiling many shaders in parallel
pub struct BatchRunner {
    /// Maximum number of items compiled concurrently
    capacity: usize,
    /// Optional per-item deadline
    timeout: Option<Duration>,
    /// Compiler the pool drives
    invoker: Arc<dyn ToolInvoker>,
}

impl BatchRunner {
    /// Creates a runner with one pool slot per CPU and the stock
    /// `glslangValidator` invoker
    pub fn new() -> Self {
        Self {
            capacity: num_cpus::get(),
            timeout: None,
            invoker: Arc::new(GlslangValidator::new()),
        }
    }

    /// Sets the pool size (number of concurrent compiles)
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Fails any single compile that exceeds `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Substitutes the compiler driven by the pool
    pub fn with_invoker(mut self, invoker: Arc<dyn ToolInvoker>) -> Self {
        self.invoker = invoker;
        self
    }

    /// Compiles every item, bounded by the pool size, and returns one
    /// terminal outcome per item in submission order.
    ///
    /// `output_dir` is created (with parents) before anything is dispatched;
    /// failure to provision it refuses the whole batch. A failed compile
    /// never does: it is recorded in its outcome and the rest of the batch
    /// proceeds.
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn run(&self, output_dir: &Path, items: Vec<WorkItem>) -> Result<Vec<TaskOutcome>> {
        let batch_start = Instant::now();

        provision_output_dir(output_dir)?;

        if items.is_empty() {
            info!("no work items to compile");
            return Ok(Vec::new());
        }

        let total = items.len();
        info!(
            total,
            capacity = self.capacity,
            timeout = ?self.timeout,
            "starting shader batch"
        );

        let semaphore = Arc::new(Semaphore::new(self.capacity));
        let mut tasks = Vec::with_capacity(total);

        for item in items {
            let sem = semaphore.clone();
            let invoker = self.invoker.clone();
            let timeout = self.timeout;
            let worker_item = item.clone();

            let task = tokio::spawn(async move {
                debug!(source = %worker_item.source.display(), "item queued");

                // A pool slot gates entry into the running state.
                let _permit = sem.acquire().await.expect("semaphore should not be closed");

                Self::execute_item(worker_item, invoker, timeout).await
            });

            tasks.push((item, task));
        }

        // Completion barrier: every item reaches a terminal status before
        // the batch returns.
        let mut outcomes = Vec::with_capacity(total);
        for (item, task) in tasks {
            match task.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(source = %item.source.display(), error = %e, "worker task aborted");
                    outcomes.push(TaskOutcome {
                        item,
                        status: TaskStatus::Failed,
                        stdout: String::new(),
                        stderr: String::new(),
                        error: Some(format!("worker task aborted: {e}")),
                        duration: Duration::ZERO,
                    });
                }
            }
        }

        let batch_duration = batch_start.elapsed();
        let summary = BatchSummary::from_outcomes(&outcomes);

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            timed_out = summary.timed_out,
            batch_duration_ms = batch_duration.as_millis(),
            avg_item_duration_ms =
                outcomes.iter().map(|o| o.duration.as_millis()).sum::<u128>() / total as u128,
            "shader batch finished"
        );

        if !summary.all_succeeded() {
            warn!(
                failed = summary.failed,
                timed_out = summary.timed_out,
                "some shaders did not compile"
            );
        }

        Ok(outcomes)
    }

    /// Runs one work item to a terminal status; failures never escape
    #[instrument(skip(item, invoker, timeout), fields(source = %item.source.display()))]
    async fn execute_item(
        item: WorkItem,
        invoker: Arc<dyn ToolInvoker>,
        timeout: Option<Duration>,
    ) -> TaskOutcome {
        let start = Instant::now();
        debug!("compiling");

        let invocation = invoker.invoke(&item.source, &item.dest);

        let result = match timeout {
            Some(limit) => match tokio::time::timeout(limit, invocation).await {
                Ok(result) => result,
                Err(_) => {
                    error!(timeout_ms = limit.as_millis(), "compile exceeded deadline");
                    return TaskOutcome {
                        item,
                        status: TaskStatus::TimedOut,
                        stdout: String::new(),
                        stderr: String::new(),
                        error: Some(format!("exceeded {}ms deadline", limit.as_millis())),
                        duration: start.elapsed(),
                    };
                }
            },
            None => invocation.await,
        };

        let duration = start.elapsed();

        match result {
            Ok(output) if output.success() => {
                info!(
                    dest = %item.dest.display(),
                    duration_ms = duration.as_millis(),
                    stdout = %output.stdout.trim(),
                    "shader compiled"
                );
                TaskOutcome {
                    item,
                    status: TaskStatus::Succeeded,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    error: None,
                    duration,
                }
            }
            Ok(output) => {
                error!(
                    dest = %item.dest.display(),
                    exit_code = output.exit_code,
                    stderr = %output.stderr.trim(),
                    "shader validation failed"
                );
                TaskOutcome {
                    item,
                    status: TaskStatus::Failed,
                    stdout: output.stdout,
                    stderr: output.stderr,
                    error: Some(format!("exited with code {}", output.exit_code)),
                    duration,
                }
            }
            Err(e) => {
                error!(error = %e, "compiler could not be run");
                TaskOutcome {
                    item,
                    status: TaskStatus::Failed,
                    stdout: String::new(),
                    stderr: String::new(),
                    error: Some(e.to_string()),
                    duration,
                }
            }
        }
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the destination directory tree; the whole batch is refused if
/// this fails
fn provision_output_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| SpirvBatchError::Provision {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "output directory ready");
    Ok(())
}
