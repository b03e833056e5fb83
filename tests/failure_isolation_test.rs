//! Failure isolation tests
//!
//! One broken shader must never sink the batch: a failure is recorded in
//! its own outcome with the captured diagnostics while every other item
//! still compiles.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use spirv_batch::batch::{BatchRunner, BatchSummary, TaskStatus, WorkItem};
use spirv_batch::tool::{GlslangValidator, ToolError, ToolInvoker, ToolOutput};

const STDERR_DIAGNOSTIC: &str = "ERROR: 0:12: 'projectionMatrix' : undeclared identifier";

#[tokio::test]
async fn one_failing_item_does_not_abort_the_batch() {
    let temp = TempDir::new("isolated");
    let invoker = Arc::new(FailingInvoker::rejecting(&["broken.frag"]));

    let mut items = vec![WorkItem::new("broken.frag", "broken.spv")];
    items.extend((0..5).map(|i| WorkItem::new(format!("ok_{i}.vert"), format!("ok_{i}.spv"))));

    let runner = BatchRunner::new()
        .with_capacity(6)
        .with_invoker(invoker.clone());
    let outcomes = runner
        .run(temp.path(), items)
        .await
        .expect("a failing item is not fatal");

    assert_eq!(outcomes.len(), 6);
    assert_eq!(invoker.calls(), 6, "remaining items must still be dispatched");

    let broken = &outcomes[0];
    assert_eq!(broken.status, TaskStatus::Failed);
    assert!(
        broken.stderr.contains("undeclared identifier"),
        "stderr diagnostics must be captured, got: {}",
        broken.stderr
    );
    assert!(
        broken
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("exited with code"),
        "failure reason must name the exit code"
    );

    assert!(
        outcomes[1..].iter().all(|o| o.succeeded()),
        "healthy items must still compile"
    );
}

#[tokio::test]
async fn a_batch_where_everything_fails_still_settles() {
    let temp = TempDir::new("all-fail");
    let invoker = Arc::new(FailingInvoker::rejecting(&["a.vert", "b.frag", "c.comp"]));

    let items = vec![
        WorkItem::new("a.vert", "a.spv"),
        WorkItem::new("b.frag", "b.spv"),
        WorkItem::new("c.comp", "c.spv"),
    ];

    let runner = BatchRunner::new().with_capacity(2).with_invoker(invoker);
    let outcomes = runner
        .run(temp.path(), items)
        .await
        .expect("even a fully failing batch settles");

    let summary = BatchSummary::from_outcomes(&outcomes);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 3);
    assert!(!summary.all_succeeded());
}

#[tokio::test]
async fn launch_failures_are_folded_into_the_item_outcome() {
    let temp = TempDir::new("launch");
    // A real invoker pointing at a binary that cannot exist exercises the
    // production spawn path.
    let invoker =
        Arc::new(GlslangValidator::new().with_binary("spirv-batch-test-missing-compiler"));

    let items = vec![
        WorkItem::new("a.vert", temp.path().join("a.spv")),
        WorkItem::new("b.frag", temp.path().join("b.spv")),
    ];

    let runner = BatchRunner::new().with_capacity(2).with_invoker(invoker);
    let outcomes = runner
        .run(temp.path(), items)
        .await
        .expect("a missing compiler stays a per-item failure");

    for outcome in &outcomes {
        assert_eq!(outcome.status, TaskStatus::Failed);
        let reason = outcome
            .error
            .as_deref()
            .expect("launch failure must be explained");
        assert!(
            reason.contains("failed to launch"),
            "unexpected reason: {reason}"
        );
    }
}

#[tokio::test]
async fn deadline_marks_only_the_slow_item_timed_out() {
    let temp = TempDir::new("deadline");
    let invoker = Arc::new(SlowOnDemand {
        slow_source: PathBuf::from("slow.comp"),
        delay: Duration::from_millis(200),
    });

    let items = vec![
        WorkItem::new("slow.comp", "slow.spv"),
        WorkItem::new("fast.vert", "fast.spv"),
    ];

    let runner = BatchRunner::new()
        .with_capacity(2)
        .with_timeout(Duration::from_millis(50))
        .with_invoker(invoker);
    let outcomes = runner
        .run(temp.path(), items)
        .await
        .expect("a deadline hit stays a per-item failure");

    assert_eq!(outcomes[0].status, TaskStatus::TimedOut);
    assert!(
        outcomes[0]
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("deadline"),
        "timeout must be explained in the outcome"
    );
    assert_eq!(outcomes[1].status, TaskStatus::Succeeded);

    let summary = BatchSummary::from_outcomes(&outcomes);
    assert_eq!(summary.timed_out, 1);
    assert_eq!(summary.succeeded, 1);
}

#[tokio::test]
async fn a_worker_panic_is_folded_into_a_failed_outcome() {
    let temp = TempDir::new("panic");
    let invoker = Arc::new(PanickingInvoker {
        panic_on: PathBuf::from("explodes.comp"),
    });

    let mut items = vec![WorkItem::new("explodes.comp", "explodes.spv")];
    items.extend((0..3).map(|i| WorkItem::new(format!("ok_{i}.vert"), format!("ok_{i}.spv"))));

    // Capacity 1: if the lost worker kept its pool slot, the siblings could
    // never start and the batch would never settle.
    let runner = BatchRunner::new().with_capacity(1).with_invoker(invoker);
    let outcomes = runner
        .run(temp.path(), items)
        .await
        .expect("a panicking worker is not fatal");

    assert_eq!(outcomes.len(), 4, "every item still yields an outcome");

    let lost = &outcomes[0];
    assert_eq!(lost.status, TaskStatus::Failed);
    assert!(
        lost.error
            .as_deref()
            .unwrap_or_default()
            .contains("worker task aborted"),
        "the fabricated outcome must say the worker was lost, got: {:?}",
        lost.error
    );

    assert!(
        outcomes[1..].iter().all(|o| o.succeeded()),
        "siblings must still compile after the panic"
    );
}

// Test invokers ------------------------------------------------------------

/// Fails the configured source names with a compiler-style diagnostic.
struct FailingInvoker {
    rejected: Vec<PathBuf>,
    calls: AtomicUsize,
}

impl FailingInvoker {
    fn rejecting(names: &[&str]) -> Self {
        Self {
            rejected: names.iter().map(PathBuf::from).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolInvoker for FailingInvoker {
    async fn invoke(&self, source: &Path, _dest: &Path) -> Result<ToolOutput, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rejected.iter().any(|r| r.as_path() == source) {
            return Ok(ToolOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: STDERR_DIAGNOSTIC.to_string(),
            });
        }
        Ok(ToolOutput {
            exit_code: 0,
            stdout: source.display().to_string(),
            stderr: String::new(),
        })
    }
}

/// Sleeps past the deadline for one designated source.
struct SlowOnDemand {
    slow_source: PathBuf,
    delay: Duration,
}

#[async_trait]
impl ToolInvoker for SlowOnDemand {
    async fn invoke(&self, source: &Path, _dest: &Path) -> Result<ToolOutput, ToolError> {
        if source == self.slow_source.as_path() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(ToolOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

/// Panics on one designated source to simulate a worker lost mid-item.
struct PanickingInvoker {
    panic_on: PathBuf,
}

#[async_trait]
impl ToolInvoker for PanickingInvoker {
    async fn invoke(&self, source: &Path, _dest: &Path) -> Result<ToolOutput, ToolError> {
        if source == self.panic_on.as_path() {
            panic!("worker lost while compiling {}", source.display());
        }
        Ok(ToolOutput {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}

// Helpers ------------------------------------------------------------------

static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(label: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "spirv-batch-{label}-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
