//! # spirv-batch
//!
//! Bounded-concurrency batch compilation of GLSL shaders to SPIR-V, driving
//! `glslangValidator` as an external process.
//!
//! ## Overview
//!
//! A fixed-size worker pool compiles every (source, destination) pair it is
//! given, isolates per-shader failures so one broken shader never sinks the
//! rest of the batch, and returns a terminal outcome for each item once the
//! whole set has settled. The destination directory is provisioned before
//! any compile starts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use spirv_batch::batch::BatchRunner;
//! use spirv_batch::manifest;
//!
//! # async fn example() -> spirv_batch::Result<()> {
//! let runner = BatchRunner::new().with_capacity(4);
//!
//! let output_dir = std::path::Path::new(manifest::DEFAULT_OUTPUT_DIR);
//! let outcomes = runner.run(output_dir, manifest::default_work_items()).await?;
//!
//! for outcome in outcomes.iter().filter(|o| !o.succeeded()) {
//!     eprintln!("{} failed: {}", outcome.item.source.display(), outcome.stderr);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Features
//!
//! - **Bounded concurrency**: semaphore-gated worker pool with a configurable size
//! - **Failure isolation**: a failed compile is recorded, never fatal
//! - **Completion barrier**: `run` returns only when every item is terminal
//! - **Captured diagnostics**: stdout/stderr of every invocation, surfaced
//!   through structured logs and the outcome list
//! - **Pluggable compiler**: swap the binary behind [`tool::ToolInvoker`]
//!
//! ## Modules
//!
//! - [`batch`]: Worker pool, outcome types and the completion barrier
//! - [`manifest`]: The renderer's shader set and default directory layout
//! - [`tool`]: `glslangValidator` invocation and subprocess capture

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::path::PathBuf;

use thiserror::Error;

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, SpirvBatchError>;

/// Main error type for batch operations
///
/// Per-shader compile failures are not errors at this level; they are
/// recorded in each item's outcome. Only conditions that refuse a whole
/// batch surface here.
#[derive(Error, Debug)]
pub enum SpirvBatchError {
    /// The destination directory could not be created before dispatch
    #[error("failed to provision output directory {}: {source}", path.display())]
    Provision {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying filesystem error
        source: std::io::Error,
    },
}

/// Batch runner, work items and outcome types
pub mod batch;

/// Compiled-in shader manifest and default directory layout
pub mod manifest;

/// External compiler invocation
pub mod tool;
