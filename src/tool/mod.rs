//! External compiler invocation
//!
//! The batch runner drives shader compilers through the [`ToolInvoker`] seam
//! so the dispatch machinery stays independent of any one binary.
//! [`GlslangValidator`] is the production invoker; tests substitute
//! in-process stand-ins.

pub mod glslang;
pub mod process;

pub use glslang::GlslangValidator;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Captured result of a single tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Process exit code, `-1` when terminated by a signal
    pub exit_code: i32,
    /// Captured standard output, lossily decoded
    pub stdout: String,
    /// Captured standard error, lossily decoded
    pub stderr: String,
}

impl ToolOutput {
    /// True when the tool exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Errors raised while starting or supervising a tool process
#[derive(Debug, Error)]
pub enum ToolError {
    /// The binary could not be spawned at all
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// Binary name or path that failed to spawn
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The process started but could not be supervised to completion
    #[error("i/o error while running `{program}`: {source}")]
    Io {
        /// Binary name or path that was running
        program: String,
        /// Underlying supervision error
        #[source]
        source: std::io::Error,
    },
}

/// Seam between the batch runner and the external compiler
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Compiles `source` into `dest`, capturing both output streams.
    ///
    /// A non-zero exit is reported inside [`ToolOutput`], not as an `Err`;
    /// `Err` means the process could not be run at all.
    async fn invoke(&self, source: &Path, dest: &Path) -> Result<ToolOutput, ToolError>;
}
