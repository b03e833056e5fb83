//! glslangValidator invocation profile
//!
//! Builds the argument vector the shader set is compiled with:
//! `-V -g --target-env vulkan1.3 <source> -o <dest>`. The binary name and
//! target environment can be overridden for alternate toolchains.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use super::process::run_captured;
use super::{ToolError, ToolInvoker, ToolOutput};

/// Binary resolved through `PATH` unless overridden
pub const DEFAULT_BINARY: &str = "glslangValidator";

/// SPIR-V target environment the shader set is authored against
pub const DEFAULT_TARGET_ENV: &str = "vulkan1.3";

/// Invoker that shells out to `glslangValidator`
#[derive(Debug, Clone)]
pub struct GlslangValidator {
    binary: String,
    target_env: String,
}

impl GlslangValidator {
    /// Creates the invoker with the stock binary name and target environment
    pub fn new() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            target_env: DEFAULT_TARGET_ENV.to_string(),
        }
    }

    /// Overrides the binary to execute (absolute path or `PATH` lookup)
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Overrides the `--target-env` value
    pub fn with_target_env(mut self, target_env: impl Into<String>) -> Self {
        self.target_env = target_env.into();
        self
    }

    fn command(&self, source: &Path, dest: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-V")
            .arg("-g")
            .arg("--target-env")
            .arg(&self.target_env)
            .arg(source)
            .arg("-o")
            .arg(dest);
        cmd
    }
}

impl Default for GlslangValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolInvoker for GlslangValidator {
    async fn invoke(&self, source: &Path, dest: &Path) -> Result<ToolOutput, ToolError> {
        run_captured(self.command(source, dest), &self.binary).await
    }
}
