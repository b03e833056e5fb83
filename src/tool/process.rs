//! Captured subprocess execution
//!
//! Shared plumbing for tool invokers: spawns the command with piped output,
//! drains both streams concurrently with the child, and folds the result
//! into a [`ToolOutput`].

use std::process::Stdio;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

use super::{ToolError, ToolOutput};

/// Upper bound on captured bytes per stream. Compiler diagnostics stay well
/// below this; a runaway child must not exhaust memory.
const MAX_CAPTURE_BYTES: u64 = 1024 * 1024;

/// Runs `cmd` to completion and captures its exit code and both streams.
///
/// `program` is the binary name used in error values and logs.
pub async fn run_captured(mut cmd: Command, program: &str) -> Result<ToolOutput, ToolError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        // A dropped invocation (deadline hit upstream) must not leak the child.
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| ToolError::Launch {
        program: program.to_string(),
        source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let stdout_task = tokio::spawn(read_stream(stdout));
    let stderr_task = tokio::spawn(read_stream(stderr));

    let status = child.wait().await.map_err(|source| ToolError::Io {
        program: program.to_string(),
        source,
    })?;

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    let exit_code = status.code().unwrap_or(-1);
    debug!(program, exit_code, "tool process finished");

    Ok(ToolOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

/// Drains a piped stream, truncating at [`MAX_CAPTURE_BYTES`].
async fn read_stream<R>(stream: Option<R>) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = Vec::new();
    if let Some(stream) = stream {
        let mut limited = stream.take(MAX_CAPTURE_BYTES);
        let _ = limited.read_to_end(&mut buffer).await;
    }
    buffer
}
