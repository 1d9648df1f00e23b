//! External process execution with a time limit

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::errors::DomainError;

/// Captured output of a finished tool run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// One invocation of an external tool
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            timeout: None,
        }
    }

    pub fn args(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// `None` waits indefinitely
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run to completion. A non-zero exit becomes a tool failure carrying
    /// the head of standard error; on timeout the child is killed.
    pub async fn execute(&self) -> Result<ToolOutput, DomainError> {
        debug!(program = %self.program.display(), args = ?self.args, "Running tool");

        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                DomainError::tool(&format!("failed to spawn {}: {}", self.program.display(), e))
            })?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                // dropping the wait future drops the child, which kills it
                Err(_) => {
                    warn!(program = %self.program.display(), seconds = limit.as_secs(), "Tool timed out");
                    return Err(DomainError::Timeout {
                        seconds: limit.as_secs(),
                    });
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| DomainError::tool(&format!("I/O error waiting for process: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            let detail = if stderr.trim().is_empty() {
                format!("exited with status {}", output.status)
            } else {
                stderr
            };
            return Err(DomainError::tool(&detail));
        }

        Ok(ToolOutput { stdout, stderr })
    }
}
