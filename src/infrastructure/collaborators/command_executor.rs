//! Instruction dispatch via an external typing command.
//!
//! The executor command (typically a small automation wrapper around the
//! platform's input synthesis) receives the instruction text on stdin and
//! types it into the monitored session. Exit status is the delivery result.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::domain::models::ExecutorConfig;
use crate::domain::ports::{ActionExecutor, DispatchError};

/// Pipes each instruction into the configured command.
pub struct CommandActionExecutor {
    command: String,
    args: Vec<String>,
    timeout_secs: u64,
}

impl CommandActionExecutor {
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

#[async_trait]
impl ActionExecutor for CommandActionExecutor {
    async fn dispatch(&self, instruction: &str) -> Result<bool, DispatchError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| DispatchError::Io(err.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(instruction.as_bytes())
                .await
                .map_err(|err| DispatchError::Io(err.to_string()))?;
            // Close stdin so the command sees end of input.
            drop(stdin);
        }

        let output = timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output())
            .await
            .map_err(|_| DispatchError::Timeout(self.timeout_secs))?
            .map_err(|err| DispatchError::Io(err.to_string()))?;

        if output.status.success() {
            Ok(true)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.trim().is_empty() {
                Ok(false)
            } else {
                Err(DispatchError::CommandFailed(format!(
                    "{} exited with {}: {}",
                    self.command,
                    output.status,
                    stderr.trim()
                )))
            }
        }
    }
}
