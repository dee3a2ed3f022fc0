//! Screen capture via an external command.
//!
//! The capture command (typically a small OCR wrapper script) receives the
//! monitored region through argument placeholders and prints the extracted
//! text on stdout. Vigil owns none of the capture mechanics; anything the
//! command cannot deliver this tick simply becomes a skipped tick.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

use crate::domain::models::{CaptureConfig, Region};
use crate::domain::ports::{CaptureError, ScreenSource};

/// Shells out to the configured capture command once per tick.
pub struct CommandScreenSource {
    command: String,
    args: Vec<String>,
    timeout_secs: u64,
}

impl CommandScreenSource {
    pub fn new(config: &CaptureConfig) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout_secs: config.timeout_secs,
        }
    }

    fn build_command(&self, region: &Region) -> Command {
        let mut cmd = Command::new(&self.command);
        for arg in &self.args {
            cmd.arg(
                arg.replace("{x}", &region.x.to_string())
                    .replace("{y}", &region.y.to_string())
                    .replace("{width}", &region.width.to_string())
                    .replace("{height}", &region.height.to_string()),
            );
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl ScreenSource for CommandScreenSource {
    async fn capture(&self, region: &Region) -> Result<String, CaptureError> {
        let mut cmd = self.build_command(region);

        let output = timeout(Duration::from_secs(self.timeout_secs), cmd.output())
            .await
            .map_err(|_| CaptureError::Timeout(self.timeout_secs))?
            .map_err(|err| CaptureError::Io(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::CommandFailed(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        if text.trim().is_empty() {
            return Err(CaptureError::Empty);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(command: &str, args: &[&str]) -> CaptureConfig {
        CaptureConfig {
            command: command.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            timeout_secs: 5,
            region_file: String::new(),
        }
    }

    #[tokio::test]
    async fn test_capture_substitutes_region_placeholders() {
        let source = CommandScreenSource::new(&config("echo", &["{x},{y},{width},{height}"]));
        let text = source.capture(&Region::new(1, 2, 30, 40)).await.unwrap();
        assert_eq!(text.trim(), "1,2,30,40");
    }

    #[tokio::test]
    async fn test_missing_command_is_an_io_error() {
        let source = CommandScreenSource::new(&config("definitely-not-a-real-command", &[]));
        let err = source.capture(&Region::new(0, 0, 1, 1)).await.unwrap_err();
        assert!(matches!(err, CaptureError::Io(_)));
    }

    #[tokio::test]
    async fn test_failing_command_reports_stderr() {
        let source = CommandScreenSource::new(&config("sh", &["-c", "echo oops >&2; exit 3"]));
        let err = source.capture(&Region::new(0, 0, 1, 1)).await.unwrap_err();
        match err {
            CaptureError::CommandFailed(message) => assert!(message.contains("oops")),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_output_is_rejected() {
        let source = CommandScreenSource::new(&config("true", &[]));
        let err = source.capture(&Region::new(0, 0, 1, 1)).await.unwrap_err();
        assert!(matches!(err, CaptureError::Empty));
    }
}
