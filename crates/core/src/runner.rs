//! External command execution.
//!
//! [`CommandRunner`] is the seam between the interpreter and the deployment
//! toolchain. [`ProcessRunner`] hands the rendered command line to `sh -c`
//! and waits for it to finish; there is no timeout.

use std::fmt;
use std::future::Future;
use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::error::Result;

/// Maximum stdout or stderr size captured per stream (10 MiB).
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Flags whose following value is masked in logs.
const SECRET_FLAGS: &[&str] = &["--private-key", "--password"];

/// A program plus shell words, rendered as one line for `sh -c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The line as handed to the shell.
    pub fn render(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The line with credential values masked, safe for logs.
    pub fn redacted(&self) -> String {
        let mut words = vec![self.program.clone()];
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                words.push("<redacted>".to_string());
            } else {
                words.push(arg.clone());
            }
            mask_next = SECRET_FLAGS.contains(&arg.as_str());
        }
        words.join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Captured result of one command.
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    pub duration_ms: u64,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs command lines to completion.
///
/// A non-zero exit is reported through [`CommandOutput::exit_code`], not as
/// an error; only failing to spawn or wait is an `Err`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandLine) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// Runs commands as real subprocesses through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command.render())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn()?;

        // Drain both pipes concurrently so a chatty child cannot block on a
        // full pipe while we wait on it.
        let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
        let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

        let status = child.wait().await?;
        let stdout_bytes = stdout_task.await.unwrap_or_default();
        let stderr_bytes = stderr_task.await.unwrap_or_default();

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            exit_code: status.code().unwrap_or(-1),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Read an entire output stream into a byte buffer, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_joins_with_spaces() {
        let cmd = CommandLine::new("cast send")
            .arg("0x01")
            .args(["--rpc-url", "http://localhost:8545"]);
        assert_eq!(cmd.render(), "cast send 0x01 --rpc-url http://localhost:8545");
    }

    #[test]
    fn redacted_masks_secret_values() {
        let cmd = CommandLine::new("forge create")
            .args(["--private-key", "0xsecret", "--keystore", "k.json"])
            .args(["--password", "hunter2", "src/A.sol:A"]);
        let line = cmd.redacted();
        assert!(!line.contains("0xsecret"));
        assert!(!line.contains("hunter2"));
        assert!(line.contains("--keystore k.json"));
        assert!(line.ends_with("src/A.sol:A"));
        assert_eq!(cmd.to_string(), line);
    }

    #[tokio::test]
    async fn process_runner_captures_stdout() {
        let cmd = CommandLine::new("echo").arg("'Deployed to: 0x01'");
        let output = ProcessRunner.run(&cmd).await.expect("run");
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "Deployed to: 0x01");
    }

    #[tokio::test]
    async fn process_runner_reports_nonzero_exit() {
        let cmd = CommandLine::new("sh").args(["-c", "'echo oops >&2; exit 3'"]);
        let output = ProcessRunner.run(&cmd).await.expect("run");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
        assert_eq!(output.stderr.trim(), "oops");
    }

    #[tokio::test]
    async fn process_runner_preserves_quoted_words() {
        let cmd = CommandLine::new("printf").args(["'%s\\n'", "\"transfer(address,uint256)\""]);
        let output = ProcessRunner.run(&cmd).await.expect("run");
        assert_eq!(output.stdout.trim(), "transfer(address,uint256)");
    }
}
