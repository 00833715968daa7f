//! Bounded-time execution of external tools.
//!
//! The capability traits are synchronous and run on the blocking pool, so
//! [`run`] drives a `tokio::process` child to completion on the current
//! runtime handle. The deadline covers the whole invocation, including
//! draining stdout and stderr, so a background process that inherits the
//! pipes cannot stretch it.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::Command;
use tokio::runtime::{Builder, Handle};

use crate::traits::ToolError;

/// Bytes of stderr kept in [`ToolError::Exit`].
const STDERR_TAIL: usize = 2048;

/// Captured result of a successful invocation.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Run `cmd` to completion, killing it once `timeout` elapses.
///
/// Must not be called from inside an async task; use `spawn_blocking`.
/// Without an ambient runtime a current-thread runtime is built for the call.
///
/// Returns [`ToolError::Exit`] on a non-zero exit with the tail of stderr.
pub fn run(cmd: Command, timeout: Duration) -> Result<ToolOutput, ToolError> {
    match Handle::try_current() {
        Ok(handle) => handle.block_on(run_async(cmd, timeout)),
        Err(_) => Builder::new_current_thread()
            .enable_all()
            .build()?
            .block_on(run_async(cmd, timeout)),
    }
}

async fn run_async(mut cmd: Command, timeout: Duration) -> Result<ToolOutput, ToolError> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    tracing::debug!(command = ?cmd, timeout_ms = timeout.as_millis() as u64, "running tool");

    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Spawn {
            program: program.clone(),
            source,
        })?;

    let started = Instant::now();
    // On expiry the output future is dropped, which drops and kills the child.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            tracing::warn!(program = %program, secs = timeout.as_secs(), "tool timed out; killed");
            return Err(ToolError::Timeout {
                program,
                secs: timeout.as_secs(),
            });
        }
    };

    tracing::debug!(
        program = %program,
        status = %output.status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "tool finished"
    );

    if !output.status.success() {
        return Err(ToolError::Exit {
            program,
            status: output.status.to_string(),
            stderr: tail(&output.stderr),
        });
    }
    Ok(ToolOutput {
        status: output.status,
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

fn tail(bytes: &[u8]) -> String {
    let start = bytes.len().saturating_sub(STDERR_TAIL);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_stdout() {
        let out = run(sh("printf hello"), Duration::from_secs(10)).unwrap();
        assert_eq!(out.stdout, b"hello");
        assert!(out.status.success());
    }

    #[test]
    fn non_zero_exit_reports_stderr() {
        match run(sh("echo boom >&2; exit 3"), Duration::from_secs(10)) {
            Err(ToolError::Exit { stderr, .. }) => assert_eq!(stderr, "boom"),
            other => panic!("expected Exit, got {other:?}"),
        }
    }

    #[test]
    fn slow_tool_is_killed() {
        let started = Instant::now();
        let err = run(sh("sleep 30"), Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn background_child_holding_pipes_cannot_extend_deadline() {
        let started = Instant::now();
        let err = run(sh("sleep 5 & exit 0"), Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn missing_binary_is_spawn_error() {
        let cmd = Command::new("/nonexistent/aurax-tool");
        assert!(matches!(
            run(cmd, Duration::from_secs(1)),
            Err(ToolError::Spawn { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runs_on_the_blocking_pool_of_an_ambient_runtime() {
        let out = tokio::task::spawn_blocking(|| run(sh("printf ok"), Duration::from_secs(10)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(out.stdout, b"ok");
    }
}
