//! Subprocess execution for platform invocations.
//!
//! Strategies *plan* invocations; this module runs them. Output is captured
//! on dedicated reader threads (avoiding pipe-buffer deadlocks) and a waiter
//! thread with `mpsc::recv_timeout` provides timeout support without
//! busy-waiting. A timed-out process is killed by PID.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Applied when the caller does not override the timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// One planned subprocess: what a strategy wants run, before it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    /// Working directory; the project root when absent.
    pub cwd: Option<PathBuf>,
}

impl Invocation {
    pub fn new(
        program: impl Into<String>,
        args: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: Vec::new(),
            cwd: None,
        }
    }

    /// A command line run through `sh -c`.
    pub fn shell(command: impl Into<String>) -> Self {
        Self::new("sh", ["-c".to_string(), command.into()])
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// The command line as shown in dry runs and result records.
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        for arg in &self.args {
            if arg.chars().any(char::is_whitespace) {
                parts.push(format!("'{arg}'"));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

// ---------------------------------------------------------------------------
// ExecRecord
// ---------------------------------------------------------------------------

/// The outcome of one executed invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecRecord {
    /// Display form of the invocation that ran.
    pub invocation: String,
    pub success: bool,
    /// Merged stdout/stderr, trimmed, tail-capped at 10KB.
    pub output: String,
    pub duration_ms: u64,
}

// ---------------------------------------------------------------------------
// execute
// ---------------------------------------------------------------------------

/// Run one invocation to completion. Spawn failures and timeouts become
/// failed records, not errors; per-service aggregation decides what a
/// failure means for the run.
pub fn execute(invocation: &Invocation, root: &Path, timeout: Option<Duration>) -> ExecRecord {
    let display = invocation.display();
    let start = std::time::Instant::now();
    let (success, output) = run_process(invocation, root, timeout);
    ExecRecord {
        invocation: display,
        success,
        output,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn run_process(
    invocation: &Invocation,
    root: &Path,
    timeout: Option<Duration>,
) -> (bool, String) {
    // A relative working directory is relative to the project root
    let cwd: PathBuf = match &invocation.cwd {
        Some(p) if p.is_relative() => root.join(p),
        Some(p) => p.clone(),
        None => root.to_path_buf(),
    };
    let mut child = match Command::new(&invocation.program)
        .args(&invocation.args)
        .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => return (false, format!("failed to spawn: {e}")),
    };

    let child_pid = child.id();

    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> String {
        let mut buf = String::new();
        if let Some(mut r) = stdout_handle {
            use std::io::Read;
            let _ = r.read_to_string(&mut buf);
        }
        buf
    });
    let stderr_thread = std::thread::spawn(move || -> String {
        let mut buf = String::new();
        if let Some(mut r) = stderr_handle {
            use std::io::Read;
            let _ = r.read_to_string(&mut buf);
        }
        buf
    });

    let wait_result = match timeout {
        None => child.wait(),
        Some(timeout_dur) => {
            // The child is moved to a waiter thread; on timeout we kill by
            // PID. The reader threads see EOF on the closed pipes and exit.
            let (tx, rx) = std::sync::mpsc::channel();
            std::thread::spawn(move || {
                let _ = tx.send(child.wait());
            });

            match rx.recv_timeout(timeout_dur) {
                Ok(result) => result,
                Err(_) => {
                    kill_process(child_pid);
                    let secs = timeout_dur.as_secs();
                    return (false, format!("timed out after {secs}s"));
                }
            }
        }
    };

    let stdout_buf = stdout_thread.join().unwrap_or_default();
    let stderr_buf = stderr_thread.join().unwrap_or_default();

    let status = match wait_result {
        Ok(s) => s,
        Err(e) => return (false, format!("wait failed: {e}")),
    };

    format_output(status.success(), &stdout_buf, &stderr_buf)
}

/// Combine stdout/stderr and cap to 10KB (keeping the tail).
fn format_output(success: bool, stdout: &str, stderr: &str) -> (bool, String) {
    let output = if stderr.is_empty() {
        stdout.to_string()
    } else if stdout.is_empty() {
        stderr.to_string()
    } else {
        format!("{stdout}\n{stderr}")
    };
    const MAX_OUTPUT: usize = 10 * 1024;
    let trimmed = output.trim();
    let capped = if trimmed.len() > MAX_OUTPUT {
        &trimmed[trimmed.len() - MAX_OUTPUT..]
    } else {
        trimmed
    };
    (success, capped.to_string())
}

/// Terminate a process by PID using SIGKILL. Best-effort; errors are silently ignored.
fn kill_process(pid: u32) {
    let _ = Command::new("kill")
        .arg("-9")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
