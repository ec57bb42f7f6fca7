use crate::error::{InstallerError, Result};
use std::ffi::OsStr;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Timeout for read-only calls (detection, listing, credential lookup)
pub const DETECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for calls that change agent state
pub const MUTATE_TIMEOUT: Duration = Duration::from_secs(15);

/// Captured result of a finished process
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Best human-readable reason for a failed run: stderr, then stdout, then
    /// the exit status.
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Run a program with captured output, killing it once `timeout` elapses.
pub fn run<S: AsRef<OsStr>>(program: &Path, args: &[S], timeout: Duration) -> Result<CommandOutput> {
    run_with_input(program, args, None, timeout)
}

/// Like [`run`], feeding `input` to the child's stdin.
pub fn run_with_input<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    input: Option<&str>,
    timeout: Duration,
) -> Result<CommandOutput> {
    let name = program.display().to_string();
    // Only the subcommand is logged: later arguments may carry the API key
    let subcommand: Vec<_> = args
        .iter()
        .take(2)
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect();
    tracing::debug!(program = %name, ?subcommand, timeout_secs = timeout.as_secs(), "spawning");

    let mut child = Command::new(program)
        .args(args)
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| InstallerError::ProcessInvocation {
            program: name.clone(),
            message: e.to_string(),
        })?;

    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| InstallerError::ProcessInvocation {
                program: name.clone(),
                message: format!("failed to write stdin: {}", e),
            })?;
    }

    let stdout = read_in_background(child.stdout.take());
    let stderr = read_in_background(child.stderr.take());

    let Some(status) = child.wait_timeout(timeout)? else {
        let _ = child.kill();
        let _ = child.wait();
        tracing::debug!(program = %name, "killed after timeout");
        return Err(InstallerError::ProcessTimeout {
            program: name,
            seconds: timeout.as_secs(),
        });
    };

    let output = CommandOutput {
        code: status.code(),
        success: status.success(),
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    };
    tracing::debug!(program = %name, code = ?output.code, "finished");
    Ok(output)
}

fn read_in_background<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buffer);
        }
        String::from_utf8_lossy(&buffer).into_owned()
    })
}
