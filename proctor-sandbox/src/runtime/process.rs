//! Process runner - one child, one deadline, one outcome

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::group;

/// Deadline used when a caller does not set one.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

const TRUNCATION_MARKER: &str = "\n... [output truncated]";

/// How long output pipes may keep draining after the child has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// What to run and for how long
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Written to the child's stdin, which is then closed. `None` = null stdin.
    pub stdin: Option<String>,
    pub timeout: Duration,
}

impl ProcessSpec {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            stdin: None,
            timeout: DEFAULT_COMMAND_TIMEOUT,
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

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Captured output of a process that exited with status zero
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// The ways a single process run can fail
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Execution timeout")]
    Timeout { elapsed: Duration },

    #[error("{}", exit_diagnostic(.code, .signal, .stderr))]
    Exited {
        code: Option<i32>,
        signal: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Failed waiting for process: {0}")]
    Wait(#[source] std::io::Error),
}

impl RunError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RunError::Timeout { .. })
    }

    /// Like `to_string`, but falls back to stdout when a non-zero exit wrote
    /// nothing to stderr (some compilers report on stdout).
    pub fn diagnostic_with_stdout_fallback(&self) -> String {
        match self {
            RunError::Exited { stdout, stderr, .. }
                if stderr.trim().is_empty() && !stdout.trim().is_empty() =>
            {
                stdout.trim_end().to_string()
            }
            other => other.to_string(),
        }
    }
}

fn exit_diagnostic(code: &Option<i32>, signal: &Option<i32>, stderr: &str) -> String {
    if !stderr.trim().is_empty() {
        return stderr.trim_end().to_string();
    }
    match (code, signal) {
        (Some(code), _) => format!("Process exited with code {}", code),
        (None, Some(signal)) => format!("Process terminated by signal {}", signal),
        (None, None) => "Process exited abnormally".to_string(),
    }
}

/// Spawns external processes under a wall-clock deadline
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    max_output_bytes: usize,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(1024 * 1024)
    }
}

impl ProcessRunner {
    pub fn new(max_output_bytes: usize) -> Self {
        Self { max_output_bytes }
    }

    /// Run `program args` in `cwd` and return its stdout.
    ///
    /// `timeout` defaults to [`DEFAULT_COMMAND_TIMEOUT`].
    pub async fn run_command(
        &self,
        program: &str,
        args: &[&str],
        cwd: impl Into<PathBuf>,
        timeout: Option<Duration>,
    ) -> Result<String, RunError> {
        let spec = ProcessSpec::new(program, cwd)
            .args(args.iter().copied())
            .timeout(timeout.unwrap_or(DEFAULT_COMMAND_TIMEOUT));
        self.run(spec).await.map(|output| output.stdout)
    }

    /// Run one process to completion or deadline.
    ///
    /// Exactly one outcome is produced: the deadline and the exit are awaited
    /// through a single `timeout` over `wait`, so a process that exits at the
    /// deadline is reported either as exited or as timed out, never both.
    pub async fn run(&self, spec: ProcessSpec) -> Result<ProcessOutput, RunError> {
        let ProcessSpec {
            program,
            args,
            cwd,
            stdin,
            timeout,
        } = spec;
        let started = Instant::now();

        let mut command = Command::new(&program);
        command
            .args(&args)
            .current_dir(&cwd)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        unsafe {
            command.pre_exec(group::set_process_group);
        }

        let mut child = command.spawn().map_err(|source| RunError::Spawn {
            program: program.clone(),
            source,
        })?;
        let pid = child.id();

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            tokio::spawn(async move {
                // A child may exit without reading its input; a broken pipe is fine.
                let _ = pipe.write_all(input.as_bytes()).await;
            });
        }

        let stdout_reader = child
            .stdout
            .take()
            .map(|pipe| OutputReader::spawn(pipe, self.max_output_bytes));
        let stderr_reader = child
            .stderr
            .take()
            .map(|pipe| OutputReader::spawn(pipe, self.max_output_bytes));

        let exited = wait_exited(&mut child, pid);
        let leader_unreaped = match tokio::time::timeout(timeout, exited).await {
            Ok(waited) => waited.map_err(RunError::Wait)?,
            Err(_) => {
                terminate(&mut child, pid).await;
                let elapsed = started.elapsed();
                tracing::warn!(
                    program = %program,
                    timeout_ms = timeout.as_millis() as u64,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Process killed at deadline"
                );
                return Err(RunError::Timeout { elapsed });
            }
        };

        // Background processes left in the group would hold the pipes open.
        // The leader is not reaped yet, so its pid cannot name anyone else's group.
        if let (true, Some(pgid)) = (leader_unreaped, pid) {
            if let Err(e) = group::kill_process_group(pgid) {
                tracing::debug!(program = %program, "Failed to kill process group: {}", e);
            }
        }
        let status = child.wait().await.map_err(RunError::Wait)?;

        let stdout = drain(stdout_reader, &program).await;
        let stderr = drain(stderr_reader, &program).await;
        let elapsed = started.elapsed();

        tracing::debug!(
            program = %program,
            code = ?status.code(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Process exited"
        );

        if status.success() {
            Ok(ProcessOutput {
                stdout,
                stderr,
                elapsed,
            })
        } else {
            Err(RunError::Exited {
                code: status.code(),
                signal: exit_signal(&status),
                stdout,
                stderr,
            })
        }
    }
}

/// Wait for the child to exit. Returns whether it is still waiting to be reaped.
#[cfg(unix)]
async fn wait_exited(child: &mut Child, pid: Option<u32>) -> std::io::Result<bool> {
    match pid {
        Some(pid) => group::wait_exited_unreaped(pid).await.map(|()| true),
        None => child.wait().await.map(|_| false),
    }
}

#[cfg(not(unix))]
async fn wait_exited(child: &mut Child, _pid: Option<u32>) -> std::io::Result<bool> {
    child.wait().await.map(|_| false)
}

async fn terminate(child: &mut Child, pid: Option<u32>) {
    if let Some(pgid) = pid {
        if let Err(e) = group::kill_process_group(pgid) {
            tracing::debug!("Failed to kill process group {}: {}", pgid, e);
        }
    }
    if let Err(e) = child.kill().await {
        tracing::debug!("Failed to kill timed-out child: {}", e);
    }
}

/// Background task collecting one output pipe
struct OutputReader {
    handle: JoinHandle<String>,
    stop: oneshot::Sender<()>,
}

impl OutputReader {
    fn spawn<R>(pipe: R, limit: usize) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (stop, stopped) = oneshot::channel();
        Self {
            handle: tokio::spawn(read_bounded(pipe, limit, stopped)),
            stop,
        }
    }
}

/// Collect what a reader has, waiting at most [`DRAIN_GRACE`] for end of file.
///
/// A pipe still open after the grace is held by a process outside the
/// child's group; what was read so far is kept and marked truncated.
async fn drain(reader: Option<OutputReader>, program: &str) -> String {
    let Some(OutputReader { mut handle, stop }) = reader else {
        return String::new();
    };
    let joined = match tokio::time::timeout(DRAIN_GRACE, &mut handle).await {
        Ok(joined) => joined,
        Err(_) => {
            tracing::warn!(
                program = %program,
                grace_ms = DRAIN_GRACE.as_millis() as u64,
                "Output pipe still open after exit, keeping partial output"
            );
            let _ = stop.send(());
            handle.await
        }
    };
    joined.unwrap_or_else(|e| {
        tracing::debug!("Output reader failed: {}", e);
        String::new()
    })
}

async fn read_bounded<R>(mut pipe: R, limit: usize, mut stopped: oneshot::Receiver<()>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut kept = Vec::new();
    let mut chunk = [0u8; 8192];
    let mut truncated = false;
    loop {
        let read = tokio::select! {
            read = pipe.read(&mut chunk) => read,
            _ = &mut stopped => {
                truncated = true;
                break;
            }
        };
        match read {
            Ok(0) => break,
            Ok(n) => {
                let room = limit.saturating_sub(kept.len());
                if n > room {
                    truncated = true;
                }
                kept.extend_from_slice(&chunk[..n.min(room)]);
            }
            Err(e) => {
                tracing::debug!("Output pipe read failed: {}", e);
                break;
            }
        }
    }
    let mut text = String::from_utf8_lossy(&kept).into_owned();
    if truncated {
        text.push_str(TRUNCATION_MARKER);
    }
    text
}

#[cfg(unix)]
fn exit_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn exit_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
