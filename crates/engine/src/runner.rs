//! Subprocess execution with output draining, timeout, and logging.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Default wall-clock limit for one transcoder invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Polling interval while waiting for the child to exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How many trailing output lines are kept per stream for diagnostics.
const TAIL_LINES: usize = 40;

/// One subprocess invocation, as recorded in the persistent log.
#[derive(Debug, Clone)]
pub struct InvocationRecord {
    /// The full command line, executable included.
    pub command_line: String,

    /// Exit code, or `None` when the process was killed or never exited.
    pub exit_code: Option<i32>,

    /// When the invocation ended.
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Append-only log of every transcoder invocation, across runs.
///
/// An explicit sink rather than a process-wide fixed path, so callers and
/// tests choose where records land.
#[derive(Debug, Clone)]
pub struct InvocationLog {
    path: PathBuf,
}

impl InvocationLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record: timestamp, command line, exit code, blank
    /// separator.
    pub fn append(&self, record: &InvocationRecord) -> std::io::Result<()> {
        use std::io::Write;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let exit = match record.exit_code {
            Some(code) => code.to_string(),
            None => "none (killed or not started)".to_string(),
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        write!(
            file,
            "[{}]\nCommand: {}\nExit Code: {}\n\n",
            record.timestamp.to_rfc3339(),
            record.command_line,
            exit
        )
    }
}

/// Failure modes of one subprocess invocation.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The process could not be started at all.
    #[error("failed to launch '{executable}': {message}")]
    Launch { executable: PathBuf, message: String },

    /// The process outlived the wall-clock limit and was killed.
    #[error("'{executable}' timed out after {timeout_secs}s and was killed")]
    Timeout {
        executable: PathBuf,
        timeout_secs: u64,
    },

    /// The process exited with a non-zero status.
    #[error("'{executable}' exited with status {code}: {stderr_tail} (full record in {log})")]
    ExitStatus {
        executable: PathBuf,
        code: i32,
        stderr_tail: String,
        log: PathBuf,
    },

    /// Waiting on the process failed.
    #[error("failed while waiting for '{executable}': {message}")]
    Wait { executable: PathBuf, message: String },
}

/// Runs the external transcoding tool with redirected output streams.
///
/// Both stdout and stderr are drained concurrently as the process runs; a
/// process that fills an unread pipe buffer would otherwise stall forever.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    executable: PathBuf,
    timeout: Duration,
    log: InvocationLog,
}

impl ProcessRunner {
    pub fn new(executable: impl Into<PathBuf>, log: InvocationLog) -> Self {
        Self {
            executable: executable.into(),
            timeout: DEFAULT_TIMEOUT,
            log,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The invocation log this runner appends to.
    pub fn log(&self) -> &InvocationLog {
        &self.log
    }

    /// Run the tool to completion with the given arguments.
    ///
    /// Every invocation appends one record to the log, whatever the
    /// outcome. Launch failures are returned as values, never propagated
    /// as panics.
    pub fn run(&self, args: &[String]) -> Result<(), RunError> {
        let command_line = std::iter::once(self.executable.display().to_string())
            .chain(args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(command = %command_line, "Running transcoder");

        let mut child = match Command::new(&self.executable)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                self.append_record(&command_line, None);
                return Err(RunError::Launch {
                    executable: self.executable.clone(),
                    message: e.to_string(),
                });
            }
        };

        // Both pipes must be drained while the child runs. Reader threads
        // keep a bounded tail per stream and are joined before returning,
        // even after a forced kill, so buffered output is flushed.
        let stdout_tail = child.stdout.take().map(spawn_tail_reader);
        let stderr_tail = child.stderr.take().map(spawn_tail_reader);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        tracing::warn!(
                            command = %command_line,
                            timeout_secs = self.timeout.as_secs(),
                            "Transcoder timed out, killing process"
                        );
                        child.kill().ok();
                        child.wait().ok();
                        join_tail(stdout_tail);
                        join_tail(stderr_tail);
                        self.append_record(&command_line, None);
                        return Err(RunError::Timeout {
                            executable: self.executable.clone(),
                            timeout_secs: self.timeout.as_secs(),
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    child.kill().ok();
                    join_tail(stdout_tail);
                    join_tail(stderr_tail);
                    self.append_record(&command_line, None);
                    return Err(RunError::Wait {
                        executable: self.executable.clone(),
                        message: e.to_string(),
                    });
                }
            }
        };

        join_tail(stdout_tail);
        let stderr_lines = join_tail(stderr_tail);

        let exit_code = status.code();
        self.append_record(&command_line, exit_code);

        if status.success() {
            tracing::debug!(command = %command_line, "Transcoder finished");
            Ok(())
        } else {
            Err(RunError::ExitStatus {
                executable: self.executable.clone(),
                code: exit_code.unwrap_or(-1),
                stderr_tail: stderr_lines.join(" | "),
                log: self.log.path().to_path_buf(),
            })
        }
    }

    fn append_record(&self, command_line: &str, exit_code: Option<i32>) {
        let record = InvocationRecord {
            command_line: command_line.to_string(),
            exit_code,
            timestamp: chrono::Utc::now(),
        };
        if let Err(e) = self.log.append(&record) {
            tracing::warn!(
                log = %self.log.path().display(),
                error = %e,
                "Failed to append invocation record"
            );
        }
    }
}

/// Drain a pipe line-by-line on a dedicated thread, keeping only the last
/// [`TAIL_LINES`] lines.
fn spawn_tail_reader<R: Read + Send + 'static>(
    stream: R,
) -> std::thread::JoinHandle<Vec<String>> {
    std::thread::spawn(move || {
        let reader = BufReader::new(stream);
        let mut tail: Vec<String> = Vec::new();
        for line in reader.lines() {
            let Ok(line) = line else { break };
            if tail.len() == TAIL_LINES {
                tail.remove(0);
            }
            tail.push(line);
        }
        tail
    })
}

fn join_tail(handle: Option<std::thread::JoinHandle<Vec<String>>>) -> Vec<String> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
