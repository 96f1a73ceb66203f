//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Default command timeout: 5 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// How a run ended.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The process exited on its own, successfully or not.
    Exited(ToolOutput),
    /// The time limit expired; the process was killed. Holds whatever output
    /// arrived before that.
    TimedOut { stdout: String, stderr: String },
}

/// A builder for constructing and executing external tool invocations.
///
/// Arguments are passed to the OS as a vector; no shell is involved.
///
/// # Example
///
/// ```no_run
/// use cf_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> cf_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffmpeg"))
///     .arg("-hide_banner")
///     .arg("-version")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
    current_dir: Option<PathBuf>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            current_dir: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    /// Run the process in `dir` instead of the current directory.
    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Run the command to completion or until the timeout, capturing stdout
    /// and stderr. A non-zero exit is not an error here.
    ///
    /// # Errors
    ///
    /// - [`cf_core::Error::ToolNotFound`] if the program does not exist.
    /// - [`cf_core::Error::Io`] for any other spawn or wait failure.
    pub async fn run(&self) -> cf_core::Result<RunOutcome> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => cf_core::Error::ToolNotFound(program_name.clone()),
            _ => cf_core::Error::from(e),
        })?;

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        // The buffers outlive the timed future, so output read before a
        // timeout is kept.
        let waited = tokio::time::timeout(self.timeout, async {
            let (status, _, _) = tokio::join!(
                child.wait(),
                drain(stdout_pipe.as_mut(), &mut stdout),
                drain(stderr_pipe.as_mut(), &mut stderr),
            );
            status
        })
        .await;

        match waited {
            Ok(status) => Ok(RunOutcome::Exited(ToolOutput {
                status: status?,
                stdout: String::from_utf8_lossy(&stdout).to_string(),
                stderr: String::from_utf8_lossy(&stderr).to_string(),
            })),
            Err(_elapsed) => {
                tracing::warn!("{program_name} timed out after {:?}; killing", self.timeout);
                // `kill` also reaps, so no zombie is left behind.
                if let Err(e) = child.kill().await {
                    tracing::warn!("failed to kill {program_name}: {e}");
                }
                Ok(RunOutcome::TimedOut {
                    stdout: String::from_utf8_lossy(&stdout).to_string(),
                    stderr: String::from_utf8_lossy(&stderr).to_string(),
                })
            }
        }
    }

    /// Execute the command, treating a non-zero exit or a timeout as an error.
    ///
    /// # Errors
    ///
    /// - [`cf_core::Error::Timeout`] if the process times out.
    /// - [`cf_core::Error::NonZeroExit`] if the process exits with a non-zero
    ///   status (includes stderr).
    /// - Any error from [`ToolCommand::run`].
    pub async fn execute(&self) -> cf_core::Result<ToolOutput> {
        match self.run().await? {
            RunOutcome::Exited(output) if output.status.success() => Ok(output),
            RunOutcome::Exited(output) => Err(cf_core::Error::NonZeroExit {
                tool: self.program_name(),
                code: output.status.code(),
                stderr: output.stderr.trim().to_string(),
            }),
            RunOutcome::TimedOut { .. } => Err(cf_core::Error::Timeout {
                tool: self.program_name(),
                secs: self.timeout.as_secs_f64(),
            }),
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<&mut R>, buf: &mut Vec<u8>) {
    if let Some(r) = reader {
        if let Err(e) = r.read_to_end(buf).await {
            tracing::debug!("error reading child output: {e}");
        }
    }
}
