//! Running a [`CommandSpec`] and normalizing the outcome.
//!
//! Execution never raises: every failure (missing binary, timeout,
//! non-zero exit) is captured into an [`ExecutionResult`] so a failed run
//! still produces an inspectable response. Nothing is retried.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::command::{RunOutcome, ToolCommand};
use crate::tools::ToolRegistry;
use crate::workspace::Workspace;
use crate::CommandSpec;

/// Whether the run succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Success,
    Error,
}

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The program is not installed or not on `PATH`.
    ToolNotFound,
    /// The time limit expired and the process was killed.
    Timeout,
    /// The process exited with a non-zero code or was killed by a signal.
    NonZeroExit,
    /// Any other failure to start the process or prepare its inputs.
    Spawn,
}

/// Normalized outcome of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// Exit code; absent on timeout, spawn failure, or signal death.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Human-readable description of the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub duration_ms: u64,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// A failed result for `failure` with no process output.
    pub fn failed(failure: FailureKind, message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Error,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            failure: Some(failure),
            message: Some(message.into()),
            duration_ms: 0,
        }
    }

    fn from_error(err: &cf_core::Error) -> Self {
        let failure = match err {
            cf_core::Error::ToolNotFound(_) => FailureKind::ToolNotFound,
            cf_core::Error::Timeout { .. } => FailureKind::Timeout,
            cf_core::Error::NonZeroExit { .. } => FailureKind::NonZeroExit,
            _ => FailureKind::Spawn,
        };
        Self::failed(failure, err.to_string())
    }

    fn with_duration(mut self, started: Instant) -> Self {
        self.duration_ms = started.elapsed().as_millis() as u64;
        self
    }
}

/// Runs command specs. Implemented by [`ProcessExecutor`] for real
/// processes; tests substitute their own.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn execute(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult;
}

#[async_trait]
impl<E: Executor + ?Sized> Executor for Arc<E> {
    async fn execute(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult {
        (**self).execute(spec, timeout).await
    }
}

/// Executes specs as child processes, resolving programs through a
/// [`ToolRegistry`].
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    tools: Arc<ToolRegistry>,
    working_dir: Option<PathBuf>,
}

impl ProcessExecutor {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self {
            tools,
            working_dir: None,
        }
    }

    /// Run commands (and write concat manifests) in `dir`.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> cf_core::Result<ExecutionResult> {
        let tool = self.tools.require(spec.program())?;

        // Held until the process exits; dropping it deletes the manifest.
        let dir = self.working_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        let mut workspace = Workspace::new(&dir);
        let args = match spec.manifest() {
            Some(manifest) => {
                let path = workspace.write_file(".cmdforge-concat-", ".txt", &manifest.content)?;
                // The child runs in the workspace directory, so the bare
                // file name resolves, and relative entries inside the
                // manifest resolve against the same directory.
                let name = path.file_name().unwrap_or(path.as_os_str());
                spec.args_with_manifest(&name.to_string_lossy())
            }
            None => spec.args().to_vec(),
        };

        let mut cmd = ToolCommand::new(tool.path.clone());
        cmd.args(args).timeout(timeout);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::info!("exec: {spec}");
        let result = match cmd.run().await? {
            RunOutcome::Exited(output) => {
                let success = output.status.success();
                if !success {
                    tracing::warn!("{} exited with {}", spec.program(), output.status);
                }
                ExecutionResult {
                    status: if success {
                        ExecutionStatus::Success
                    } else {
                        ExecutionStatus::Error
                    },
                    exit_code: output.status.code(),
                    failure: (!success).then_some(FailureKind::NonZeroExit),
                    message: (!success)
                        .then(|| format!("{} exited with {}", spec.program(), output.status)),
                    stdout: output.stdout,
                    stderr: output.stderr,
                    duration_ms: 0,
                }
            }
            RunOutcome::TimedOut { stdout, stderr } => ExecutionResult {
                status: ExecutionStatus::Error,
                exit_code: None,
                stdout,
                stderr,
                failure: Some(FailureKind::Timeout),
                message: Some(format!(
                    "{} timed out after {:.1}s and was killed",
                    spec.program(),
                    timeout.as_secs_f64()
                )),
                duration_ms: 0,
            },
        };
        drop(workspace);
        Ok(result)
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult {
        let started = Instant::now();
        match self.run(spec, timeout).await {
            Ok(result) => result.with_duration(started),
            Err(e) => {
                tracing::warn!("failed to run {}: {e}", spec.program());
                ExecutionResult::from_error(&e).with_duration(started)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ConcatManifest, MANIFEST_PLACEHOLDER};

    fn registry_with(name: &str) -> Option<Arc<ToolRegistry>> {
        let path = which::which(name).ok()?;
        Some(Arc::new(ToolRegistry::default().with_tool(name, path)))
    }

    #[tokio::test]
    async fn tool_not_found_fails_fast() {
        let executor = ProcessExecutor::new(Arc::new(ToolRegistry::default()));
        let spec = CommandSpec::new("ffmpeg", vec!["-version".into()]);
        let result = executor.execute(&spec, Duration::from_secs(5)).await;
        assert_eq!(result.status, ExecutionStatus::Error);
        assert_eq!(result.failure, Some(FailureKind::ToolNotFound));
        assert_eq!(result.exit_code, None);
    }

    #[tokio::test]
    async fn success_captures_stdout() {
        let Some(tools) = registry_with("echo") else {
            return;
        };
        let executor = ProcessExecutor::new(tools);
        let spec = CommandSpec::new("echo", vec!["a.mp4; rm -rf /".into()]);
        let result = executor.execute(&spec, Duration::from_secs(5)).await;
        assert!(result.is_success());
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "a.mp4; rm -rf /");
        assert!(result.failure.is_none());
    }

    #[tokio::test]
    async fn non_zero_exit_preserved() {
        let Some(tools) = registry_with("sh") else {
            return;
        };
        let executor = ProcessExecutor::new(tools);
        let spec = CommandSpec::new("sh", vec!["-c".into(), "echo bad input >&2; exit 1".into()]);
        let result = executor.execute(&spec, Duration::from_secs(5)).await;
        assert_eq!(result.status, ExecutionStatus::Error);
        assert_eq!(result.failure, Some(FailureKind::NonZeroExit));
        assert_eq!(result.exit_code, Some(1));
        assert_eq!(result.stderr, "bad input\n");
    }

    #[tokio::test]
    async fn timeout_kills_process() {
        let Some(tools) = registry_with("sleep") else {
            return;
        };
        let executor = ProcessExecutor::new(tools);
        let spec = CommandSpec::new("sleep", vec!["30".into()]);
        let started = Instant::now();
        let result = executor.execute(&spec, Duration::from_secs(1)).await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert_eq!(result.status, ExecutionStatus::Error);
        assert_eq!(result.failure, Some(FailureKind::Timeout));
        assert_eq!(result.exit_code, None);
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn timeout_keeps_partial_output_and_leaves_no_process() {
        let Some(tools) = registry_with("sh") else {
            return;
        };
        let executor = ProcessExecutor::new(tools);
        let spec = CommandSpec::new("sh", vec!["-c".into(), "echo $$; exec sleep 30".into()]);
        let result = executor.execute(&spec, Duration::from_secs(1)).await;

        assert_eq!(result.failure, Some(FailureKind::Timeout));
        let pid: u32 = result.stdout.trim().parse().expect("pid printed before the timeout");
        assert!(
            !std::path::Path::new(&format!("/proc/{pid}")).exists(),
            "process {pid} still running after timeout"
        );
    }

    #[tokio::test]
    async fn manifest_written_for_run_and_removed_after() {
        let Some(tools) = registry_with("cat") else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let executor = ProcessExecutor::new(tools).with_working_dir(dir.path());

        let built = crate::build(
            &crate::Catalog::default(),
            crate::OperationKind::Concat,
            &crate::ParameterSet::new().with("input_files", vec!["a.mp4", "b.mp4"]),
        )
        .unwrap();
        let manifest = built.manifest().unwrap();
        // `cat <manifest>` echoes what ffmpeg would read.
        let spec = CommandSpec::new("cat", vec![MANIFEST_PLACEHOLDER.to_string()]).with_manifest(
            ConcatManifest {
                content: manifest.content.clone(),
                arg_index: 0,
            },
        );

        let result = executor.execute(&spec, Duration::from_secs(5)).await;
        assert!(result.is_success(), "{result:?}");
        assert_eq!(result.stdout, "file 'a.mp4'\nfile 'b.mp4'\n");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn result_serializes_without_empty_fields() {
        let result = ExecutionResult {
            status: ExecutionStatus::Success,
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
            failure: None,
            message: None,
            duration_ms: 12,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("failure").is_none());

        let failed = ExecutionResult::failed(FailureKind::Timeout, "took too long");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["failure"], "timeout");
        assert_eq!(json["status"], "error");
    }
}
