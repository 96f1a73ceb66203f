//! The single entry point combining build and optional execution.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::argv;
use crate::builder::{self, CommandSpec, FFMPEG};
use crate::executor::{ExecutionResult, Executor, ProcessExecutor};
use crate::operation::{Catalog, OperationKind};
use crate::params::ParameterSet;
use crate::tools::ToolRegistry;

/// What [`Generator::generate`] returns to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    pub operation: OperationKind,
    /// Display form of the built command.
    pub command: String,
    /// The discrete argument vector, program first.
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
    /// Present iff execution was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_result: Option<ExecutionResult>,
}

/// Builds commands and, on request, runs them.
///
/// The catalog is fixed at construction; the executor is any [`Executor`],
/// so tests can record invocations instead of spawning processes.
pub struct Generator<E = ProcessExecutor> {
    catalog: Catalog,
    executor: E,
    timeout: Duration,
}

impl Generator<ProcessExecutor> {
    /// Wire a generator from configuration, discovering tools on `PATH`.
    pub fn from_config(config: &cf_core::Config) -> Self {
        let tools = Arc::new(ToolRegistry::discover(&config.tools));
        Self::new(
            Catalog::from_config(&config.defaults),
            ProcessExecutor::new(tools),
            config.execution.timeout(),
        )
    }
}

impl<E: Executor> Generator<E> {
    pub fn new(catalog: Catalog, executor: E, timeout: Duration) -> Self {
        Self {
            catalog,
            executor,
            timeout,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Timeout applied to every execution.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Override the execution timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build without executing.
    pub fn build(
        &self,
        kind: OperationKind,
        params: &ParameterSet,
    ) -> cf_core::Result<CommandSpec> {
        builder::build(&self.catalog, kind, params)
    }

    /// Build the command for `kind` and run it when `execute` is set.
    ///
    /// Build errors are returned before anything is spawned. Execution
    /// failures are reported inside the envelope's `execution_result`.
    pub async fn generate(
        &self,
        kind: OperationKind,
        params: &ParameterSet,
        execute: bool,
    ) -> cf_core::Result<ResponseEnvelope> {
        let spec = self.build(kind, params)?;

        let execution_result = if execute {
            tracing::info!("executing {kind} with timeout {:?}", self.timeout);
            Some(self.executor.execute(&spec, self.timeout).await)
        } else {
            None
        };

        let mut args = Vec::with_capacity(spec.args().len() + 1);
        args.push(spec.program().to_string());
        args.extend(spec.args().iter().cloned());

        Ok(ResponseEnvelope {
            operation: kind,
            command: spec.command_string(),
            args,
            output_file: spec.output_file().map(str::to_string),
            execution_result,
        })
    }

    /// [`Generator::generate`] with the operation given by name.
    ///
    /// # Errors
    ///
    /// [`cf_core::Error::UnknownOperation`] if `operation` is not in the
    /// catalog, plus any build error.
    pub async fn generate_named(
        &self,
        operation: &str,
        params: &ParameterSet,
        execute: bool,
    ) -> cf_core::Result<ResponseEnvelope> {
        let kind: OperationKind = operation.parse()?;
        self.generate(kind, params, execute).await
    }

    /// Run a pre-built ffmpeg command line, bypassing the builder.
    ///
    /// The line is split into discrete arguments (quotes honored, nothing
    /// expanded) and a leading `ffmpeg` is optional.
    ///
    /// # Errors
    ///
    /// [`cf_core::Error::InvalidParameterValue`] if the line is empty or has
    /// unbalanced quotes.
    pub async fn run_command(&self, command_line: &str) -> cf_core::Result<ExecutionResult> {
        let spec = passthrough_spec(command_line)?;
        Ok(self.executor.execute(&spec, self.timeout).await)
    }
}

/// Turn a raw ffmpeg command line into a spec for the executor.
pub fn passthrough_spec(command_line: &str) -> cf_core::Result<CommandSpec> {
    let mut args = argv::split(command_line)?;
    if args.first().is_some_and(|first| names_ffmpeg(first)) {
        args.remove(0);
    }
    if args.is_empty() {
        return Err(cf_core::Error::invalid("command", "no arguments given"));
    }
    Ok(CommandSpec::new(FFMPEG, args))
}

/// `ffmpeg` itself or any path ending in it.
fn names_ffmpeg(token: &str) -> bool {
    Path::new(token).file_name() == Some(OsStr::new(FFMPEG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutionStatus, FailureKind};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every spec instead of running it.
    #[derive(Default)]
    struct RecordingExecutor {
        seen: Mutex<Vec<(CommandSpec, Duration)>>,
    }

    #[async_trait]
    impl Executor for RecordingExecutor {
        async fn execute(&self, spec: &CommandSpec, timeout: Duration) -> ExecutionResult {
            self.seen.lock().unwrap().push((spec.clone(), timeout));
            ExecutionResult {
                status: ExecutionStatus::Success,
                exit_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
                failure: None,
                message: None,
                duration_ms: 0,
            }
        }
    }

    fn generator() -> Generator<RecordingExecutor> {
        Generator::new(
            Catalog::default(),
            RecordingExecutor::default(),
            Duration::from_secs(42),
        )
    }

    fn trim_params() -> ParameterSet {
        ParameterSet::new()
            .with("input_file", "in.mp4")
            .with("start_time", "00:01:00")
            .with("duration", "30")
    }

    #[tokio::test]
    async fn generate_without_execute_has_no_result() {
        let gen = generator();
        let envelope = gen.generate(OperationKind::Trim, &trim_params(), false).await.unwrap();
        assert!(envelope.execution_result.is_none());
        assert!(gen.executor().seen.lock().unwrap().is_empty());
        assert_eq!(envelope.args[0], "ffmpeg");
        assert!(envelope.command.starts_with("ffmpeg -hide_banner -y -ss 00:01:00"));
        assert_eq!(envelope.output_file.as_deref(), Some("in_trim.mp4"));

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["operation"], "trim");
        assert!(json.get("execution_result").is_none());
    }

    #[tokio::test]
    async fn generate_with_execute_uses_configured_timeout() {
        let gen = generator();
        let envelope = gen.generate(OperationKind::Trim, &trim_params(), true).await.unwrap();
        assert!(envelope.execution_result.unwrap().is_success());
        let seen = gen.executor().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, Duration::from_secs(42));
        assert_eq!(seen[0].0.output_file(), Some("in_trim.mp4"));
    }

    #[tokio::test]
    async fn build_error_spawns_nothing() {
        let gen = generator();
        let params = ParameterSet::new().with("input_file", "in.mp4");
        let err = gen.generate(OperationKind::Trim, &params, true).await.unwrap_err();
        assert!(err.is_build_error());
        assert!(gen.executor().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_operation_by_name() {
        let gen = generator();
        let err = gen
            .generate_named("reverse", &trim_params(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, cf_core::Error::UnknownOperation(_)));
        assert!(gen.executor().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_command_strips_program_and_keeps_tokens() {
        let gen = generator();
        gen.run_command(r#"ffmpeg -i "my clip.mp4" -c copy 'out; rm -rf ~.mkv'"#)
            .await
            .unwrap();
        let seen = gen.executor().seen.lock().unwrap();
        assert_eq!(seen[0].0.program(), "ffmpeg");
        assert_eq!(
            seen[0].0.args(),
            &["-i", "my clip.mp4", "-c", "copy", "out; rm -rf ~.mkv"]
        );
    }

    #[tokio::test]
    async fn run_command_strips_ffmpeg_given_as_path() {
        let gen = generator();
        gen.run_command("/usr/bin/ffmpeg -i a.mp4 b.mkv").await.unwrap();
        gen.run_command("./ffmpeg-static -version").await.unwrap();
        let seen = gen.executor().seen.lock().unwrap();
        assert_eq!(seen[0].0.program(), "ffmpeg");
        assert_eq!(seen[0].0.args(), &["-i", "a.mp4", "b.mkv"]);
        assert_eq!(seen[1].0.args(), &["./ffmpeg-static", "-version"]);
    }

    #[tokio::test]
    async fn run_command_rejects_bad_lines() {
        let gen = generator();
        assert!(gen.run_command("").await.is_err());
        assert!(gen.run_command("ffmpeg").await.is_err());
        assert!(gen.run_command("-i 'unterminated").await.is_err());
        assert!(gen.executor().seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_ffmpeg_is_reported_in_envelope() {
        let gen = Generator::new(
            Catalog::default(),
            ProcessExecutor::new(Arc::new(ToolRegistry::default())),
            Duration::from_secs(5),
        );
        let envelope = gen.generate(OperationKind::Trim, &trim_params(), true).await.unwrap();
        let result = envelope.execution_result.unwrap();
        assert_eq!(result.status, ExecutionStatus::Error);
        assert_eq!(result.failure, Some(FailureKind::ToolNotFound));
    }
}
