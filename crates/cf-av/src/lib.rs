//! # cf-av
//!
//! FFmpeg command generation and execution.
//!
//! This crate provides:
//!
//! - **Operation catalog** ([`Catalog`], [`OperationKind`]) -- the supported
//!   operations and the parameters each one accepts.
//! - **Command building** ([`build`]) -- pure translation of an operation and
//!   a [`ParameterSet`] into a [`CommandSpec`] argument vector.
//! - **Tool discovery** ([`ToolRegistry`]) -- find ffmpeg and ffprobe.
//! - **Command execution** ([`ToolCommand`], [`ProcessExecutor`]) -- run a
//!   spec without a shell, with a timeout and captured output.
//! - **Facade** ([`Generator`]) -- build and optionally execute in one call.

pub mod argv;
pub mod builder;
pub mod command;
pub mod executor;
pub mod format;
pub mod generate;
pub mod operation;
pub mod params;
pub mod tools;
pub mod workspace;

// ---- Re-exports for convenience ----

pub use builder::{build, derive_output, CommandSpec, ConcatManifest};
pub use command::{RunOutcome, ToolCommand, ToolOutput};
pub use executor::{ExecutionResult, ExecutionStatus, Executor, FailureKind, ProcessExecutor};
pub use format::MediaFormat;
pub use generate::{Generator, ResponseEnvelope};
pub use operation::{Catalog, OperationContract, OperationKind, ParamSpec, Requirement};
pub use params::{ParamValue, ParameterSet};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use workspace::Workspace;
