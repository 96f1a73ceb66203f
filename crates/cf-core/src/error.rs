//! Unified error type for cmdforge.
//!
//! Build-time failures (unknown operation, missing or invalid parameters)
//! and documentation failures are raised as [`Error`]. Execution-time
//! failures are normally captured into an execution result instead; the
//! matching variants exist here so the executor can describe them with the
//! same vocabulary. Every variant has a stable machine-readable code via
//! [`Error::code`].

/// Unified error type covering all failure modes in cmdforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested operation is not in the catalog.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// A required parameter was not supplied.
    #[error("Missing parameter [{operation}]: {parameter}")]
    MissingParameter {
        /// Operation being built.
        operation: String,
        /// Name of the absent parameter.
        parameter: String,
    },

    /// A parameter failed its syntax or range check.
    #[error("Invalid value for {parameter}: {message}")]
    InvalidParameterValue {
        /// Name of the offending parameter.
        parameter: String,
        /// Human-readable error description.
        message: String,
    },

    /// The external tool binary could not be located.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The external tool exceeded its time limit and was killed.
    #[error("Tool [{tool}] timed out after {secs:.1}s")]
    Timeout {
        /// Name of the tool that was killed.
        tool: String,
        /// Configured limit in seconds.
        secs: f64,
    },

    /// The external tool exited unsuccessfully.
    #[error("Tool [{tool}] exited with code {code:?}: {stderr}")]
    NonZeroExit {
        /// Name of the tool that failed.
        tool: String,
        /// Exit code, absent when killed by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// Fetching or extracting a documentation page failed.
    #[error("Documentation fetch failed [{source_name}]: {message}")]
    DocumentationFetch {
        /// `category:name` of the page, or the URL.
        source_name: String,
        /// Human-readable error description.
        message: String,
    },

    /// A documentation category or page name is not in the catalog.
    #[error("Unknown documentation {kind}: {name} (available: {available})")]
    UnknownDocumentation {
        /// "category" or "service".
        kind: &'static str,
        /// The name that was looked up.
        name: String,
        /// Comma-separated list of valid names.
        available: String,
    },

    /// Configuration could not be parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Stable snake_case identifier for this error's kind.
    pub fn code(&self) -> &'static str {
        match self {
            Error::UnknownOperation(_) => "unknown_operation",
            Error::MissingParameter { .. } => "missing_parameter",
            Error::InvalidParameterValue { .. } => "invalid_parameter_value",
            Error::ToolNotFound(_) => "tool_not_found",
            Error::Timeout { .. } => "timeout",
            Error::NonZeroExit { .. } => "non_zero_exit",
            Error::DocumentationFetch { .. } => "documentation_fetch_error",
            Error::UnknownDocumentation { .. } => "unknown_documentation",
            Error::Config(_) => "config",
            Error::Io { .. } => "io",
        }
    }

    /// Whether the error was raised before any process could be spawned
    /// because the request itself is wrong.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownOperation(_)
                | Error::MissingParameter { .. }
                | Error::InvalidParameterValue { .. }
        )
    }

    /// Convenience constructor for [`Error::MissingParameter`].
    pub fn missing(operation: impl Into<String>, parameter: impl Into<String>) -> Self {
        Error::MissingParameter {
            operation: operation.into(),
            parameter: parameter.into(),
        }
    }

    /// Convenience constructor for [`Error::InvalidParameterValue`].
    pub fn invalid(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidParameterValue {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::DocumentationFetch`].
    pub fn fetch(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DocumentationFetch {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
