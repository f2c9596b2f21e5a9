//! Build orchestration errors
//!
//! Every phase of the orchestration reports failures through [`BuildError`].
//! None of them are retried: the first error aborts the whole run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the library
pub type Result<T> = std::result::Result<T, BuildError>;

/// External build step that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// `cmake <flags> ..`
    Configure,
    /// `cmake --build . --target <target>`
    Build,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => f.write_str("configure"),
            Self::Build => f.write_str("build"),
        }
    }
}

/// Errors that abort the orchestration
#[derive(Debug, Error)]
pub enum BuildError {
    /// The external build tool could not be invoked at all
    #[error("CMake must be installed to build RLQP (tried {}): {reason}", tool.display())]
    ToolUnavailable { tool: PathBuf, reason: String },

    /// An optional dependency was needed but could not be located
    #[error("optional dependency {name} is not available: {reason}")]
    OptionalDependencyMissing { name: String, reason: String },

    /// Configure or build step exited unsuccessfully
    #[error("CMake {step} step failed with {}\n{output}", exit_code_text(*code))]
    ExternalBuildFailure {
        step: BuildStep,
        code: Option<i32>,
        output: String,
    },

    /// Deleting, creating or copying inside a staging tree failed
    #[error("staging failed at {}: {source}", path.display())]
    FilesystemStaging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The external build reported success but produced no artifact
    #[error("static library not found at {}", path.display())]
    ArtifactMissing { path: PathBuf },

    /// The package manifest could not be rendered as JSON
    #[error("failed to serialize package manifest")]
    ManifestSerialization(#[from] serde_json::Error),

    /// The configuration file could not be read or parsed
    #[error("invalid configuration in {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },
}

impl BuildError {
    /// Wrap an I/O error raised while touching `path` during staging
    pub fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemStaging {
            path: path.into(),
            source,
        }
    }

    /// Build a missing-dependency error
    pub fn missing(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OptionalDependencyMissing {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

fn exit_code_text(code: Option<i32>) -> String {
    code.map_or_else(
        || "no exit code (terminated by signal)".to_string(),
        |c| format!("exit code {c}"),
    )
}
