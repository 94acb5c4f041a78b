use std::path::PathBuf;

use thiserror::Error;

/// Every way a launch can fail. Each stage aborts the pipeline; re-running
/// after fixing the cause is the retry mechanism.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error("target script '{}' does not exist or is not a regular file", path.display())]
    MissingTarget { path: PathBuf },

    #[error("cannot enter directory '{}': {source}", path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create virtual environment at '{}': {reason}", path.display())]
    EnvironmentCreation {
        path: PathBuf,
        code: Option<i32>,
        reason: String,
    },

    #[error("failed to install dependencies: {reason}")]
    DependencyInstall { code: Option<i32>, reason: String },

    #[error("dashboard runner failed: {reason}")]
    Launch { code: Option<i32>, reason: String },

    #[error("cannot remove '{}': {reason}", path.display())]
    Cleanup { path: PathBuf, reason: String },

    #[error("cannot encode status report: {source}")]
    Report {
        #[source]
        source: serde_json::Error,
    },
}

impl LauncherError {
    /// Process exit code for this failure. Sub-process failures keep the
    /// child's code when it is a meaningful non-zero value.
    pub fn exit_code(&self) -> i32 {
        match self {
            LauncherError::MissingTarget { .. }
            | LauncherError::DirectoryAccess { .. }
            | LauncherError::Cleanup { .. }
            | LauncherError::Report { .. } => 1,
            LauncherError::EnvironmentCreation { code, .. }
            | LauncherError::DependencyInstall { code, .. }
            | LauncherError::Launch { code, .. } => match code {
                Some(c) if *c != 0 => *c,
                _ => 1,
            },
        }
    }
}
