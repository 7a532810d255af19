//! AppError - unified error type for the gallery tools
//!
//! Every per-file failure in a batch is one of these variants. The batch
//! loop records them and moves on; only errors raised before the loop
//! starts (listing the root, safety checks) reach `main`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Classification failed for {}: {message}", path.display())]
    Classification { path: PathBuf, message: String },

    #[error("Conversion failed for {}: {message}", path.display())]
    Conversion { path: PathBuf, message: String },

    #[error("Tool not found: {tool_name} (please ensure it is installed and in PATH)")]
    ToolNotFound { tool_name: String },

    #[error("Refusing to modify protected directory: {}", path.display())]
    ProtectedDirectory { path: PathBuf },
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn classification(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Classification {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn conversion(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        AppError::Conversion {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Short text used in log lines and the failure list, without the
    /// path prefix the `Display` impl carries.
    pub fn short_message(&self) -> String {
        match self {
            AppError::Io { source, .. } => source.to_string(),
            AppError::Classification { message, .. } | AppError::Conversion { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
