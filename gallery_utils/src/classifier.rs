//! Content classification
//!
//! Decides from a file's bytes, not its name, whether it is HEIF/HEVC data
//! or already a proper JPEG. The bytes are described by an external
//! inspector (`file -b`); this module only interprets the description.

use crate::app_error::{AppError, Result};
use crate::logging::execute_external_command;
use serde::Serialize;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Produces a human-readable signature of a file's real format.
pub trait ContentInspector {
    fn describe(&self, path: &Path) -> Result<String>;
}

/// Runs `file -b <path>`. Brief mode keeps the file name out of the output.
#[derive(Debug, Clone)]
pub struct FileCommandInspector {
    program: PathBuf,
}

impl FileCommandInspector {
    pub const TOOL: &'static str = "file";

    pub fn new() -> Self {
        Self {
            program: PathBuf::from(Self::TOOL),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FileCommandInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentInspector for FileCommandInspector {
    fn describe(&self, path: &Path) -> Result<String> {
        let program = which::which(&self.program).map_err(|_| AppError::ToolNotFound {
            tool_name: self.program.display().to_string(),
        })?;

        let result = execute_external_command(&program, &[OsStr::new("-b"), path.as_os_str()])
            .map_err(|e| AppError::classification(path, format!("failed to run file: {}", e)))?;

        if !result.success() {
            return Err(AppError::classification(
                path,
                format!(
                    "file exited with {:?}: {}",
                    result.exit_code,
                    result.diagnostics()
                ),
            ));
        }

        Ok(result.stdout)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_heif: bool,
    pub is_jpeg: bool,
    pub signature: String,
}

impl Classification {
    /// Real JPEG data with no HEIF content: nothing to convert.
    pub fn is_already_jpeg(&self) -> bool {
        self.is_jpeg && !self.is_heif
    }
}

/// Interpret an inspector signature. Empty output cannot be classified.
pub fn parse_signature(path: &Path, signature: &str) -> Result<Classification> {
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(AppError::classification(path, "inspector returned no signature"));
    }

    Ok(Classification {
        is_heif: signature.contains("HEIF") || signature.contains("HEVC"),
        is_jpeg: signature.contains("JFIF") || signature.contains("JPEG image data"),
        signature: signature.to_string(),
    })
}

pub fn classify(inspector: &dyn ContentInspector, path: &Path) -> Result<Classification> {
    let signature = inspector.describe(path)?;
    parse_signature(path, &signature)
}
