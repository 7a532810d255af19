//! Batch Processing Module
//!
//! Directory walking, candidate filtering and the run-level tally.

use crate::app_error::{AppError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions `jpg-convert` accepts. Only the all-lower and all-upper
/// spellings are recognized.
pub const CONVERT_INPUT_EXTENSIONS: &[&str] =
    &["heic", "HEIC", "png", "PNG", "jpeg", "JPEG", "jpg", "JPG"];

/// Recursively list every non-directory entry under `root` as an absolute
/// path. Symlinks are listed, not followed.
///
/// `max_depth` of `Some(1)` lists only the root's direct children.
pub fn walk_files(root: &Path, max_depth: Option<usize>) -> Result<Vec<PathBuf>> {
    let root = std::path::absolute(root).map_err(|e| AppError::io(root, e))?;

    let mut walker = WalkDir::new(&root).sort_by_file_name();
    if let Some(depth) = max_depth {
        walker = walker.max_depth(depth);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
            let source = e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
            AppError::io(path, source)
        })?;

        if !entry.file_type().is_dir() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Exact (case-sensitive) extension match against `extensions`.
pub fn has_exact_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e))
        .unwrap_or(false)
}

/// Optimizer candidates: the lower-cased file name ends with `.jpg`.
pub fn is_jpg_name(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(".jpg"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunTally {
    pub total: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub errors: Vec<(PathBuf, String)>,
}

impl RunTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn converted(&mut self) {
        self.total += 1;
        self.converted += 1;
    }

    pub fn fail(&mut self, path: PathBuf, error: String) {
        self.total += 1;
        self.failed += 1;
        self.errors.push((path, error));
    }

    pub fn skip(&mut self) {
        self.total += 1;
        self.skipped += 1;
    }
}
