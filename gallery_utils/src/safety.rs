//! Safety Module
//!
//! The optimizer overwrites originals, so it refuses to run on system
//! directories or directly on a home directory.

use crate::app_error::{AppError, Result};
use std::path::Path;

const DANGEROUS_DIRS: &[&str] = &[
    "/",
    "/System",
    "/usr",
    "/bin",
    "/sbin",
    "/etc",
    "/var",
    "/private",
    "/Library",
    "/Applications",
    "/Users",
    "/home",
    "/root",
    "/boot",
    "/dev",
    "/proc",
    "/sys",
    "/tmp",
    "/opt",
];

pub fn check_dangerous_directory(path: &Path) -> Result<()> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let path_str = canonical.to_string_lossy();

    if DANGEROUS_DIRS.iter().any(|d| path_str == *d) {
        return Err(AppError::ProtectedDirectory {
            path: path.to_path_buf(),
        });
    }

    // /home/<user> and /Users/<user> themselves
    let depth = canonical.components().count();
    if depth <= 3 && (path_str.starts_with("/Users/") || path_str.starts_with("/home/")) {
        return Err(AppError::ProtectedDirectory {
            path: path.to_path_buf(),
        });
    }

    Ok(())
}
