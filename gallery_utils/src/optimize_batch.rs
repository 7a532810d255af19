//! Optimization batch
//!
//! Shrinks oversized JPEGs in place: resize + recompress into
//! `temp_<name>` beside the original, confirm the result, then rename it
//! over the original. The original is untouched until the rename.

use crate::app_error::{AppError, Result};
use crate::batch::{is_jpg_name, walk_files};
use crate::conversion::{ConversionOutcome, RunReport, SkipReason};
use crate::report::format_mb;
use crate::safety::check_dangerous_directory;
use crate::transcoder::{OptimizeParams, Transcoder};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const OPTIMIZE_TAG: &str = "optimize";
pub const DEFAULT_OPTIMIZE_ROOT: &str = "public/images";
/// Files smaller than this are left alone (500 KiB).
pub const DEFAULT_SIZE_THRESHOLD: u64 = 500 * 1024;
pub const TEMP_PREFIX: &str = "temp_";

#[derive(Debug, Clone)]
pub struct OptimizeConfig {
    pub root: PathBuf,
    pub threshold: u64,
    pub params: OptimizeParams,
    /// Descend into subdirectories; only the top level otherwise.
    pub recursive: bool,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_OPTIMIZE_ROOT),
            threshold: DEFAULT_SIZE_THRESHOLD,
            params: OptimizeParams::default(),
            recursive: false,
        }
    }
}

pub fn temp_path_for(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}{}", TEMP_PREFIX, name))
}

pub fn should_optimize(size: u64, threshold: u64) -> bool {
    size >= threshold
}

pub fn run_optimize(config: &OptimizeConfig, transcoder: &dyn Transcoder) -> Result<RunReport> {
    check_dangerous_directory(&config.root)?;

    let shown_root = std::path::absolute(&config.root).unwrap_or_else(|_| config.root.clone());
    info!(
        "[{}] Processing images in: {}",
        OPTIMIZE_TAG,
        shown_root.display()
    );

    let depth = if config.recursive { None } else { Some(1) };
    let files: Vec<PathBuf> = walk_files(&config.root, depth)?
        .into_iter()
        .filter(|p| is_jpg_name(p))
        .collect();

    let mut report = RunReport::new(OPTIMIZE_TAG, &config.root);

    if files.is_empty() {
        info!("[{}] No JPG files found.", OPTIMIZE_TAG);
        return Ok(report);
    }

    for input in &files {
        report.record(optimize_file(input, config, transcoder));
    }

    info!(
        "[{}] Done. Optimized {} file(s).",
        OPTIMIZE_TAG,
        report.converted_count()
    );

    Ok(report)
}

pub fn optimize_file(
    input: &Path,
    config: &OptimizeConfig,
    transcoder: &dyn Transcoder,
) -> ConversionOutcome {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = temp_path_for(input);

    let before = match fs::metadata(input) {
        Ok(meta) => meta.len(),
        Err(e) => {
            error!("[{}] Failed: {} {}", OPTIMIZE_TAG, name, e);
            return ConversionOutcome::failed(input, input, e.to_string());
        }
    };

    if !should_optimize(before, config.threshold) {
        info!(
            "[{}] Skip (already small): {} ({})",
            OPTIMIZE_TAG,
            name,
            format_mb(before)
        );
        return ConversionOutcome::skipped(input, input, SkipReason::AlreadySmall)
            .with_sizes(Some(before), None);
    }

    info!("[{}] Processing: {} ({})", OPTIMIZE_TAG, name, format_mb(before));

    match replace_with_optimized(input, &temp, &config.params, transcoder) {
        Ok(after) => {
            info!(
                "[{}] ✓ {}: {} → {} (saved {})",
                OPTIMIZE_TAG,
                name,
                format_mb(before),
                format_mb(after),
                format_mb(before.saturating_sub(after))
            );
            ConversionOutcome::converted(input, input).with_sizes(Some(before), Some(after))
        }
        Err(e) => {
            error!("[{}] Failed: {} {}", OPTIMIZE_TAG, name, e.short_message());
            remove_temp(&temp);
            ConversionOutcome::failed(input, input, e.short_message())
                .with_sizes(Some(before), None)
        }
    }
}

/// Returns the optimized size. `input` is only replaced once `temp` exists
/// and is non-empty.
fn replace_with_optimized(
    input: &Path,
    temp: &Path,
    params: &OptimizeParams,
    transcoder: &dyn Transcoder,
) -> Result<u64> {
    transcoder.optimize(input, temp, params)?;

    let after = fs::metadata(temp)
        .map_err(|e| AppError::io(temp, e))?
        .len();
    if after == 0 {
        return Err(AppError::conversion(
            input,
            format!("{} produced an empty file", transcoder.name()),
        ));
    }

    fs::rename(temp, input).map_err(|e| AppError::io(input, e))?;
    Ok(after)
}

/// Best-effort cleanup. A failed delete is reported, not raised.
fn remove_temp(temp: &Path) {
    match fs::remove_file(temp) {
        Ok(()) => debug!(path = %temp.display(), "Removed temporary file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            "[{}] Could not remove temporary file {}: {}",
            OPTIMIZE_TAG,
            temp.display(),
            e
        ),
    }
}
