//! Conversion batch
//!
//! Walks the asset tree and turns every HEIC/PNG/mislabeled image into a
//! real JPEG next to it. Per file, first match wins:
//!
//! 1. content is JPEG and not HEIF → skip (already JPEG)
//! 2. not HEIF and `<stem>.jpg` is at least as new → skip (up to date)
//! 3. otherwise convert
//!
//! HEIF content never takes the freshness shortcut: a HEIF file saved under
//! a `.jpg` name has itself as output and would always look fresh.

use crate::app_error::Result;
use crate::batch::{has_exact_extension, walk_files, CONVERT_INPUT_EXTENSIONS};
use crate::classifier::{classify, ContentInspector};
use crate::conversion::{ConversionOutcome, RunReport, SkipReason};
use crate::freshness::is_up_to_date;
use crate::transcoder::{TargetFormat, Transcoder};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

pub const CONVERT_TAG: &str = "convert";
pub const DEFAULT_CONVERT_ROOT: &str = "src/assets/xibao";

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub root: PathBuf,
    pub format: TargetFormat,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_CONVERT_ROOT),
            format: TargetFormat::Jpeg,
        }
    }
}

/// `<dir>/<stem>.<format extension>`
pub fn output_path_for(input: &Path, format: TargetFormat) -> PathBuf {
    input.with_extension(format.extension())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run the whole batch. Only a failure to list `config.root` is returned as
/// an error; per-file failures end up in the report.
pub fn run_convert(
    config: &ConvertConfig,
    inspector: &dyn ContentInspector,
    transcoder: &dyn Transcoder,
) -> Result<RunReport> {
    let shown_root = std::path::absolute(&config.root).unwrap_or_else(|_| config.root.clone());
    info!("[{}] Scanning: {}", CONVERT_TAG, shown_root.display());

    let targets: Vec<PathBuf> = walk_files(&config.root, None)?
        .into_iter()
        .filter(|p| has_exact_extension(p, CONVERT_INPUT_EXTENSIONS))
        .collect();

    let mut report = RunReport::new(CONVERT_TAG, &config.root);

    if targets.is_empty() {
        info!("[{}] No images needing conversion found.", CONVERT_TAG);
        return Ok(report);
    }

    debug!(
        count = targets.len(),
        backend = transcoder.name(),
        "Conversion candidates collected"
    );

    for input in &targets {
        report.record(convert_file(input, config.format, inspector, transcoder));
    }

    info!(
        "[{}] Done. Converted {} file(s).",
        CONVERT_TAG,
        report.converted_count()
    );

    Ok(report)
}

/// Decide and act on one file. Never fails; errors become `Failed` outcomes.
pub fn convert_file(
    input: &Path,
    format: TargetFormat,
    inspector: &dyn ContentInspector,
    transcoder: &dyn Transcoder,
) -> ConversionOutcome {
    let output = output_path_for(input, format);

    let classification = match classify(inspector, input) {
        Ok(c) => c,
        Err(e) => {
            error!("[{}] Failed: {} {}", CONVERT_TAG, input.display(), e.short_message());
            return ConversionOutcome::failed(input, &output, e.short_message());
        }
    };
    debug!(
        file = %input.display(),
        signature = %classification.signature,
        is_heif = classification.is_heif,
        is_jpeg = classification.is_jpeg,
        "Classified"
    );

    if classification.is_already_jpeg() {
        info!("[{}] Skip (already JPEG): {}", CONVERT_TAG, file_name(input));
        return ConversionOutcome::skipped(input, &output, SkipReason::AlreadyJpeg);
    }

    if !classification.is_heif && is_up_to_date(input, &output) {
        info!("[{}] Skip up-to-date: {}", CONVERT_TAG, file_name(&output));
        return ConversionOutcome::skipped(input, &output, SkipReason::UpToDate);
    }

    info!(
        "[{}] {} -> {}{}",
        CONVERT_TAG,
        file_name(input),
        file_name(&output),
        if classification.is_heif {
            " (HEIF->JPEG)"
        } else {
            ""
        }
    );

    match transcoder.convert(input, &output, format) {
        Ok(()) => ConversionOutcome::converted(input, &output),
        Err(e) => {
            error!("[{}] Failed: {} {}", CONVERT_TAG, input.display(), e.short_message());
            ConversionOutcome::failed(input, &output, e.short_message())
        }
    }
}
