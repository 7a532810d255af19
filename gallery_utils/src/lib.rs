//! Shared pipeline for the gallery image tools
//!
//! - Directory walking and candidate filtering
//! - Content classification through an external inspector (`file`)
//! - Output freshness checks
//! - External transcoders (`sips`, ImageMagick)
//! - The conversion and optimization batches
//! - Logging, reporting and safety checks

pub mod app_error;
pub mod batch;
pub mod classifier;
pub mod conversion;
pub mod convert_batch;
pub mod freshness;
pub mod logging;
pub mod optimize_batch;
pub mod report;
pub mod safety;
pub mod transcoder;

#[cfg(test)]
pub(crate) mod test_doubles;

pub use app_error::AppError;
pub use batch::{walk_files, RunTally, CONVERT_INPUT_EXTENSIONS};
pub use classifier::{classify, Classification, ContentInspector, FileCommandInspector};
pub use conversion::{ConversionOutcome, OutcomeStatus, RunReport, SkipReason};
pub use convert_batch::{run_convert, ConvertConfig, CONVERT_TAG, DEFAULT_CONVERT_ROOT};
pub use freshness::is_up_to_date;
pub use optimize_batch::{
    run_optimize, OptimizeConfig, DEFAULT_OPTIMIZE_ROOT, DEFAULT_SIZE_THRESHOLD, OPTIMIZE_TAG,
};
pub use report::{print_summary_report, report_to_json};
pub use safety::check_dangerous_directory;
pub use transcoder::{
    Backend, MagickTranscoder, OptimizeParams, SipsTranscoder, TargetFormat, Transcoder,
};
