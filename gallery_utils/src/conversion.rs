//! Per-file outcomes and the run report.

use crate::batch::RunTally;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Content is already JPEG and not HEIF.
    AlreadyJpeg,
    /// Output exists and is at least as new as the input.
    UpToDate,
    /// Below the optimizer's size threshold.
    AlreadySmall,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyJpeg => write!(f, "already JPEG"),
            SkipReason::UpToDate => write!(f, "up-to-date"),
            SkipReason::AlreadySmall => write!(f, "already small"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Converted,
    Skipped { reason: SkipReason },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub status: OutcomeStatus,
    /// Input size in bytes, when it was read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_size: Option<u64>,
    /// Output size in bytes for optimized files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_size: Option<u64>,
}

impl ConversionOutcome {
    pub fn converted(input: &Path, output: &Path) -> Self {
        Self::new(input, output, OutcomeStatus::Converted)
    }

    pub fn skipped(input: &Path, output: &Path, reason: SkipReason) -> Self {
        Self::new(input, output, OutcomeStatus::Skipped { reason })
    }

    pub fn failed(input: &Path, output: &Path, error: impl Into<String>) -> Self {
        Self::new(
            input,
            output,
            OutcomeStatus::Failed {
                error: error.into(),
            },
        )
    }

    pub fn with_sizes(mut self, input_size: Option<u64>, output_size: Option<u64>) -> Self {
        self.input_size = input_size;
        self.output_size = output_size;
        self
    }

    fn new(input: &Path, output: &Path, status: OutcomeStatus) -> Self {
        Self {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            status,
            input_size: None,
            output_size: None,
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.status, OutcomeStatus::Converted)
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.status {
            OutcomeStatus::Skipped { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Everything one batch produced, in processing order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub tag: String,
    pub root: PathBuf,
    pub outcomes: Vec<ConversionOutcome>,
    pub tally: RunTally,
}

impl RunReport {
    pub fn new(tag: &str, root: &Path) -> Self {
        Self {
            tag: tag.to_string(),
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: ConversionOutcome) {
        match &outcome.status {
            OutcomeStatus::Converted => self.tally.converted(),
            OutcomeStatus::Skipped { .. } => self.tally.skip(),
            OutcomeStatus::Failed { error } => {
                self.tally.fail(outcome.input.clone(), error.clone())
            }
        }
        self.outcomes.push(outcome);
    }

    pub fn converted_count(&self) -> usize {
        self.tally.converted
    }
}
