//! External image transcoders
//!
//! Decoding, resizing and re-encoding are never done in-process; a
//! `Transcoder` hands each job to an OS tool and reports its diagnostics
//! when it fails.

use crate::app_error::{AppError, Result};
use crate::logging::execute_external_command;
use serde::Serialize;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetFormat {
    Jpeg,
}

impl TargetFormat {
    /// Extension written on converted outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpg",
        }
    }

    fn tool_name(&self) -> &'static str {
        match self {
            TargetFormat::Jpeg => "jpeg",
        }
    }
}

/// Resize/recompress parameters for the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptimizeParams {
    /// Longest edge in pixels, aspect ratio preserved.
    pub max_dimension: u32,
    /// JPEG quality percentage (1..=100).
    pub quality: u8,
}

impl Default for OptimizeParams {
    fn default() -> Self {
        Self {
            max_dimension: 1200,
            quality: 80,
        }
    }
}

pub trait Transcoder {
    fn name(&self) -> &str;

    /// Write `input` re-encoded as `format` to `output`.
    fn convert(&self, input: &Path, output: &Path, format: TargetFormat) -> Result<()>;

    /// Write a resized, recompressed copy of `input` to `output`.
    fn optimize(&self, input: &Path, output: &Path, params: &OptimizeParams) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// macOS Scriptable Image Processing System
    #[default]
    Sips,
    /// ImageMagick 7
    Magick,
}

impl Backend {
    pub fn transcoder(self) -> Box<dyn Transcoder> {
        match self {
            Backend::Sips => Box::new(SipsTranscoder),
            Backend::Magick => Box::new(MagickTranscoder),
        }
    }

    pub fn tool_name(self) -> &'static str {
        match self {
            Backend::Sips => SipsTranscoder::TOOL,
            Backend::Magick => MagickTranscoder::TOOL,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sips" => Ok(Backend::Sips),
            "magick" | "imagemagick" => Ok(Backend::Magick),
            other => Err(format!("unknown backend '{}' (expected sips or magick)", other)),
        }
    }
}

/// Resolve `tool` on PATH, run it, and map failures onto `AppError`.
fn run_tool(tool: &str, args: &[OsString], input: &Path) -> Result<()> {
    let program = which::which(tool).map_err(|_| AppError::ToolNotFound {
        tool_name: tool.to_string(),
    })?;

    let args: Vec<&OsStr> = args.iter().map(OsString::as_os_str).collect();
    let result = execute_external_command(&program, &args)
        .map_err(|e| AppError::conversion(input, format!("failed to run {}: {}", tool, e)))?;

    if result.success() {
        return Ok(());
    }

    let diagnostics = result.diagnostics();
    let message = match result.exit_code {
        Some(code) if diagnostics.is_empty() => format!("{} exited with status {}", tool, code),
        Some(code) => format!("{} exited with status {}: {}", tool, code, diagnostics),
        None => format!("{} was terminated by a signal: {}", tool, diagnostics),
    };
    Err(AppError::conversion(input, message))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SipsTranscoder;

impl SipsTranscoder {
    pub const TOOL: &'static str = "sips";

    fn convert_args(input: &Path, output: &Path, format: TargetFormat) -> Vec<OsString> {
        vec![
            "-s".into(),
            "format".into(),
            format.tool_name().into(),
            input.into(),
            "--out".into(),
            output.into(),
        ]
    }

    fn optimize_args(input: &Path, output: &Path, params: &OptimizeParams) -> Vec<OsString> {
        vec![
            "-Z".into(),
            params.max_dimension.to_string().into(),
            "-s".into(),
            "formatOptions".into(),
            params.quality.to_string().into(),
            input.into(),
            "--out".into(),
            output.into(),
        ]
    }
}

impl Transcoder for SipsTranscoder {
    fn name(&self) -> &str {
        Self::TOOL
    }

    fn convert(&self, input: &Path, output: &Path, format: TargetFormat) -> Result<()> {
        run_tool(Self::TOOL, &Self::convert_args(input, output, format), input)
    }

    fn optimize(&self, input: &Path, output: &Path, params: &OptimizeParams) -> Result<()> {
        run_tool(Self::TOOL, &Self::optimize_args(input, output, params), input)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MagickTranscoder;

impl MagickTranscoder {
    pub const TOOL: &'static str = "magick";

    /// `jpeg:<path>` forces the encoder regardless of the output extension.
    fn coded_output(output: &Path, format: TargetFormat) -> OsString {
        let mut coded = OsString::from(format!("{}:", format.tool_name()));
        coded.push(output.as_os_str());
        coded
    }

    fn convert_args(input: &Path, output: &Path, format: TargetFormat) -> Vec<OsString> {
        vec![input.into(), Self::coded_output(output, format)]
    }

    fn optimize_args(input: &Path, output: &Path, params: &OptimizeParams) -> Vec<OsString> {
        vec![
            input.into(),
            "-resize".into(),
            format!("{0}x{0}>", params.max_dimension).into(),
            "-quality".into(),
            params.quality.to_string().into(),
            Self::coded_output(output, TargetFormat::Jpeg),
        ]
    }
}

impl Transcoder for MagickTranscoder {
    fn name(&self) -> &str {
        Self::TOOL
    }

    fn convert(&self, input: &Path, output: &Path, format: TargetFormat) -> Result<()> {
        run_tool(Self::TOOL, &Self::convert_args(input, output, format), input)
    }

    fn optimize(&self, input: &Path, output: &Path, params: &OptimizeParams) -> Result<()> {
        run_tool(Self::TOOL, &Self::optimize_args(input, output, params), input)
    }
}
