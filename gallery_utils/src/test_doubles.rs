//! In-memory stand-ins for `file`, `sips` and `magick`.
//!
//! The fake inspector treats a file's own bytes as its signature, so a test
//! writes `"ISO Media, HEIF Image HEVC"` into `photo.jpg` to make it HEIF.

use crate::app_error::{AppError, Result};
use crate::classifier::ContentInspector;
use crate::transcoder::{OptimizeParams, TargetFormat, Transcoder};
use crate::logging::console_layer;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;

pub const HEIF_SIGNATURE: &str = "ISO Media, HEIF Image HEVC Main or Main Still Picture Profile";
pub const JPEG_SIGNATURE: &str = "JPEG image data, JFIF standard 1.01";
pub const PNG_SIGNATURE: &str = "PNG image data, 640 x 480, 8-bit/color RGB";
/// Files starting with this make the fake inspector fail.
pub const UNREADABLE_SIGNATURE: &str = "!unreadable";

#[derive(Debug, Default)]
pub struct FakeInspector {
    pub calls: RefCell<Vec<PathBuf>>,
}

impl ContentInspector for FakeInspector {
    fn describe(&self, path: &Path) -> Result<String> {
        self.calls.borrow_mut().push(path.to_path_buf());
        let bytes = fs::read(path).map_err(|e| AppError::io(path, e))?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        if text.starts_with(UNREADABLE_SIGNATURE) {
            return Err(AppError::classification(path, "inspector crashed"));
        }
        Ok(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Convert { input: PathBuf, output: PathBuf },
    Optimize { input: PathBuf, output: PathBuf },
}

/// Fails any job whose input file name contains `fail_marker`.
#[derive(Debug)]
pub struct FakeTranscoder {
    pub calls: RefCell<Vec<Call>>,
    pub fail_marker: String,
    /// Bytes written to the optimizer's output.
    pub optimized_len: usize,
    /// On a failing optimize, write a partial output before failing.
    pub leave_partial_output: bool,
}

impl Default for FakeTranscoder {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_marker: "broken".to_string(),
            optimized_len: 1024,
            leave_partial_output: false,
        }
    }
}

impl FakeTranscoder {
    fn should_fail(&self, input: &Path) -> bool {
        input
            .file_name()
            .map(|n| n.to_string_lossy().contains(&self.fail_marker))
            .unwrap_or(false)
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Transcoder for FakeTranscoder {
    fn name(&self) -> &str {
        "fake"
    }

    fn convert(&self, input: &Path, output: &Path, _format: TargetFormat) -> Result<()> {
        self.calls.borrow_mut().push(Call::Convert {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
        if self.should_fail(input) {
            return Err(AppError::conversion(input, "fake: cannot decode input"));
        }
        fs::write(output, JPEG_SIGNATURE).map_err(|e| AppError::io(output, e))
    }

    fn optimize(&self, input: &Path, output: &Path, _params: &OptimizeParams) -> Result<()> {
        self.calls.borrow_mut().push(Call::Optimize {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
        });
        if self.should_fail(input) {
            if self.leave_partial_output {
                fs::write(output, b"partial").map_err(|e| AppError::io(output, e))?;
            }
            return Err(AppError::conversion(input, "fake: resize failed"));
        }
        fs::write(output, vec![0xFFu8; self.optimized_len]).map_err(|e| AppError::io(output, e))
    }
}

#[derive(Debug, Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Console output produced while `f` runs, exactly as the tools print it.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber =
        tracing_subscriber::registry().with(console_layer(move || writer.clone(), false));
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// `path` spelled relative to the working directory, through `..` hops.
#[cfg(unix)]
pub fn relative_from_cwd(path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let mut relative = PathBuf::new();
    for _ in cwd.components().skip(1) {
        relative.push("..");
    }
    relative.join(path.strip_prefix("/").unwrap())
}
