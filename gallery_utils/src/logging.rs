//! Logging Module
//!
//! tracing-based logging shared by both tools:
//! - console output on stderr (the `[convert]` / `[optimize]` lines)
//! - a daily-rolling log file in the system temp directory
//! - detailed records of every external tool invocation
//!
//! # Examples
//!
//! ```no_run
//! use gallery_utils::logging::{LogConfig, init_logging};
//! use tracing::info;
//!
//! init_logging("jpg_convert", LogConfig::default()).expect("Failed to initialize logging");
//! info!("[convert] Scanning: src/assets/xibao");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};
use tracing::{Level, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for log files (system temp dir by default)
    pub log_dir: PathBuf,
    /// Number of log files kept per program
    pub max_files: usize,
    pub level: Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir(),
            max_files: 5,
            level: Level::INFO,
        }
    }
}

impl LogConfig {
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// `Level::DEBUG` when verbose, `Level::INFO` otherwise.
    pub fn verbose(self, verbose: bool) -> Self {
        self.with_level(if verbose { Level::DEBUG } else { Level::INFO })
    }
}

/// Install the global subscriber. Log file prefix: `{program_name}.log`.
///
/// `RUST_LOG` takes precedence over `config.level` when set. The console
/// layer is always installed; if the log file cannot be opened the run
/// continues without it and a warning says why.
pub fn init_logging(program_name: &str, config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let (file_appender, file_error) = match open_log_file(program_name, &config.log_dir) {
        Ok(appender) => (Some(appender), None),
        Err(e) => (None, Some(e)),
    };

    let file_layer = file_appender.map(|appender| {
        fmt::layer()
            .with_writer(appender)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer(std::io::stderr, true))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(e) = file_error {
        tracing::warn!("Log file disabled: {:#}", e);
        return Ok(());
    }

    tracing::debug!(
        program = program_name,
        log_dir = ?config.log_dir,
        level = ?config.level,
        "Logging system initialized"
    );

    if let Err(e) = cleanup_old_logs(&config.log_dir, program_name, config.max_files) {
        tracing::warn!("Log cleanup skipped: {:#}", e);
    }

    Ok(())
}

/// Daily-rolling appender writing `{program_name}.log.<date>` in `log_dir`.
fn open_log_file(program_name: &str, log_dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(format!("{}.log", program_name))
        .build(log_dir)
        .with_context(|| format!("Failed to open log file in {:?}", log_dir))
}

/// Console output: the bare message, no level, target or timestamp, so each
/// line starts with its run tag.
pub fn console_layer<S, W>(writer: W, ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .with_level(false)
        .without_time()
}

/// Delete all but the newest `max_files` logs belonging to `program_name`.
fn cleanup_old_logs(log_dir: &Path, program_name: &str, max_files: usize) -> Result<()> {
    use std::fs;

    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();

    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let Some(file_name) = path.file_name() else {
            continue;
        };
        let file_name = file_name.to_string_lossy();
        if file_name.starts_with(program_name) && file_name.contains(".log") {
            if let Ok(modified) = fs::metadata(&path).and_then(|m| m.modified()) {
                log_files.push((path, modified));
            }
        }
    }

    if log_files.len() > max_files {
        log_files.sort_by(|a, b| b.1.cmp(&a.1));

        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to remove old log file");
            } else {
                tracing::debug!(path = ?path, "Removed old log file");
            }
        }
    }

    Ok(())
}

/// Result of one external command.
#[derive(Debug)]
pub struct ExternalCommandResult {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ExternalCommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stderr if there is any, stdout otherwise; what a failed tool said.
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Run `program` with `args`, blocking until it exits, and log the call.
///
/// Returns `Err` only when the process could not be spawned; a non-zero
/// exit is reported through `exit_code`.
pub fn execute_external_command(
    program: &Path,
    args: &[&std::ffi::OsStr],
) -> std::io::Result<ExternalCommandResult> {
    let command_str = format_command_string(program, args);
    tracing::debug!(command = %command_str, "Executing external command");

    let start_time = Instant::now();
    let output = Command::new(program).args(args).output()?;
    let duration = start_time.elapsed();

    let result = ExternalCommandResult {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        duration,
    };

    log_external_tool(&command_str, &result);
    Ok(result)
}

fn log_external_tool(command: &str, result: &ExternalCommandResult) {
    match result.exit_code {
        Some(0) => {
            tracing::debug!(
                command = %command,
                duration_secs = result.duration.as_secs_f64(),
                exit_code = 0,
                "External tool completed successfully"
            );
        }
        Some(code) => {
            tracing::debug!(
                command = %command,
                duration_secs = result.duration.as_secs_f64(),
                exit_code = code,
                stderr = %result.stderr,
                "External tool failed"
            );
        }
        None => {
            tracing::debug!(
                command = %command,
                duration_secs = result.duration.as_secs_f64(),
                stderr = %result.stderr,
                "External tool terminated without exit code"
            );
        }
    }
}

pub fn format_command_string(program: &Path, args: &[&std::ffi::OsStr]) -> String {
    let mut command = program.display().to_string();
    for arg in args {
        command.push(' ');
        command.push_str(&arg.to_string_lossy());
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.max_files, 5);
        assert_eq!(config.level, Level::INFO);
    }

    #[test]
    fn test_log_config_verbose() {
        assert_eq!(LogConfig::default().verbose(true).level, Level::DEBUG);
        assert_eq!(LogConfig::default().verbose(false).level, Level::INFO);
    }

    #[test]
    fn test_open_log_file_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");

        assert!(open_log_file("jpg_convert", &log_dir).is_ok());
        let created: Vec<String> = fs::read_dir(&log_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(created.len(), 1);
        assert!(created[0].starts_with("jpg_convert.log."));
    }

    #[test]
    fn test_open_log_file_errors_instead_of_panicking() {
        let temp_dir = TempDir::new().unwrap();

        // A regular file where the log directory should be.
        let blocker = temp_dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();
        assert!(open_log_file("jpg_convert", &blocker).is_err());

        // A directory occupying every possible log file name.
        let log_dir = temp_dir.path().join("logs");
        fs::create_dir(&log_dir).unwrap();
        assert!(open_log_file("img_optimize", &log_dir).is_ok());
        let taken: Vec<_> = fs::read_dir(&log_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        for path in &taken {
            fs::remove_file(path).unwrap();
            fs::create_dir(path).unwrap();
        }
        assert!(open_log_file("img_optimize", &log_dir).is_err());
    }

    #[test]
    fn test_init_logging_keeps_console_without_log_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("not_a_dir");
        fs::write(&blocker, "x").unwrap();
        let config = LogConfig {
            log_dir: blocker,
            ..LogConfig::default()
        };

        init_logging("gallery_utils_test", config).unwrap();
        assert!(tracing::dispatcher::has_been_set());
    }

    #[test]
    fn test_console_lines_start_with_run_tag() {
        let output = crate::test_doubles::capture_logs(|| {
            tracing::info!("[convert] Scanning: /srv/assets");
            tracing::error!("[convert] Failed: /srv/assets/a.png bad data");
        });

        let lines: Vec<&str> = output.lines().map(str::trim).collect();
        assert_eq!(
            lines,
            vec![
                "[convert] Scanning: /srv/assets",
                "[convert] Failed: /srv/assets/a.png bad data",
            ]
        );
    }

    #[test]
    fn test_cleanup_old_logs() {
        let temp_dir = TempDir::new().unwrap();
        let program_name = "test_program";

        for i in 0..10 {
            let file_path = temp_dir.path().join(format!("{}.log.{}", program_name, i));
            fs::write(&file_path, format!("log content {}", i)).unwrap();
            let mtime = filetime::FileTime::from_unix_time(1_700_000_000 + i, 0);
            filetime::set_file_mtime(&file_path, mtime).unwrap();
        }
        fs::write(temp_dir.path().join("other.log"), "keep").unwrap();

        cleanup_old_logs(temp_dir.path(), program_name, 3).unwrap();

        let mut remaining: Vec<String> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|n| n.starts_with(program_name))
            .collect();
        remaining.sort();

        assert_eq!(
            remaining,
            vec![
                "test_program.log.7".to_string(),
                "test_program.log.8".to_string(),
                "test_program.log.9".to_string(),
            ]
        );
        assert!(temp_dir.path().join("other.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_external_command_success() {
        let echo = which::which("echo").unwrap();
        let result =
            execute_external_command(&echo, &[OsStr::new("hello"), OsStr::new("world")]).unwrap();

        assert!(result.success());
        assert!(result.stdout.contains("hello world"));
    }

    #[cfg(unix)]
    #[test]
    fn test_execute_external_command_nonzero_exit() {
        let sh = which::which("sh").unwrap();
        let result = execute_external_command(
            &sh,
            &[OsStr::new("-c"), OsStr::new("echo broken >&2; exit 3")],
        )
        .unwrap();

        assert!(!result.success());
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.diagnostics(), "broken");
    }

    #[test]
    fn test_execute_external_command_missing_program() {
        let result = execute_external_command(Path::new("nonexistent_command_xyz"), &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_command_string() {
        assert_eq!(
            format_command_string(
                Path::new("sips"),
                &[OsStr::new("-s"), OsStr::new("format"), OsStr::new("jpeg")]
            ),
            "sips -s format jpeg"
        );
        assert_eq!(format_command_string(Path::new("file"), &[]), "file");
    }

    #[test]
    fn test_diagnostics_prefers_stderr() {
        let result = ExternalCommandResult {
            exit_code: Some(1),
            stdout: "out\n".to_string(),
            stderr: "  \n".to_string(),
            duration: Duration::ZERO,
        };
        assert_eq!(result.diagnostics(), "out");
    }
}
