//! EOL Tester Logging System
//!
//! Structured logging through `tracing`. Log output goes to stderr or a file;
//! stdout is reserved for the command console.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Set to any value to force file logging for the interactive shell.
pub const SHELL_LOG_FILE_ENV: &str = "EOL_SHELL_LOG_FILE";

/// Days to keep rotated log files.
pub const LOG_RETENTION_ENV: &str = "EOL_LOG_RETENTION_DAYS";

const DEFAULT_RETENTION_DAYS: u32 = 7;

/// Logging configuration options
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to output
    pub level: Level,
    /// Enable colored output
    pub color: bool,
    pub show_timestamps: bool,
    /// Show target/module name
    pub show_target: bool,
    /// Enable JSON format for machine parsing
    pub json_format: bool,
    /// Enable span events for tracing
    pub enable_spans: bool,
    /// Write to daily files named after this path instead of stderr
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::ERROR,
            color: true,
            show_timestamps: false,
            show_target: false,
            json_format: false,
            enable_spans: false,
            file_output: None,
        }
    }
}

impl LoggingConfig {
    /// Create config for different application modes
    pub fn for_mode(mode: ApplicationMode) -> Self {
        match mode {
            ApplicationMode::Interactive | ApplicationMode::Batch => Self {
                level: Level::ERROR,
                color: io::stderr().is_terminal(),
                show_timestamps: false,
                show_target: false,
                json_format: false,
                enable_spans: false,
                file_output: None,
            },
            ApplicationMode::Test => Self {
                level: Level::DEBUG,
                color: false,
                show_timestamps: true,
                show_target: true,
                json_format: false,
                enable_spans: true,
                file_output: None,
            },
        }
    }

    /// Create config from CLI arguments
    ///
    /// Without flags only errors are logged, since every command failure is
    /// already shown on the console. `-v` adds info, `-vv` debug, `-vvv`
    /// trace.
    pub fn from_args(quiet: bool, verbose: u8, json: bool) -> Self {
        let level = if quiet {
            Level::ERROR
        } else {
            match verbose {
                0 => Level::ERROR,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            }
        };

        Self {
            level,
            color: !quiet && !json && io::stderr().is_terminal(),
            show_timestamps: verbose > 0 || json,
            show_target: verbose > 1,
            json_format: json,
            enable_spans: verbose > 1,
            file_output: None,
        }
    }

    /// Route this configuration to the shell log file when requested.
    ///
    /// File logging is used when `EOL_SHELL_LOG_FILE` is set or stdout is not
    /// a terminal.
    pub fn with_shell_file_output(mut self) -> Self {
        if std::env::var_os(SHELL_LOG_FILE_ENV).is_some() || !io::stdout().is_terminal() {
            self.file_output = Some(log_file_path(ApplicationMode::Interactive));
            self.color = false;
            self.show_timestamps = true;
            self.level = self.level.max(Level::INFO);
        }
        self
    }
}

/// Application modes with different logging requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationMode {
    /// Interactive shell, see [`LoggingConfig::with_shell_file_output`]
    Interactive,
    /// One-shot and batch commands
    Batch,
    /// Test mode - maximum detail for testing
    Test,
}

/// Initialize the logging system
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("eol_tester={}", config.level)));

    let registry = Registry::default().with(env_filter);

    if let Some(log_file) = config.file_output {
        let file_appender = daily_appender(&log_file)?;

        if config.json_format {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(config.enable_spans)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender);
            json_layer.with_subscriber(registry).try_init().map_err(io::Error::other)?;
        } else {
            let fmt_layer = fmt::layer()
                .with_target(config.show_target)
                .with_level(true)
                .with_ansi(false)
                .with_writer(file_appender);

            if config.show_timestamps {
                fmt_layer
                    .with_timer(fmt::time::ChronoUtc::rfc_3339())
                    .with_subscriber(registry)
                    .try_init()
                    .map_err(io::Error::other)?;
            } else {
                fmt_layer.with_subscriber(registry).try_init().map_err(io::Error::other)?;
            }
        }
    } else if config.json_format {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(config.enable_spans)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr);
        json_layer.with_subscriber(registry).try_init().map_err(io::Error::other)?;
    } else {
        let fmt_layer = fmt::layer()
            .with_target(config.show_target)
            .with_level(true)
            .with_ansi(config.color)
            .with_writer(io::stderr);

        if config.show_timestamps {
            fmt_layer
                .with_timer(fmt::time::ChronoUtc::rfc_3339())
                .with_subscriber(registry)
                .try_init()
                .map_err(io::Error::other)?;
        } else {
            fmt_layer.with_subscriber(registry).try_init().map_err(io::Error::other)?;
        }
    }

    Ok(())
}

/// Appender writing `<file>.<YYYY-MM-DD>` next to `log_file`, one file per day.
pub fn daily_appender(log_file: &Path) -> io::Result<RollingFileAppender> {
    let log_dir = log_file
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file path"))?;
    let file_name = log_file
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid log file name"))?;
    std::fs::create_dir_all(log_dir)?;
    Ok(tracing_appender::rolling::daily(log_dir, file_name))
}

/// Retention period from `EOL_LOG_RETENTION_DAYS`, default 7 days.
pub fn retention_days() -> u32 {
    std::env::var(LOG_RETENTION_ENV)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_RETENTION_DAYS)
}

/// Clean up old log files based on retention policy
///
/// Only dated files (names containing `.log.`, e.g. `shell.log.2025-11-22`)
/// are considered.
pub fn cleanup_old_logs(log_dir: &Path, retention_days: u32) -> io::Result<usize> {
    use std::fs;
    use std::time::{Duration, SystemTime};

    if !log_dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let retention = Duration::from_secs(u64::from(retention_days) * 24 * 60 * 60);

    let mut cleaned_count = 0;
    let mut cleaned_size: u64 = 0;

    for entry in fs::read_dir(log_dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_rotated = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.contains(".log."));
        if !is_rotated || !path.is_file() {
            continue;
        }

        let metadata = entry.metadata()?;
        let modified = metadata.modified()?;

        if let Ok(age) = now.duration_since(modified) {
            if age > retention {
                let size = metadata.len();
                match fs::remove_file(&path) {
                    Ok(_) => {
                        cleaned_count += 1;
                        cleaned_size += size;
                        tracing::info!(
                            "Cleaned up old log file: {} (age: {} days, size: {} bytes)",
                            path.display(),
                            age.as_secs() / 86400,
                            size
                        );
                    },
                    Err(e) => {
                        tracing::warn!("Failed to remove old log file {}: {}", path.display(), e);
                    },
                }
            }
        }
    }

    if cleaned_count > 0 {
        tracing::info!(
            "Log cleanup completed: removed {} files, freed {} bytes",
            cleaned_count,
            cleaned_size
        );
    }

    Ok(cleaned_count)
}

/// Log a completed hardware operation
#[macro_export]
macro_rules! log_hardware_operation {
    ($device:expr, $operation:expr) => {
        tracing::info!(
            device = %$device,
            operation = $operation,
            "Hardware operation"
        );
    };
    ($device:expr, $operation:expr, $details:expr) => {
        tracing::info!(
            device = %$device,
            operation = $operation,
            details = %$details,
            "Hardware operation"
        );
    };
}

/// Log a failed slash command with its error code
#[macro_export]
macro_rules! log_command_error {
    ($error:expr, $command:expr) => {
        tracing::warn!(
            error = %$error,
            code = $error.to_error_code(),
            command = %$command,
            "Command failed"
        );
    };
}

/// Log directory under the user's home, `~/.eol-tester/logs`.
///
/// Falls back to the system temp directory when no home directory is known.
pub fn log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".eol-tester")
        .join("logs")
}

/// Get log file path for a given application mode
///
/// This is the base name; [`daily_appender`] adds the date suffix.
pub fn log_file_path(mode: ApplicationMode) -> PathBuf {
    let dir = log_dir();
    match mode {
        ApplicationMode::Interactive => dir.join("shell.log"),
        ApplicationMode::Batch => dir.join("batch.log"),
        ApplicationMode::Test => dir.join("test.log"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn test_from_args_levels() {
        assert_eq!(LoggingConfig::from_args(false, 0, false).level, Level::ERROR);
        assert_eq!(LoggingConfig::from_args(false, 1, false).level, Level::INFO);
        assert_eq!(LoggingConfig::from_args(false, 2, false).level, Level::DEBUG);
        assert_eq!(LoggingConfig::from_args(false, 5, false).level, Level::TRACE);
        assert_eq!(LoggingConfig::from_args(true, 3, false).level, Level::ERROR);

        let json = LoggingConfig::from_args(false, 0, true);
        assert!(json.json_format);
        assert!(!json.color);
        assert!(json.show_timestamps);
    }

    #[test]
    fn test_for_mode() {
        let batch = LoggingConfig::for_mode(ApplicationMode::Batch);
        assert!(batch.file_output.is_none());

        let test = LoggingConfig::for_mode(ApplicationMode::Test);
        assert_eq!(test.level, Level::DEBUG);
        assert!(test.enable_spans);
    }

    #[test]
    #[serial_test::serial]
    fn test_shell_file_output_when_requested() {
        std::env::set_var(SHELL_LOG_FILE_ENV, "1");
        let shell = LoggingConfig::for_mode(ApplicationMode::Interactive).with_shell_file_output();
        std::env::remove_var(SHELL_LOG_FILE_ENV);

        assert!(shell
            .file_output
            .as_ref()
            .is_some_and(|p| p.ends_with("shell.log")));
        assert_eq!(shell.level, Level::INFO);
        assert!(!shell.color);

        let debug = LoggingConfig::from_args(false, 2, false);
        std::env::set_var(SHELL_LOG_FILE_ENV, "1");
        let debug = debug.with_shell_file_output();
        std::env::remove_var(SHELL_LOG_FILE_ENV);
        assert_eq!(debug.level, Level::DEBUG);
    }

    #[test]
    fn test_log_file_paths() {
        assert!(log_file_path(ApplicationMode::Batch).ends_with(".eol-tester/logs/batch.log"));
        assert!(log_file_path(ApplicationMode::Test).ends_with("test.log"));
    }

    #[test]
    fn test_cleanup_removes_only_old_rotated_files() {
        let dir = TempDir::new().unwrap();
        let old_rotated = dir.path().join("shell.log.2020-01-01");
        let fresh_rotated = dir.path().join("shell.log.2099-01-01");
        let active = dir.path().join("shell.log");
        for path in [&old_rotated, &fresh_rotated, &active] {
            fs::write(path, "log line\n").unwrap();
        }

        let ten_days_ago = SystemTime::now() - Duration::from_secs(10 * 24 * 60 * 60);
        fs::File::options()
            .write(true)
            .open(&old_rotated)
            .unwrap()
            .set_modified(ten_days_ago)
            .unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), 7).unwrap(), 1);
        assert!(!old_rotated.exists());
        assert!(fresh_rotated.exists());
        assert!(active.exists());
    }

    #[test]
    fn test_cleanup_removes_expired_daily_log() {
        let dir = TempDir::new().unwrap();
        let mut appender = daily_appender(&dir.path().join("logs").join("shell.log")).unwrap();
        appender.write_all(b"session started\n").unwrap();
        appender.flush().unwrap();
        drop(appender);

        let log_dir = dir.path().join("logs");
        let written: Vec<_> = fs::read_dir(&log_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(written.len(), 1);
        let name = written[0].file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("shell.log."), "unexpected log file {}", name);

        assert_eq!(cleanup_old_logs(&log_dir, 7).unwrap(), 0);
        let ten_days_ago = SystemTime::now() - Duration::from_secs(10 * 24 * 60 * 60);
        fs::File::options()
            .write(true)
            .open(&written[0])
            .unwrap()
            .set_modified(ten_days_ago)
            .unwrap();
        assert_eq!(cleanup_old_logs(&log_dir, 7).unwrap(), 1);
        assert!(!written[0].exists());
    }

    #[test]
    fn test_cleanup_missing_directory_is_noop() {
        let dir = TempDir::new().unwrap();
        assert_eq!(cleanup_old_logs(&dir.path().join("nope"), 7).unwrap(), 0);
    }

    #[test]
    #[serial_test::serial]
    fn test_retention_days_from_env() {
        std::env::remove_var(LOG_RETENTION_ENV);
        assert_eq!(retention_days(), 7);
        std::env::set_var(LOG_RETENTION_ENV, "30");
        assert_eq!(retention_days(), 30);
        std::env::set_var(LOG_RETENTION_ENV, "forever");
        assert_eq!(retention_days(), 7);
        std::env::remove_var(LOG_RETENTION_ENV);
    }
}
