#![deny(missing_docs)]
//! Shared logging utilities for the secq workspace.
//!
//! This crate provides the `secq_*` logging macros used across the codebase,
//! the terminal/file logger used by the client binary, and a minimal test
//! initializer for the global logger.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

#[doc(hidden)]
pub use log;
pub use log::LevelFilter;

/// Default log file written by [`LogDestination::File`] and [`LogDestination::Both`].
pub const DEFAULT_LOG_FILE: &str = "./secq.log";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! secq_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! secq_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! secq_info {
    ($($arg:tt)*) => {{
        $crate::log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! secq_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! secq_error {
    ($($arg:tt)*) => {{
        $crate::log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum LogDestination {
    /// Write to the log file only.
    File,
    /// Write to the terminal (stderr for warnings and errors).
    #[default]
    Terminal,
    /// Write to both file and terminal.
    Both,
    /// Discard all log output.
    Off,
}

/// Initialize the global logger.
///
/// File destinations write to [`DEFAULT_LOG_FILE`] in the current working
/// directory. A second call is ignored.
pub fn initialize(destination: LogDestination, level: LevelFilter) {
    initialize_with_file(destination, level, Path::new(DEFAULT_LOG_FILE));
}

/// Same as [`initialize`] with an explicit log file path.
pub fn initialize_with_file(destination: LogDestination, level: LevelFilter, log_path: &Path) {
    let config = build_config();

    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::Off => return,
        LogDestination::File => match create_file_logger(level, config, log_path) {
            Some(file_logger) => vec![file_logger],
            None => return,
        },
        LogDestination::Terminal => vec![term_logger(level, config)],
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> =
                vec![term_logger(level, config.clone())];
            if let Some(file_logger) = create_file_logger(level, config, log_path) {
                loggers.push(file_logger);
            }
            loggers
        }
    };

    let _ = CombinedLogger::init(loggers);
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn term_logger(level: LevelFilter, config: Config) -> Box<TermLogger> {
    TermLogger::new(level, config, TerminalMode::Mixed, ColorChoice::Auto)
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    let log_path = PathBuf::from(log_path);
    match File::create(&log_path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_path, err);
            None
        }
    }
}
