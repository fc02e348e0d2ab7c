//! File-based debug logger
//!
//! The extension host swallows stderr, so connection traces go to a file in
//! the temp directory instead. Enabled with `TOOLSCOPE_DEBUG=1`; the minimum
//! level comes from `TOOLSCOPE_LOG_LEVEL` (default `debug`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use super::traits::Logger;

/// Log levels, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Parse a level name, case-insensitive
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO "),
            LogLevel::Warn => write!(f, "WARN "),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

struct FileLoggerState {
    file: Option<File>,
    min_level: LogLevel,
    enabled: bool,
}

impl FileLoggerState {
    fn from_env() -> Self {
        let enabled = std::env::var("TOOLSCOPE_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let min_level = std::env::var("TOOLSCOPE_LOG_LEVEL")
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Debug);
        let file = if enabled { open_log_file() } else { None };

        Self { file, min_level, enabled }
    }

    fn write(&mut self, level: LogLevel, module: &str, message: &str) {
        if !self.enabled || level < self.min_level {
            return;
        }

        if let Some(ref mut file) = self.file {
            let _ = writeln!(file, "[{}] [{}] [{}] {}", timestamp(), level, module, message);
            let _ = file.flush();
        }
    }
}

fn open_log_file() -> Option<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path())
        .ok()
}

// HH:MM:SS.mmm in UTC; the date is in the file's mtime anyway
fn timestamp() -> String {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| {
            let secs = d.as_secs();
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                (secs % 86400) / 3600,
                (secs % 3600) / 60,
                secs % 60,
                d.subsec_millis()
            )
        })
        .unwrap_or_else(|_| "??:??:??.???".to_string())
}

static STATE: Lazy<Mutex<FileLoggerState>> = Lazy::new(|| Mutex::new(FileLoggerState::from_env()));

/// Log a message at the specified level
pub fn log(level: LogLevel, module: &str, message: &str) {
    STATE.lock().write(level, module, message);
}

pub fn trace(module: &str, message: &str) {
    log(LogLevel::Trace, module, message);
}

pub fn debug(module: &str, message: &str) {
    log(LogLevel::Debug, module, message);
}

pub fn info(module: &str, message: &str) {
    log(LogLevel::Info, module, message);
}

pub fn warn(module: &str, message: &str) {
    log(LogLevel::Warn, module, message);
}

pub fn error(module: &str, message: &str) {
    log(LogLevel::Error, module, message);
}

/// Turn file logging on or off at runtime (the binding exposes this)
pub fn set_enabled(enabled: bool) {
    let mut state = STATE.lock();
    if enabled && state.file.is_none() {
        state.file = open_log_file();
    }
    state.enabled = enabled;
}

pub fn set_min_level(level: LogLevel) {
    STATE.lock().min_level = level;
}

/// Path of the debug log file
pub fn log_file_path() -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push("toolscope-debug.log");
    path
}

/// Truncate the log file and reopen it
pub fn clear_log() {
    let path = log_file_path();
    if let Ok(file) = File::create(&path) {
        drop(file);
    }
    let mut state = STATE.lock();
    if state.enabled {
        state.file = open_log_file();
    }
}

/// [`Logger`] adapter that forwards to the global debug file
///
/// Lets the file log be injected anywhere a `SharedLogger` is expected.
#[derive(Debug, Clone)]
pub struct FileLogger {
    module: String,
}

impl FileLogger {
    pub fn new(module: impl Into<String>) -> Self {
        Self { module: module.into() }
    }
}

impl Logger for FileLogger {
    fn debug(&self, message: &str) {
        debug(&self.module, message);
    }

    fn info(&self, message: &str) {
        info(&self.module, message);
    }

    fn warn(&self, message: &str) {
        warn(&self.module, message);
    }

    fn error(&self, message: &str) {
        error(&self.module, message);
    }
}
