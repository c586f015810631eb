//! Core configuration types.
//! - Config holds the log service settings with sensible defaults.
//! - LogLevel is the diagnostic verbosity of the binary, with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::paths;
use crate::notify::DEFAULT_CONNECT_TIMEOUT;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// Relocation and channel details
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for a log service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory the initial log file is created in
    pub directory: PathBuf,
    /// Where channel sockets live (Unix); unused with Windows named pipes
    pub channel_dir: PathBuf,
    /// Bound on connecting to (and writing to) a listener
    pub connect_timeout: Duration,
    /// Initial timestamp policy for appends
    pub include_timestamp: bool,
    /// Identity written to the header's first line
    pub creator: String,
    /// Console verbosity for diagnostics
    pub log_level: LogLevel,
    /// Optional diagnostic log file (not the managed log)
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            channel_dir: paths::default_channel_dir(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            include_timestamp: true,
            creator: default_creator(),
            log_level: LogLevel::Normal,
            log_file: None,
        }
    }
}

impl Config {
    /// Config that creates its log in `directory`; other fields use defaults.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Default::default()
        }
    }
}

/// `<executable> <version>`, falling back to the crate name for the executable.
pub fn default_creator() -> String {
    let exe = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    format!("{} {}", exe, env!("CARGO_PKG_VERSION"))
}
