//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Global flags override values loaded from the XML config.

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::types::{Config, LogLevel};

/// Append-only log file that tells a listening viewer where it moved.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Append-only log file that tells a listening viewer where it moved"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Explicit config file (otherwise LOG_RELAY_CONFIG or the default location).
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Emit diagnostics in structured JSON.
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,

    /// Also write diagnostics to this file.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Directory holding channel sockets (Unix only).
    #[arg(long, global = true, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub channel_dir: Option<PathBuf>,

    /// Listener connect timeout in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Bind a channel and print every path a log file announces on it.
    Listen {
        /// Channel name: the watched log file's name, e.g. Log_2024-01-01_00-00-00.txt
        name: String,
        /// Exit after the first message.
        #[arg(long)]
        once: bool,
    },
    /// Create a log file, append messages, apply relocations, print the final path.
    Create {
        /// Directory for the new log file (default: config directory).
        #[arg(long, value_hint = ValueHint::DirPath)]
        dir: Option<PathBuf>,
        /// Line to append; may be repeated.
        #[arg(long = "message", short = 'm', value_name = "TEXT")]
        messages: Vec<String>,
        /// Do not prefix appended lines with a timestamp.
        #[arg(long)]
        no_timestamp: bool,
        /// Change the log directory (created and left pending if missing).
        #[arg(long, value_hint = ValueHint::DirPath)]
        set_dir: Option<PathBuf>,
        /// Save under this bare file name (".txt" added when no extension).
        #[arg(long, value_name = "NAME")]
        save_as: Option<String>,
    },
    /// Print the config file location in use and exit.
    PrintConfig,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(lf) = &self.log_file {
            cfg.log_file = Some(lf.clone());
        }
        if let Some(dir) = &self.channel_dir {
            cfg.channel_dir = dir.clone();
        }
        if let Some(ms) = self.timeout_ms {
            cfg.connect_timeout = Duration::from_millis(ms);
        }
        if let Command::Create { dir, no_timestamp, .. } = &self.command {
            if let Some(dir) = dir {
                cfg.directory = dir.clone();
            }
            if *no_timestamp {
                cfg.include_timestamp = false;
            }
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_collects_repeated_messages() {
        let args = Args::try_parse_from([
            "log_relay", "create", "-m", "one", "--message", "two", "--save-as", "archive",
        ])
        .unwrap();
        let Command::Create { messages, save_as, .. } = &args.command else {
            panic!("expected create")
        };
        assert_eq!(messages, &["one", "two"]);
        assert_eq!(save_as.as_deref(), Some("archive"));
    }

    #[test]
    fn debug_wins_over_log_level() {
        let args =
            Args::try_parse_from(["log_relay", "--log-level", "quiet", "--debug", "print-config"])
                .unwrap();
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));
    }

    #[test]
    fn overrides_apply_to_config() {
        let args = Args::try_parse_from([
            "log_relay",
            "create",
            "--dir",
            "/tmp/logs",
            "--no-timestamp",
            "--timeout-ms",
            "50",
            "--channel-dir",
            "/tmp/ch",
        ])
        .unwrap();
        let mut cfg = Config::new("/elsewhere");
        args.apply_overrides(&mut cfg);
        assert_eq!(cfg.directory, PathBuf::from("/tmp/logs"));
        assert!(!cfg.include_timestamp);
        assert_eq!(cfg.connect_timeout, Duration::from_millis(50));
        assert_eq!(cfg.channel_dir, PathBuf::from("/tmp/ch"));
    }

    #[test]
    fn listen_requires_a_name() {
        assert!(Args::try_parse_from(["log_relay", "listen"]).is_err());
        let args = Args::try_parse_from(["log_relay", "listen", "Log_x.txt", "--once"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Listen { ref name, once: true } if name == "Log_x.txt"
        ));
    }
}
