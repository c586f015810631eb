//! Core library for `log_relay`.
//!
//! An append-only log file that can be renamed or moved while in use, and
//! that tells an optional out-of-process viewer where it went. The viewer
//! binds a local channel named after the file; each relocation connects,
//! sends the new absolute path, and hangs up. No listener is the normal case.
//!
//! ```no_run
//! use log_relay::{Config, LogService};
//!
//! # fn main() -> log_relay::Result<()> {
//! let log = LogService::open(Config::new("."))?;
//! log.write_line("started")?;
//! log.save_as("archive")?; // ./archive.txt, listener on the old name is told
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod identity;
pub mod listener;
pub mod notify;
pub mod output;
pub mod platform;
pub mod relocation;
pub mod service;
pub mod shutdown;

pub use config::{
    Config, LogLevel, default_channel_dir, default_config_path, load_config,
    path_has_symlink_ancestor,
};
pub use errors::{LogRelayError, PartialRelocationWarning, Result};
pub use fs_ops::{Relocation, create_initial, ensure_directory, relocate};
pub use identity::{LogFileIdentity, PathStore};
pub use listener::ChannelListener;
pub use notify::{
    ChannelState, ChannelStream, Connector, DEFAULT_CONNECT_TIMEOUT, LocalSocketConnector,
    NotifierChannel, NotifyOutcome,
};
pub use relocation::{DirectoryChange, RelocationCoordinator, SaveOutcome};
pub use service::{LogService, LogServiceBuilder};
