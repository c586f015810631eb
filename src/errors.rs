//! Typed error definitions for log_relay.
//! Provides a small set of well-known failure modes for better logs and tests.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogRelayError {
    #[error("Log file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Relocation target already exists: {0}")]
    Conflict(PathBuf),

    #[error("Failed to create directory {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid log file name: {0:?}")]
    InvalidName(String),

    #[error("{detail}")]
    Io {
        op: &'static str,
        path: PathBuf,
        detail: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl LogRelayError {
    /// Stable numeric code for structured logs and exit statuses.
    pub fn code(&self) -> u16 {
        match self {
            LogRelayError::AlreadyExists(_) => 10,
            LogRelayError::Conflict(_) => 11,
            LogRelayError::DirectoryCreate { .. } => 12,
            LogRelayError::InvalidName(_) => 13,
            LogRelayError::Io { .. } => 20,
            LogRelayError::Config(_) => 30,
        }
    }

    /// Short machine-friendly label matching `code()`.
    pub fn kind(&self) -> &'static str {
        match self {
            LogRelayError::AlreadyExists(_) => "already_exists",
            LogRelayError::Conflict(_) => "conflict",
            LogRelayError::DirectoryCreate { .. } => "directory_create",
            LogRelayError::InvalidName(_) => "invalid_name",
            LogRelayError::Io { .. } => "io",
            LogRelayError::Config(_) => "config",
        }
    }
}

/// The copy reached the target but the original could not be removed.
///
/// Returned inside a successful relocation: `target` is authoritative,
/// `orphan` is a stale duplicate the caller may want to clean up.
#[derive(Debug, Error)]
#[error("Relocated to {target} but could not remove {orphan}: {source}")]
pub struct PartialRelocationWarning {
    pub orphan: PathBuf,
    pub target: PathBuf,
    #[source]
    pub source: io::Error,
}

pub type Result<T, E = LogRelayError> = std::result::Result<T, E>;
