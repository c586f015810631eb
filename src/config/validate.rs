//! Config validation logic.
//! Rejects settings that would make the service unusable before any file is created.

use std::time::Duration;
use tracing::debug;

use super::types::Config;
use crate::errors::{LogRelayError, Result};

/// Upper bound on the connect timeout; a relocation blocks for at most about twice this.
pub const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

impl Config {
    /// Validate timeout bounds and the header creator line.
    pub fn validate(&self) -> Result<()> {
        if self.directory.as_os_str().is_empty() {
            return Err(LogRelayError::Config("directory must not be empty".into()));
        }
        if self.connect_timeout.is_zero() {
            return Err(LogRelayError::Config("connect_timeout must be greater than zero".into()));
        }
        if self.connect_timeout > MAX_CONNECT_TIMEOUT {
            return Err(LogRelayError::Config(format!(
                "connect_timeout {}ms exceeds the {}s maximum",
                self.connect_timeout.as_millis(),
                MAX_CONNECT_TIMEOUT.as_secs()
            )));
        }
        if self.creator.trim().is_empty() {
            return Err(LogRelayError::Config("creator must not be empty".into()));
        }
        // header is line-oriented
        if self.creator.contains(['\n', '\r']) {
            return Err(LogRelayError::Config("creator must be a single line".into()));
        }
        debug!(
            directory = %self.directory.display(),
            channel_dir = %self.channel_dir.display(),
            timeout_ms = self.connect_timeout.as_millis() as u64,
            "Config validated"
        );
        Ok(())
    }
}
