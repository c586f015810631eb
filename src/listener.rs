//! Server end of a relocation channel: what a log viewer runs to follow the file.

use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::fs_ops::io_error_with_help_io;
use crate::platform::{self, ChannelServer};

pub struct ChannelListener {
    server: ChannelServer,
    name: String,
    endpoint: PathBuf,
}

impl ChannelListener {
    /// Bind the channel called `name` (a log file name, e.g. `Log_2024-01-01_00-00-00.txt`).
    pub fn bind(channel_dir: &Path, name: &str) -> io::Result<Self> {
        let endpoint = platform::channel_endpoint(channel_dir, name);
        let server = ChannelServer::bind(&endpoint)
            .map_err(io_error_with_help_io("bind channel", &endpoint))?;
        trace!(channel = name, endpoint = %endpoint.display(), "Channel bound");
        Ok(Self {
            server,
            name: name.to_string(),
            endpoint,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }

    /// Wait for the next notice and return the path it carries.
    /// Connections that close without sending a line, or fail mid-read, are skipped.
    pub fn accept_path(&self) -> io::Result<PathBuf> {
        loop {
            let mut reader = BufReader::new(self.server.accept()?);
            let mut line = String::new();
            if let Err(e) = reader.read_line(&mut line) {
                trace!(channel = %self.name, error = %e, "Dropping unreadable channel connection");
                continue;
            }
            let path = line.trim_end_matches(['\r', '\n']);
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
            trace!(channel = %self.name, "Skipping empty channel connection");
        }
    }
}
