//! Transport seam for relocation notices.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::platform;

/// Client end of one channel connection.
pub type ChannelStream = Box<dyn Write + Send>;

/// Opens a client connection to the channel called `name`.
///
/// Runs on the relocating thread. Implementations must give up within
/// `timeout`; a missing or refusing listener should fail at once.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, name: &str, timeout: Duration) -> io::Result<ChannelStream>;
}

/// Local sockets on Unix, named pipes on Windows.
#[derive(Debug, Clone)]
pub struct LocalSocketConnector {
    channel_dir: PathBuf,
}

impl LocalSocketConnector {
    pub fn new(channel_dir: impl Into<PathBuf>) -> Self {
        Self {
            channel_dir: channel_dir.into(),
        }
    }

    pub fn channel_dir(&self) -> &Path {
        &self.channel_dir
    }
}

impl Connector for LocalSocketConnector {
    fn connect(&self, name: &str, timeout: Duration) -> io::Result<ChannelStream> {
        let endpoint = platform::channel_endpoint(&self.channel_dir, name);
        platform::connect_channel(&endpoint, timeout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::platform::ChannelServer;
    use std::time::Instant;
    use tempfile::tempdir;

    #[test]
    fn missing_listener_fails_without_waiting() {
        let td = tempdir().unwrap();
        let connector = LocalSocketConnector::new(td.path());
        let timeout = Duration::from_secs(2);

        let start = Instant::now();
        let err = connector.connect("nobody.txt", timeout).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(start.elapsed() < timeout / 4, "took {:?}", start.elapsed());
    }

    #[test]
    fn bound_listener_accepts() {
        let td = tempdir().unwrap();
        let connector = LocalSocketConnector::new(td.path());
        let _server =
            ChannelServer::bind(&platform::channel_endpoint(td.path(), "here.txt")).unwrap();

        let mut stream = connector.connect("here.txt", Duration::from_millis(500)).unwrap();
        stream.write_all(b"/tmp/x\n").unwrap();
    }
}
