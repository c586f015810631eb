//! Unix implementations of platform helpers.
//! Channels are Unix domain stream sockets named `<name>.sock` inside the channel dir.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Open log file for appending; set 0600 only when creating a new file.
/// If the file already exists, we preserve its existing permissions to avoid
/// clobbering administrator adjustments (e.g. group-readable for log shipping).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600) // applies on create
        .open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

pub fn channel_endpoint(channel_dir: &Path, name: &str) -> PathBuf {
    channel_dir.join(format!("{name}.sock"))
}

/// Connect to a listening socket. Refusal and a missing socket both fail
/// immediately; the caller bounds the rare blocking case (full backlog).
pub fn connect_channel(endpoint: &Path, timeout: Duration) -> io::Result<Box<dyn Write + Send>> {
    let stream = UnixStream::connect(endpoint)?;
    stream.set_write_timeout(Some(timeout))?;
    Ok(Box::new(stream))
}

/// Server end of a channel. Removes its socket file on drop.
pub struct ChannelServer {
    listener: UnixListener,
    endpoint: PathBuf,
}

impl ChannelServer {
    pub fn bind(endpoint: &Path) -> io::Result<Self> {
        if let Some(parent) = endpoint.parent() {
            fs::create_dir_all(parent)?;
        }
        clear_stale_socket(endpoint)?;
        let listener = UnixListener::bind(endpoint)?;
        Ok(Self {
            listener,
            endpoint: endpoint.to_path_buf(),
        })
    }

    /// Block until a client connects.
    pub fn accept(&self) -> io::Result<Box<dyn Read + Send>> {
        let (stream, _) = self.listener.accept()?;
        stream.set_nonblocking(false)?;
        Ok(Box::new(stream))
    }
}

impl Drop for ChannelServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.endpoint);
    }
}

/// A socket file left by a dead listener blocks bind; remove it unless
/// someone is still accepting on it.
fn clear_stale_socket(endpoint: &Path) -> io::Result<()> {
    match fs::symlink_metadata(endpoint) {
        Ok(meta) if meta.file_type().is_socket() => {
            if UnixStream::connect(endpoint).is_ok() {
                return Err(io::Error::new(
                    io::ErrorKind::AddrInUse,
                    format!("another listener is bound to {}", endpoint.display()),
                ));
            }
            debug!(path = %endpoint.display(), "Removing stale channel socket");
            fs::remove_file(endpoint)
        }
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a socket", endpoint.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
