//! Windows implementations of platform helpers.
//!
//! Notes:
//! - Channels are named pipes in the local pipe namespace (`\\.\pipe\<name>`);
//!   the channel dir is not used.
//! - The server keeps one idle pipe instance ready so a client arriving
//!   between two accepts does not see "pipe not found".

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::os::windows::io::{FromRawHandle, RawHandle};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use windows_sys::Win32::Foundation::{
    CloseHandle, ERROR_PIPE_BUSY, ERROR_PIPE_CONNECTED, HANDLE, INVALID_HANDLE_VALUE,
};
use windows_sys::Win32::Storage::FileSystem::PIPE_ACCESS_INBOUND;
use windows_sys::Win32::System::Pipes::{
    ConnectNamedPipe, CreateNamedPipeW, PIPE_READMODE_BYTE, PIPE_TYPE_BYTE,
    PIPE_UNLIMITED_INSTANCES, PIPE_WAIT, WaitNamedPipeW,
};

const PIPE_IN_BUFFER: u32 = 4096;

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

pub fn channel_endpoint(_channel_dir: &Path, name: &str) -> PathBuf {
    PathBuf::from(format!(r"\\.\pipe\{name}"))
}

/// Open the client end of a named pipe.
///
/// A missing pipe fails at once. While every instance is busy, waits for one
/// with `WaitNamedPipeW` until `timeout` runs out.
pub fn connect_channel(endpoint: &Path, timeout: Duration) -> io::Result<Box<dyn Write + Send>> {
    let deadline = Instant::now() + timeout;
    let wide_name: Vec<u16> = endpoint.as_os_str().encode_wide().chain(once(0)).collect();
    loop {
        match OpenOptions::new().write(true).open(endpoint) {
            Ok(pipe) => return Ok(Box::new(pipe)),
            Err(e) if e.raw_os_error() == Some(ERROR_PIPE_BUSY as i32) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Err(io::Error::new(io::ErrorKind::TimedOut, "named pipe busy"));
                }
                let wait_ms = u32::try_from(remaining.as_millis()).unwrap_or(u32::MAX).max(1);
                // A failed wait still loops: the next open reports why.
                unsafe {
                    WaitNamedPipeW(wide_name.as_ptr(), wait_ms);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Server end of a channel.
pub struct ChannelServer {
    wide_name: Vec<u16>,
    idle: Mutex<Option<isize>>, // HANDLE
}

impl ChannelServer {
    pub fn bind(endpoint: &Path) -> io::Result<Self> {
        let wide_name: Vec<u16> = endpoint.as_os_str().encode_wide().chain(once(0)).collect();
        let first = create_instance(&wide_name)?;
        Ok(Self {
            wide_name,
            idle: Mutex::new(Some(first)),
        })
    }

    /// Block until a client connects.
    pub fn accept(&self) -> io::Result<Box<dyn Read + Send>> {
        let taken = self.idle.lock().unwrap_or_else(PoisonError::into_inner).take();
        let handle = match taken {
            Some(h) => h,
            None => create_instance(&self.wide_name)?,
        };

        let ok = unsafe { ConnectNamedPipe(handle as HANDLE, std::ptr::null_mut()) };
        if ok == 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(ERROR_PIPE_CONNECTED as i32) {
                unsafe {
                    CloseHandle(handle as HANDLE);
                }
                return Err(err);
            }
        }

        if let Ok(next) = create_instance(&self.wide_name) {
            *self.idle.lock().unwrap_or_else(PoisonError::into_inner) = Some(next);
        }

        let file = unsafe { File::from_raw_handle(handle as RawHandle) };
        Ok(Box::new(file))
    }
}

impl Drop for ChannelServer {
    fn drop(&mut self) {
        if let Some(h) = self.idle.lock().unwrap_or_else(PoisonError::into_inner).take() {
            unsafe {
                CloseHandle(h as HANDLE);
            }
        }
    }
}

fn create_instance(wide_name: &[u16]) -> io::Result<isize> {
    let handle = unsafe {
        CreateNamedPipeW(
            wide_name.as_ptr(),
            PIPE_ACCESS_INBOUND,
            PIPE_TYPE_BYTE | PIPE_READMODE_BYTE | PIPE_WAIT,
            PIPE_UNLIMITED_INSTANCES,
            0,
            PIPE_IN_BUFFER,
            0,
            std::ptr::null(),
        )
    };
    if handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    Ok(handle as isize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(tag: &str) -> PathBuf {
        channel_endpoint(Path::new(""), &format!("log_relay_test_{tag}_{}", std::process::id()))
    }

    #[test]
    fn missing_pipe_fails_at_once() {
        let start = Instant::now();
        let err = connect_channel(&endpoint("missing"), Duration::from_secs(2)).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn busy_pipe_waits_up_to_timeout() {
        let ep = endpoint("busy");
        let _server = ChannelServer::bind(&ep).unwrap();
        // Takes the only idle instance; nothing accepts, so no new one appears.
        let _first = connect_channel(&ep, Duration::from_millis(200)).unwrap();

        let timeout = Duration::from_millis(300);
        let start = Instant::now();
        let err = connect_channel(&ep, timeout).err().unwrap();
        let waited = start.elapsed();

        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(waited >= timeout.mul_f32(0.5), "gave up after {waited:?}");
        assert!(waited < timeout * 3, "took {waited:?}");
    }
}
