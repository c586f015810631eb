//! I/O helper utilities.
//!
//! Provides small adapters to enrich io::Error with actionable context/hints,
//! usable with map_err in both LogRelayError and io::Result code paths.
//!
//! Usage:
//!   // in functions returning crate::Result<_>
//!   fs::copy(src, dst).map_err(io_error_with_help("copy log file", src))?;
//!
//!   // in functions returning io::Result<_>
//!   File::open(p).map_err(io_error_with_help_io("open file", p))?;

use std::io;
use std::path::Path;

use crate::errors::LogRelayError;

/// Format a human-friendly message with op/path plus platform-aware hints.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            match code {
                libc::EACCES | libc::EPERM => {
                    msg.push_str(" — permission denied; check ownership and write permissions.");
                }
                libc::EXDEV => {
                    msg.push_str(
                        " — cross-filesystem; the log is copied, never renamed across devices.",
                    );
                }
                libc::EBUSY => {
                    msg.push_str(" — resource busy; ensure no other process holds the log file.");
                }
                libc::ENOENT => {
                    msg.push_str(" — path not found; verify it exists.");
                }
                libc::EEXIST => {
                    msg.push_str(" — already exists; pick a unique name or remove the target.");
                }
                libc::ENOSPC => {
                    msg.push_str(" — insufficient space on device.");
                }
                libc::EROFS => {
                    msg.push_str(" — read-only filesystem; cannot write here.");
                }
                libc::ENAMETOOLONG => {
                    msg.push_str(" — filename or path too long; shorten path segments.");
                }
                _ => {}
            }
        }
        #[cfg(windows)]
        {
            match code {
                // ERROR_ACCESS_DENIED
                5 => msg.push_str(" — access denied; check permissions."),
                // ERROR_SHARING_VIOLATION
                32 => msg.push_str(" — sharing violation; file is in use."),
                // ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND
                2 | 3 => msg.push_str(" — path not found; verify it exists."),
                80 => msg.push_str(" — already exists; pick a unique name."), // ERROR_FILE_EXISTS
                112 => msg.push_str(" — insufficient disk space."),        // ERROR_DISK_FULL
                206 => msg.push_str(" — filename or path too long (MAX_PATH exceeded)."),
                _ => {}
            }
        }
        msg.push_str(&format!(" [os code: {}]", code));
    } else {
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                msg.push_str(" — permission denied; check ownership and write permissions.");
            }
            io::ErrorKind::NotFound => {
                msg.push_str(" — path not found; verify it exists.");
            }
            io::ErrorKind::AlreadyExists => {
                msg.push_str(" — already exists; remove or choose a unique name.");
            }
            _ => {}
        }
    }

    msg
}

/// Adapter for crate::Result code.
/// Returns a closure suitable for `.map_err(...)` that converts io::Error -> LogRelayError::Io.
pub(crate) fn io_error_with_help<'a>(
    op: &'static str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> LogRelayError + 'a {
    move |e: io::Error| LogRelayError::Io {
        op,
        path: path.to_path_buf(),
        detail: build_message(op, path, &e),
        source: e,
    }
}

/// Adapter for io::Result code (when the surrounding function returns io::Result).
/// Preserves the original ErrorKind.
pub(crate) fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_gets_hint_and_context() {
        let p = Path::new("/definitely/missing/file.txt");
        let err = io_error_with_help("open log file", p)(io::Error::from(io::ErrorKind::NotFound));
        let msg = err.to_string();
        assert!(msg.contains("open log file"));
        assert!(msg.contains("/definitely/missing/file.txt"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn io_variant_keeps_kind() {
        let p = Path::new("x");
        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        let e = io_error_with_help_io("append", p)(denied);
        assert_eq!(e.kind(), io::ErrorKind::PermissionDenied);
        assert!(e.to_string().contains("append 'x'"));
    }
}
