//! Physical relocation of the log file.
//!
//! Two explicit phases, never a rename:
//!   1. copy the file into a freshly created target (O_EXCL, fsynced)
//!   2. remove the original
//!
//! A failure in phase 1 leaves the original authoritative and removes any
//! half-written target. A failure in phase 2 still yields the new identity,
//! paired with a `PartialRelocationWarning` naming the orphan.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::{LogRelayError, PartialRelocationWarning, Result};
use crate::identity::LogFileIdentity;

use super::copy::copy_new;
use super::dir::ensure_directory;
use super::helpers::io_error_with_help;

/// Result of a completed copy phase.
#[derive(Debug)]
pub struct Relocation {
    pub identity: LogFileIdentity,
    pub warning: Option<PartialRelocationWarning>,
}

/// Move `old` to `new_directory/new_file_name` (or into its own directory
/// when `new_directory` is None). Never overwrites an existing file.
pub fn relocate(
    old: &LogFileIdentity,
    new_directory: Option<&Path>,
    new_file_name: &str,
) -> Result<Relocation> {
    relocate_with(old, new_directory, new_file_name, |p| fs::remove_file(p))
}

/// Same as `relocate`, with the phase-2 removal supplied by the caller.
pub(crate) fn relocate_with<F>(
    old: &LogFileIdentity,
    new_directory: Option<&Path>,
    new_file_name: &str,
    remove: F,
) -> Result<Relocation>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let directory = new_directory.unwrap_or(&old.directory);
    let target = LogFileIdentity::new(directory, new_file_name)
        .map_err(io_error_with_help("resolve relocation target", directory))?;

    // symlink_metadata so a dangling link also counts as occupied.
    if fs::symlink_metadata(&target.full_path).is_ok() {
        return Err(LogRelayError::Conflict(target.full_path));
    }

    ensure_directory(&target.directory)?;

    let bytes = copy_new(&old.full_path, &target.full_path).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            LogRelayError::Conflict(target.full_path.clone())
        } else {
            io_error_with_help("copy log file", &old.full_path)(e)
        }
    })?;
    debug!(
        src = %old.full_path.display(),
        dest = %target.full_path.display(),
        bytes,
        "Copied log file"
    );

    match remove(&old.full_path) {
        Ok(()) => {
            info!(
                src = %old.full_path.display(),
                dest = %target.full_path.display(),
                "Relocated log file"
            );
            Ok(Relocation {
                identity: target,
                warning: None,
            })
        }
        Err(source) => {
            warn!(
                orphan = %old.full_path.display(),
                dest = %target.full_path.display(),
                error = %source,
                "Copied log file but could not remove the original"
            );
            let warning = PartialRelocationWarning {
                orphan: old.full_path.clone(),
                target: target.full_path.clone(),
                source,
            };
            Ok(Relocation {
                identity: target,
                warning: Some(warning),
            })
        }
    }
}
