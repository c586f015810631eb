//! Initial log file creation.
//! The file name embeds a seconds-resolution timestamp; a clash is reported,
//! never resolved by appending to or truncating somebody else's file.

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

use crate::errors::{LogRelayError, Result};
use crate::identity::LogFileIdentity;

use super::dir::ensure_directory;
use super::helpers::io_error_with_help;

/// Timestamp layout used in generated file names and the header.
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `Log_<timestamp>.txt` for the given creation time.
pub fn log_file_name(created: &DateTime<Local>) -> String {
    format!("Log_{}.txt", created.format(FILE_TIMESTAMP_FORMAT))
}

/// Create a new log file in `directory` named after the current time.
pub fn create_initial(directory: &Path, creator: &str) -> Result<LogFileIdentity> {
    create_initial_at(directory, &Local::now(), creator)
}

/// Create a new log file in `directory` named after `created`.
/// Writes the two-line header and closes the file.
pub fn create_initial_at(
    directory: &Path,
    created: &DateTime<Local>,
    creator: &str,
) -> Result<LogFileIdentity> {
    ensure_directory(directory)?;
    let name = log_file_name(created);
    let identity = LogFileIdentity::new(directory, &name)
        .map_err(io_error_with_help("resolve log directory", directory))?;

    let mut file = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&identity.full_path)
    {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(LogRelayError::AlreadyExists(identity.full_path));
        }
        Err(e) => return Err(io_error_with_help("create log file", &identity.full_path)(e)),
    };

    let header = format!(
        "Log File - {}\nFile Created: {}\n\n",
        creator,
        created.format(FILE_TIMESTAMP_FORMAT)
    );
    file.write_all(header.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(io_error_with_help("write log header", &identity.full_path))?;

    info!(path = %identity.full_path.display(), "Created log file");
    Ok(identity)
}
