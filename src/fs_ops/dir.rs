use std::fs;
use std::path::Path;
use tracing::info;

use crate::errors::{LogRelayError, Result};

/// Create `path` (and parents) if it is not already a directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|source| LogRelayError::DirectoryCreate {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Created log directory");
    Ok(())
}
