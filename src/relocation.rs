//! Save-as orchestration: pick the target, refuse conflicts, notify any
//! listener, then move the file and commit the new identity.
//!
//! Notification happens before the move and its outcome never decides
//! whether the move runs. The move itself runs under the log file lock so
//! it cannot interleave with an append.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::errors::{LogRelayError, PartialRelocationWarning, Result};
use crate::fs_ops::{Relocation, ensure_directory, io_error_with_help, relocate_with};
use crate::identity::{LogFileIdentity, PathStore, normalize};
use crate::notify::{NotifierChannel, NotifyOutcome};

/// Extension given to save-as targets that have none.
pub const DEFAULT_EXTENSION: &str = "txt";

type RemoveFn = fn(&Path) -> io::Result<()>;

/// Outcome of `save_as` / `save`.
#[derive(Debug)]
pub enum SaveOutcome {
    Relocated {
        relocation: Relocation,
        notice: NotifyOutcome,
    },
    /// The target was the file's current location.
    Unchanged(LogFileIdentity),
}

impl SaveOutcome {
    pub fn identity(&self) -> &LogFileIdentity {
        match self {
            SaveOutcome::Relocated { relocation, .. } => &relocation.identity,
            SaveOutcome::Unchanged(identity) => identity,
        }
    }

    pub fn warning(&self) -> Option<&PartialRelocationWarning> {
        match self {
            SaveOutcome::Relocated { relocation, .. } => relocation.warning.as_ref(),
            SaveOutcome::Unchanged(_) => None,
        }
    }

    pub fn notice(&self) -> Option<&NotifyOutcome> {
        match self {
            SaveOutcome::Relocated { notice, .. } => Some(notice),
            SaveOutcome::Unchanged(_) => None,
        }
    }
}

/// Outcome of `set_directory`.
#[derive(Debug)]
pub enum DirectoryChange {
    /// The directory existed; the file was saved into it.
    Saved(SaveOutcome),
    /// The directory was created and will be used by the next save.
    Pending(PathBuf),
}

/// Append `.txt` when `target` has no extension. Rejects anything that is
/// not a bare file name.
pub fn with_default_extension(target: &str) -> Result<String> {
    if target.is_empty()
        || target == "."
        || target == ".."
        || target.contains(['/', '\\'])
    {
        return Err(LogRelayError::InvalidName(target.to_string()));
    }
    // "archive." has an empty extension, which counts as none
    if Path::new(target).extension().is_some_and(|ext| !ext.is_empty()) {
        Ok(target.to_string())
    } else {
        Ok(format!("{target}.{DEFAULT_EXTENSION}"))
    }
}

/// Sole writer of the `PathStore` for the duration of one relocation.
pub struct RelocationCoordinator<'a> {
    store: &'a PathStore,
    notifier: &'a mut NotifierChannel,
    file_lock: &'a Mutex<()>,
    remove: RemoveFn,
}

impl<'a> RelocationCoordinator<'a> {
    pub fn new(
        store: &'a PathStore,
        notifier: &'a mut NotifierChannel,
        file_lock: &'a Mutex<()>,
    ) -> Self {
        Self {
            store,
            notifier,
            file_lock,
            remove: |p| fs::remove_file(p),
        }
    }

    #[cfg(test)]
    fn with_remove(mut self, remove: RemoveFn) -> Self {
        self.remove = remove;
        self
    }

    /// Save the log under `target` in the effective directory.
    pub fn save_as(&mut self, target: &str) -> Result<SaveOutcome> {
        let name = with_default_extension(target)?;
        let dir = self.store.target_directory();
        self.save_into(&dir, &name)
    }

    /// Save under the current name, which moves the file only if a pending
    /// directory has been set.
    pub fn save(&mut self) -> Result<SaveOutcome> {
        let name = self.store.current().file_name;
        let dir = self.store.target_directory();
        self.save_into(&dir, &name)
    }

    /// Existing directory: move the file there now. Missing directory:
    /// create it and use it for the next save, leaving the file in place.
    pub fn set_directory(&mut self, path: &Path) -> Result<DirectoryChange> {
        if path.is_dir() {
            let dir = normalize(path).map_err(io_error_with_help("resolve directory", path))?;
            let name = self.store.current().file_name;
            info!(dir = %dir.display(), "Directory exists; saving log file there");
            return self.save_into(&dir, &name).map(DirectoryChange::Saved);
        }

        ensure_directory(path)?;
        let dir = normalize(path).map_err(io_error_with_help("resolve directory", path))?;
        self.store.set_pending_directory(dir.clone());
        info!(dir = %dir.display(), "Directory created; log file moves on next save");
        Ok(DirectoryChange::Pending(dir))
    }

    fn save_into(&mut self, dir: &Path, name: &str) -> Result<SaveOutcome> {
        let current = self.store.current();
        let candidate =
            normalize(&dir.join(name)).map_err(io_error_with_help("resolve target", dir))?;

        if candidate == current.full_path {
            // The caller chose where the file already is; an older choice is void.
            self.store.clear_pending_directory();
            debug!(path = %candidate.display(), "Log file already at target");
            return Ok(SaveOutcome::Unchanged(current));
        }
        if fs::symlink_metadata(&candidate).is_ok() {
            return Err(LogRelayError::Conflict(candidate));
        }

        let notice = self.notifier.notify(&current.file_name, name, &candidate);

        let relocation = {
            let _guard = self.file_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let current = self.store.current();
            let relocation = relocate_with(&current, Some(dir), name, self.remove)?;
            self.store.commit(relocation.identity.clone());
            relocation
        };

        if let Some(w) = &relocation.warning {
            warn!(orphan = %w.orphan.display(), "Log file relocated; original copy left behind");
        }
        Ok(SaveOutcome::Relocated { relocation, notice })
    }
}
