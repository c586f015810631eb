//! Where the log file lives.
//!
//! `LogFileIdentity` is the (directory, file name, full path) triple and
//! `PathStore` is its single owner. Readers always get a whole identity:
//! `commit` swaps it under one lock, so a directory from one relocation can
//! never be paired with a file name from another.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Location of the managed log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFileIdentity {
    pub file_name: String,
    pub directory: PathBuf,
    pub full_path: PathBuf,
}

impl LogFileIdentity {
    /// Build an identity whose `full_path` is `normalize(directory/file_name)`.
    pub fn new(directory: &Path, file_name: &str) -> io::Result<Self> {
        let directory = normalize(directory)?;
        let full_path = directory.join(file_name);
        Ok(Self {
            file_name: file_name.to_string(),
            directory,
            full_path,
        })
    }
}

/// Absolute, lexically normalized form of `path` (`.` and `..` folded).
/// Does not touch the filesystem, so it works for paths that do not exist yet.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for comp in absolute.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(dunce::simplified(&out).to_path_buf())
}

#[derive(Debug)]
struct StoreState {
    identity: LogFileIdentity,
    pending_directory: Option<PathBuf>,
}

/// Holds the current identity plus an optional directory for the next save.
#[derive(Debug)]
pub struct PathStore {
    state: RwLock<StoreState>,
}

impl PathStore {
    pub fn new(identity: LogFileIdentity) -> Self {
        Self {
            state: RwLock::new(StoreState {
                identity,
                pending_directory: None,
            }),
        }
    }

    pub fn current(&self) -> LogFileIdentity {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .identity
            .clone()
    }

    /// Replace the identity in one assignment. Clears any pending directory,
    /// since the file now sits where the caller chose to put it.
    pub fn commit(&self, identity: LogFileIdentity) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.identity = identity;
        state.pending_directory = None;
    }

    /// Directory the next save will target: a pending one if set, else the
    /// directory the file currently lives in.
    pub fn target_directory(&self) -> PathBuf {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .pending_directory
            .clone()
            .unwrap_or_else(|| state.identity.directory.clone())
    }

    pub fn pending_directory(&self) -> Option<PathBuf> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .pending_directory
            .clone()
    }

    /// Drop any pending directory; the next save targets the current one.
    pub fn clear_pending_directory(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .pending_directory = None;
    }

    pub fn set_pending_directory(&self, dir: PathBuf) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.identity.directory == dir {
            state.pending_directory = None;
        } else {
            state.pending_directory = Some(dir);
        }
    }
}
