//! The logging service: one explicit object per managed log file.
//!
//! Owns the path store, the log file lock, the notifier and the timestamp
//! policy. Construction creates the file; `close` is the teardown. Appends
//! and the move phase of a relocation both take the log file lock, and
//! relocations are serialized by the notifier lock, taken first.

use chrono::{DateTime, Local};
use std::fmt::Display;
use std::io::Write;
use std::panic::{self, PanicHookInfo};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError, Weak};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::Result;
use crate::fs_ops::{create_initial_at, io_error_with_help};
use crate::identity::{LogFileIdentity, PathStore};
use crate::notify::{Connector, LocalSocketConnector, NotifierChannel};
use crate::platform::open_log_file_secure_append;
use crate::relocation::{DirectoryChange, RelocationCoordinator, SaveOutcome};

/// Prefix layout for timestamped appends (two trailing spaces).
pub const LINE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S  ";

struct Inner {
    store: PathStore,
    file_lock: Mutex<()>,
    notifier: Mutex<NotifierChannel>,
    include_timestamp: AtomicBool,
    panic_hook_installed: AtomicBool,
}

/// How long the panic hook waits for another thread's append to finish.
const PANIC_LOCK_WAIT: Duration = Duration::from_millis(100);

impl Inner {
    fn append(&self, text: &str) -> Result<()> {
        let guard = self.file_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.append_locked(&guard, text)
    }

    /// Append from the panic hook. Never blocks indefinitely: the panicking
    /// thread may itself hold the file lock, and the mutex is not reentrant.
    fn append_from_hook(&self, text: &str) -> bool {
        let deadline = Instant::now() + PANIC_LOCK_WAIT;
        loop {
            match self.file_lock.try_lock() {
                Ok(guard) => return self.append_locked(&guard, text).is_ok(),
                Err(TryLockError::Poisoned(p)) => {
                    return self.append_locked(&p.into_inner(), text).is_ok();
                }
                Err(TryLockError::WouldBlock) if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(1));
                }
                Err(TryLockError::WouldBlock) => return false,
            }
        }
    }

    fn append_locked(&self, _guard: &MutexGuard<'_, ()>, text: &str) -> Result<()> {
        let path = self.store.current().full_path;

        let mut record = String::with_capacity(text.len() + 24);
        if self.include_timestamp.load(Ordering::Relaxed) {
            record.push_str(&Local::now().format(LINE_TIMESTAMP_FORMAT).to_string());
        }
        record.push_str(text);

        let mut file = open_log_file_secure_append(&path)
            .map_err(io_error_with_help("open log file for append", &path))?;
        file.write_all(record.as_bytes())
            .map_err(io_error_with_help("append to log file", &path))
    }
}

/// Builder for `LogService`.
pub struct LogServiceBuilder {
    config: Config,
    created_at: Option<DateTime<Local>>,
    connector: Option<Arc<dyn Connector>>,
}

impl LogServiceBuilder {
    /// Creation time used for the file name and header (defaults to now).
    pub fn created_at(mut self, created: DateTime<Local>) -> Self {
        self.created_at = Some(created);
        self
    }

    /// Transport for relocation notices (defaults to local sockets / named pipes).
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Create the log file and start the service.
    pub fn build(self) -> Result<LogService> {
        let cfg = self.config;
        cfg.validate()?;
        let created = self.created_at.unwrap_or_else(Local::now);
        let identity = create_initial_at(&cfg.directory, &created, &cfg.creator)?;

        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(LocalSocketConnector::new(cfg.channel_dir.clone())));

        info!(
            path = %identity.full_path.display(),
            channel_dir = %cfg.channel_dir.display(),
            "Log service started"
        );
        Ok(LogService {
            inner: Arc::new(Inner {
                store: PathStore::new(identity),
                file_lock: Mutex::new(()),
                notifier: Mutex::new(NotifierChannel::new(connector, cfg.connect_timeout)),
                include_timestamp: AtomicBool::new(cfg.include_timestamp),
                panic_hook_installed: AtomicBool::new(false),
            }),
        })
    }
}

/// Handle to one managed log file. Safe to share across threads.
pub struct LogService {
    inner: Arc<Inner>,
}

impl LogService {
    pub fn builder(config: Config) -> LogServiceBuilder {
        LogServiceBuilder {
            config,
            created_at: None,
            connector: None,
        }
    }

    /// Create a log file per `config` and start the service.
    pub fn open(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn identity(&self) -> LogFileIdentity {
        self.inner.store.current()
    }

    pub fn file_path(&self) -> PathBuf {
        self.inner.store.current().full_path
    }

    pub fn file_name(&self) -> String {
        self.inner.store.current().file_name
    }

    /// Directory the next save targets (a pending directory if one is set).
    pub fn directory(&self) -> PathBuf {
        self.inner.store.target_directory()
    }

    pub fn include_timestamp(&self) -> bool {
        self.inner.include_timestamp.load(Ordering::Relaxed)
    }

    pub fn set_include_timestamp(&self, value: bool) {
        self.inner.include_timestamp.store(value, Ordering::Relaxed);
    }

    /// Append `value` to the log file.
    pub fn write<T: Display + ?Sized>(&self, value: &T) -> Result<()> {
        self.inner.append(&value.to_string())
    }

    /// Append `value` followed by a newline.
    pub fn write_line<T: Display + ?Sized>(&self, value: &T) -> Result<()> {
        self.inner.append(&format!("{value}\n"))
    }

    pub fn save_as(&self, target: &str) -> Result<SaveOutcome> {
        let mut notifier = self.inner.notifier.lock().unwrap_or_else(PoisonError::into_inner);
        RelocationCoordinator::new(&self.inner.store, &mut notifier, &self.inner.file_lock)
            .save_as(target)
    }

    pub fn save(&self) -> Result<SaveOutcome> {
        let mut notifier = self.inner.notifier.lock().unwrap_or_else(PoisonError::into_inner);
        RelocationCoordinator::new(&self.inner.store, &mut notifier, &self.inner.file_lock)
            .save()
    }

    pub fn set_directory(&self, path: &Path) -> Result<DirectoryChange> {
        let mut notifier = self.inner.notifier.lock().unwrap_or_else(PoisonError::into_inner);
        RelocationCoordinator::new(&self.inner.store, &mut notifier, &self.inner.file_lock)
            .set_directory(path)
    }

    /// Log panics from any thread into this file.
    ///
    /// Opt-in and chained: the previous hook still runs. The hook only holds
    /// a weak reference, so once the service is gone it just forwards.
    /// Installing twice for the same service is a no-op.
    pub fn install_panic_hook(&self) {
        if self.inner.panic_hook_installed.swap(true, Ordering::SeqCst) {
            debug!("Panic hook already installed");
            return;
        }
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
            if let Some(inner) = weak.upgrade() {
                inner.append_from_hook(&format!("{info}\n"));
            }
            previous(info);
        }));
        debug!("Panic hook installed");
    }

    /// Stop the service and return where the log ended up.
    pub fn close(self) -> LogFileIdentity {
        let identity = self.inner.store.current();
        info!(path = %identity.full_path.display(), "Log service closed");
        identity
    }
}
