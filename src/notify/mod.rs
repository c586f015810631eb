//! Relocation notices to an optional listener.
//!
//! The log side is the *client*: a viewer that wants to follow the file binds
//! a channel named after the file's current name, and every relocation
//! connects, writes the new absolute path as one line, and hangs up.
//!
//! State per `notify` call:
//!   Disconnected --connect ok--> Connected --write ok--> Disconnected
//!        |                          |
//!        | refused/timeout          | write failed
//!        v                          v
//!   rekey to next name         close, then retry: original name, next name
//!   (no listener)              (shared one-timeout budget), else give up
//!
//! Nothing here returns an error. A missing or broken listener is normal and
//! must never hold up the physical move beyond the bounded connect.

mod connector;

pub use connector::{ChannelStream, Connector, LocalSocketConnector};

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default bound for connecting to a listener.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connected,
}

/// What happened to one relocation notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// A listener on `channel` received the path.
    Delivered { channel: String, retried: bool },
    /// Nobody was listening on the current name.
    NoListener,
    /// A listener accepted but every write attempt failed.
    Undelivered,
}

/// Client handle keyed by channel name. Only holds a stream while Connected.
struct ChannelHandle {
    name: String,
    stream: Option<ChannelStream>,
}

impl ChannelHandle {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stream: None,
        }
    }

    fn send(&mut self, message: &str) -> io::Result<()> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        stream.write_all(message.as_bytes())?;
        stream.flush()
    }

    fn close(&mut self) {
        self.stream = None;
    }
}

pub struct NotifierChannel {
    connector: Arc<dyn Connector>,
    timeout: Duration,
    handle: Option<ChannelHandle>,
}

impl NotifierChannel {
    pub fn new(connector: Arc<dyn Connector>, timeout: Duration) -> Self {
        Self {
            connector,
            timeout: timeout.max(Duration::from_millis(1)),
            handle: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn state(&self) -> ChannelState {
        match &self.handle {
            Some(h) if h.stream.is_some() => ChannelState::Connected,
            _ => ChannelState::Disconnected,
        }
    }

    /// Name the next notice will connect to if the file name has not changed.
    pub fn channel_name(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.name.as_str())
    }

    /// Tell a listener on `current_name` that the log is moving to `target`.
    /// `next_name` is the file name the log will have after the move.
    pub fn notify(&mut self, current_name: &str, next_name: &str, target: &Path) -> NotifyOutcome {
        let message = format!("{}\n", target.to_string_lossy());

        // The channel is addressed by name, so a handle for another name is useless.
        let mut handle = match self.handle.take() {
            Some(h) if h.name == current_name => h,
            _ => ChannelHandle::new(current_name),
        };

        match self.connector.connect(&handle.name, self.timeout) {
            Ok(stream) => handle.stream = Some(stream),
            Err(e) => {
                debug!(channel = %handle.name, error = %e, "No listener for relocation notice");
                self.handle = Some(ChannelHandle::new(next_name));
                return NotifyOutcome::NoListener;
            }
        }

        let outcome = match handle.send(&message) {
            Ok(()) => NotifyOutcome::Delivered {
                channel: handle.name.clone(),
                retried: false,
            },
            Err(e) => {
                warn!(
                    channel = %handle.name,
                    error = %e,
                    "Relocation notice write failed; reconnecting"
                );
                handle.close();
                self.retry(current_name, next_name, &message)
            }
        };
        handle.close();

        self.handle = match outcome {
            NotifyOutcome::Undelivered => None,
            _ => Some(ChannelHandle::new(next_name)),
        };
        if let NotifyOutcome::Delivered { channel, retried } = &outcome {
            debug!(
                channel = %channel,
                retried = *retried,
                target = %target.display(),
                "Relocation notice delivered"
            );
        }
        outcome
    }

    /// One reconnect round after a failed write: the original name first (the
    /// listener that just accepted is most likely still there), then the new
    /// name. Both attempts share a single timeout budget.
    fn retry(&self, original: &str, next: &str, message: &str) -> NotifyOutcome {
        let deadline = Instant::now() + self.timeout;
        let mut names = vec![original];
        if next != original {
            names.push(next);
        }

        for name in names {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                debug!(channel = name, "Retry budget exhausted");
                break;
            }
            let mut handle = ChannelHandle::new(name);
            match self.connector.connect(name, remaining) {
                Ok(stream) => handle.stream = Some(stream),
                Err(e) => {
                    debug!(channel = name, error = %e, "Reconnect failed");
                    continue;
                }
            }
            match handle.send(message) {
                Ok(()) => {
                    return NotifyOutcome::Delivered {
                        channel: name.to_string(),
                        retried: true,
                    };
                }
                Err(e) => debug!(channel = name, error = %e, "Write after reconnect failed"),
            }
        }

        warn!(channel = original, "Giving up on relocation notice");
        NotifyOutcome::Undelivered
    }
}
