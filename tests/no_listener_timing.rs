use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

use log_relay::{ChannelStream, Config, Connector, LogService, NotifyOutcome};

/// Listener that never answers: uses the whole budget, then times out.
struct Hanging;

impl Connector for Hanging {
    fn connect(&self, _name: &str, timeout: Duration) -> io::Result<ChannelStream> {
        thread::sleep(timeout);
        Err(io::Error::from(io::ErrorKind::TimedOut))
    }
}

fn config(dir: &std::path::Path, timeout: Duration) -> Config {
    let mut cfg = Config::new(dir);
    cfg.channel_dir = dir.join("channels");
    cfg.connect_timeout = timeout;
    cfg
}

#[test]
fn absent_listener_returns_quickly() {
    let td = tempdir().unwrap();
    let timeout = Duration::from_millis(300);
    let svc = LogService::open(config(td.path(), timeout)).unwrap();

    let start = Instant::now();
    let out = svc.save_as("quiet").unwrap();
    let waited = start.elapsed();

    assert_eq!(out.notice(), Some(&NotifyOutcome::NoListener));
    assert!(waited < timeout.mul_f32(1.5), "took {waited:?}");
}

#[test]
fn unresponsive_listener_costs_at_most_one_timeout() {
    let td = tempdir().unwrap();
    let timeout = Duration::from_millis(300);
    let svc = LogService::builder(config(td.path(), timeout))
        .connector(Arc::new(Hanging))
        .build()
        .unwrap();

    let start = Instant::now();
    let out = svc.save_as("slow").unwrap();
    let waited = start.elapsed();

    assert_eq!(out.notice(), Some(&NotifyOutcome::NoListener));
    assert!(waited < timeout.mul_f32(1.5), "took {waited:?}");
    assert!(td.path().join("slow.txt").exists());
}
