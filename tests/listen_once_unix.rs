#![cfg(unix)]

use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

use log_relay::{Connector, LocalSocketConnector, NotifierChannel, NotifyOutcome};

#[test]
fn listen_once_prints_announced_path() {
    let td = tempdir().unwrap();
    let channels = td.path().join("channels");
    let name = "Log_2024-01-01_00-00-00.txt";

    let child = Command::new(assert_cmd::cargo::cargo_bin!("log_relay"))
        .env(log_relay::config::CONFIG_ENV, td.path().join("no-config.xml"))
        .arg("--channel-dir")
        .arg(&channels)
        .args(["listen", name, "--once"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn listener");

    let socket = channels.join(format!("{name}.sock"));
    let deadline = Instant::now() + Duration::from_secs(10);
    while !socket.exists() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(20));
    }
    assert!(socket.exists(), "listener never bound {}", socket.display());

    let connector: Arc<dyn Connector> = Arc::new(LocalSocketConnector::new(&channels));
    let mut notifier = NotifierChannel::new(connector, Duration::from_secs(2));
    let target = td.path().join("archive.txt");
    let outcome = notifier.notify(name, "archive.txt", &target);
    assert!(matches!(outcome, NotifyOutcome::Delivered { .. }), "{outcome:?}");

    let out = child.wait_with_output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.lines().any(|l| Path::new(l) == target), "{stdout}");
}
