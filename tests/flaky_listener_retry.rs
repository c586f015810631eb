use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::tempdir;

use log_relay::{ChannelStream, Config, Connector, LogService, NotifyOutcome};

/// First connection accepts but breaks on write; later ones record what they get.
#[derive(Default)]
struct Flaky {
    connects: AtomicUsize,
    names: Mutex<Vec<String>>,
    received: Arc<Mutex<Vec<u8>>>,
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Connector for Flaky {
    fn connect(&self, name: &str, _timeout: Duration) -> io::Result<ChannelStream> {
        self.names.lock().unwrap().push(name.to_string());
        if self.connects.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(Box::new(Broken))
        } else {
            Ok(Box::new(Capture(Arc::clone(&self.received))))
        }
    }
}

#[test]
fn broken_write_is_retried_on_original_name() {
    let td = tempdir().unwrap();
    let mut cfg = Config::new(td.path());
    cfg.connect_timeout = Duration::from_millis(500);
    let flaky = Arc::new(Flaky::default());
    let connector: Arc<dyn Connector> = flaky.clone();
    let svc = LogService::builder(cfg).connector(connector).build().unwrap();
    let original_name = svc.file_name();

    let out = svc.save_as("next").unwrap();
    let target = td.path().join("next.txt");

    assert_eq!(
        out.notice(),
        Some(&NotifyOutcome::Delivered { channel: original_name.clone(), retried: true })
    );
    assert_eq!(*flaky.names.lock().unwrap(), vec![original_name.clone(), original_name]);
    let line = String::from_utf8(flaky.received.lock().unwrap().clone()).unwrap();
    assert_eq!(line, format!("{}\n", target.display()));
}
