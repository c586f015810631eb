#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::time::Duration;
use tempfile::tempdir;

use log_relay::{Config, DirectoryChange, LogService};

/// A source directory that forbids unlinking leaves an orphan copy behind,
/// but the relocation still succeeds and later appends go to the new file.
#[test]
fn undeletable_original_yields_warning_not_error() {
    unsafe {
        if libc::geteuid() == 0 {
            eprintln!("skipping: running as root");
            return;
        }
    }

    let td = tempdir().unwrap();
    let src_dir = td.path().join("src");
    let dest = td.path().join("dest");
    fs::create_dir_all(&dest).unwrap();

    let mut cfg = Config::new(&src_dir);
    cfg.channel_dir = td.path().join("channels");
    cfg.connect_timeout = Duration::from_millis(100);
    cfg.include_timestamp = false;
    let svc = LogService::open(cfg).unwrap();
    svc.write_line("first").unwrap();
    let original = svc.file_path();

    fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o555)).unwrap();
    let change = svc.set_directory(&dest);
    fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o755)).unwrap();

    let DirectoryChange::Saved(outcome) = change.unwrap() else {
        panic!("existing directory should relocate immediately")
    };
    let warning = outcome.warning().expect("partial relocation warning");
    assert_eq!(warning.orphan, original);
    assert_eq!(warning.target, dest.join(svc.file_name()));
    assert!(original.exists(), "orphan stays behind");

    svc.write_line("second").unwrap();
    let text = fs::read_to_string(svc.file_path()).unwrap();
    assert!(text.ends_with("first\nsecond\n"), "{text}");
    assert!(!fs::read_to_string(&original).unwrap().contains("second"));
}
