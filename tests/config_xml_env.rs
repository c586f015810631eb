use serial_test::serial;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

use log_relay::config::CONFIG_ENV;
use log_relay::{LogLevel, default_config_path, load_config};

#[test]
#[serial]
fn env_override_selects_config_file() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("relay.xml");
    fs::write(
        &cfg_path,
        format!(
            r#"<config>
  <directory>{}</directory>
  <connect_timeout_ms>150</connect_timeout_ms>
  <log_level>info</log_level>
</config>
"#,
            td.path().display()
        ),
    )
    .unwrap();

    unsafe {
        std::env::set_var(CONFIG_ENV, &cfg_path);
    }
    assert_eq!(default_config_path(), Some(cfg_path.clone()));
    let cfg = load_config(None).unwrap();
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }

    assert_eq!(cfg.directory, td.path());
    assert_eq!(cfg.connect_timeout, Duration::from_millis(150));
    assert_eq!(cfg.log_level, LogLevel::Info);
}

#[test]
#[serial]
fn missing_env_file_means_defaults() {
    let td = tempdir().unwrap();
    unsafe {
        std::env::set_var(CONFIG_ENV, td.path().join("absent.xml"));
    }
    let cfg = load_config(None).unwrap();
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }
    assert_eq!(cfg.connect_timeout, log_relay::DEFAULT_CONNECT_TIMEOUT);
    assert!(cfg.include_timestamp);
}

#[test]
#[serial]
fn malformed_file_is_an_error() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("bad.xml");
    fs::write(&cfg_path, "<config><unknown>1</unknown></config>").unwrap();
    unsafe {
        std::env::set_var(CONFIG_ENV, &cfg_path);
    }
    let res = load_config(None);
    unsafe {
        std::env::remove_var(CONFIG_ENV);
    }
    assert!(res.is_err());
}
