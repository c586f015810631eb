// use macro form directly; no import needed
use std::fs;
use std::process::Command;
use tempfile::tempdir;

use log_relay::config::CONFIG_ENV;

fn relay(config_dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("log_relay"));
    cmd.env(CONFIG_ENV, config_dir.join("no-config.xml"));
    cmd
}

#[test]
fn binary_print_config_succeeds() {
    let td = tempdir().unwrap();
    let out = relay(td.path()).arg("print-config").output().expect("spawn binary");
    assert!(out.status.success(), "binary should succeed with print-config");
}

#[test]
fn create_prints_final_path() {
    let td = tempdir().unwrap();
    let out = relay(td.path())
        .args(["--timeout-ms", "100", "--channel-dir"])
        .arg(td.path().join("channels"))
        .args([
            "create",
            "--no-timestamp",
            "-m",
            "hello",
            "-m",
            "world",
            "--save-as",
            "archive",
            "--dir",
        ])
        .arg(td.path())
        .output()
        .expect("spawn binary");
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let expected = td.path().join("archive.txt");
    assert_eq!(stdout.lines().last(), Some(expected.to_string_lossy().as_ref()));
    let text = fs::read_to_string(&expected).unwrap();
    assert!(text.ends_with("hello\nworld\n"), "{text}");
}

#[test]
fn create_refuses_bad_name() {
    let td = tempdir().unwrap();
    let out = relay(td.path())
        .args(["create", "--save-as", "a/b", "--dir"])
        .arg(td.path())
        .output()
        .expect("spawn binary");
    assert!(!out.status.success());
}
