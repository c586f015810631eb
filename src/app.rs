//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! and runs the selected subcommand.

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use log_relay::cli::{Args, Command};
use log_relay::output as out;
use log_relay::{
    ChannelListener, Config, DirectoryChange, LogRelayError, LogService, NotifyOutcome, SaveOutcome,
    default_config_path, load_config, shutdown,
};

use crate::logging::init_tracing;

/// How often the listen loop checks the shutdown flag.
const LISTEN_POLL: Duration = Duration::from_millis(200);

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle print-config before logging init
    if let Command::PrintConfig = args.command {
        print_config(&args);
        return Ok(());
    }

    let mut cfg = load_config(args.config.as_deref()).inspect_err(|e| {
        out::print_error(&e.to_string());
    })?;
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {e}"));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; shutting down gracefully...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .context("failed to install signal handler")?;
    }

    debug!(?args, "Starting log_relay");

    let result = match &args.command {
        Command::Listen { name, once } => listen(&cfg, name, *once),
        Command::Create {
            messages,
            set_dir,
            save_as,
            ..
        } => create(cfg, messages, set_dir.as_deref(), save_as.as_deref()),
        Command::PrintConfig => Ok(()),
    };

    if let Err(e) = &result {
        report_failure(e);
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }

    result
}

fn print_config(args: &Args) {
    if let Some(p) = &args.config {
        out::print_info(&format!("Using config from --config:\n  {}", p.display()));
        return;
    }
    match default_config_path() {
        Some(p) => {
            out::print_info(&format!("log_relay config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file exists there; built-in defaults are used.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

/// Bind the channel and print each announced path until ctrl-c (or the first one with `once`).
fn listen(cfg: &Config, name: &str, once: bool) -> Result<()> {
    let listener = ChannelListener::bind(&cfg.channel_dir, name)
        .with_context(|| format!("bind channel '{name}' in {}", cfg.channel_dir.display()))?;
    let endpoint = listener.endpoint().to_path_buf();
    info!(channel = name, endpoint = %endpoint.display(), "Listening");

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("log-relay-accept".into())
        .spawn(move || {
            loop {
                match listener.accept_path() {
                    Ok(path) => {
                        if tx.send(path).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Channel accept failed");
                        break;
                    }
                }
            }
        })
        .context("spawn accept thread")?;

    let outcome = loop {
        if shutdown::is_requested() {
            break Ok(());
        }
        match rx.recv_timeout(LISTEN_POLL) {
            Ok(path) => {
                out::print_user(&path.display().to_string());
                if once {
                    break Ok(());
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => {
                break Err(anyhow::anyhow!("channel listener stopped"));
            }
        }
    };

    // The accept thread may still be blocked holding the listener.
    #[cfg(unix)]
    let _ = std::fs::remove_file(&endpoint);
    outcome
}

/// Create a log file, append messages, then apply the requested relocations.
fn create(
    cfg: Config,
    messages: &[String],
    set_dir: Option<&Path>,
    save_as: Option<&str>,
) -> Result<()> {
    let svc = LogService::open(cfg)?;
    info!(path = %svc.file_path().display(), "Log file created");

    for msg in messages {
        svc.write_line(msg)?;
    }

    let mut pending = false;
    if let Some(dir) = set_dir {
        match svc.set_directory(dir)? {
            DirectoryChange::Saved(outcome) => report_save(&outcome),
            DirectoryChange::Pending(dir) => {
                debug!(dir = %dir.display(), "Directory pending");
                pending = true;
            }
        }
    }

    if let Some(name) = save_as {
        report_save(&svc.save_as(name)?);
    } else if pending {
        report_save(&svc.save()?);
    }

    if shutdown::is_requested() {
        bail!("interrupted");
    }
    let identity = svc.close();
    out::print_user(&identity.full_path.display().to_string());
    Ok(())
}

fn report_save(outcome: &SaveOutcome) {
    let path = &outcome.identity().full_path;
    match outcome.notice() {
        Some(NotifyOutcome::Delivered { channel, retried }) => {
            info!(path = %path.display(), channel, retried, "Relocated; listener notified")
        }
        Some(NotifyOutcome::NoListener) => info!(path = %path.display(), "Relocated; no listener"),
        Some(NotifyOutcome::Undelivered) => {
            warn!(path = %path.display(), "Relocated; listener did not receive the new path")
        }
        None => debug!(path = %path.display(), "Already saved at target"),
    }
    if let Some(w) = outcome.warning() {
        out::print_warn(&w.to_string());
    }
}

fn report_failure(e: &anyhow::Error) {
    let Some(lr) = e.downcast_ref::<LogRelayError>() else {
        error!(error = ?e, "Command failed");
        return;
    };
    let code = lr.code();
    let kind = lr.kind();
    match lr {
        LogRelayError::AlreadyExists(path) | LogRelayError::Conflict(path) => {
            error!(code, kind, path = %path.display(), "Refusing to overwrite an existing file")
        }
        LogRelayError::DirectoryCreate { path, source } => {
            error!(
                code,
                kind,
                path = %path.display(),
                error = %source,
                "Could not create directory"
            )
        }
        LogRelayError::InvalidName(name) => error!(code, kind, name = %name, "Invalid file name"),
        LogRelayError::Io { op, path, .. } => {
            error!(code, kind, op = *op, path = %path.display(), error = %lr, "I/O failure")
        }
        LogRelayError::Config(msg) => error!(code, kind, %msg, "Invalid configuration"),
    }
}
