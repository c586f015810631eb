//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Unknown fields are rejected so typos surface instead of being ignored.
//! - Blank elements fall back to the default for that field.

use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use super::paths::default_config_path;
use super::types::{Config, LogLevel};
use crate::errors::{LogRelayError, Result};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    directory: Option<String>,
    channel_dir: Option<String>,
    #[serde(default, deserialize_with = "de_u64_trimmed_opt")]
    connect_timeout_ms: Option<u64>,
    #[serde(default, deserialize_with = "de_bool_trimmed_opt")]
    include_timestamp: Option<bool>,
    creator: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

// Trim surrounding whitespace; a blank element means "not set".
fn trimmed(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn de_u64_trimmed_opt<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match trimmed(opt) {
        None => Ok(None),
        Some(s) => s.parse::<u64>().map(Some).map_err(serde::de::Error::custom),
    }
}

fn de_bool_trimmed_opt<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match trimmed(opt).as_deref() {
        None => Ok(None),
        Some("true" | "1" | "yes") => Ok(Some(true)),
        Some("false" | "0" | "no") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!("invalid boolean '{other}'"))),
    }
}

// Map XmlConfig -> Config, leaving defaults where the file is silent.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(dir) = trimmed(parsed.directory) {
        cfg.directory = PathBuf::from(dir);
    }
    if let Some(dir) = trimmed(parsed.channel_dir) {
        cfg.channel_dir = PathBuf::from(dir);
    }
    if let Some(ms) = parsed.connect_timeout_ms {
        cfg.connect_timeout = Duration::from_millis(ms);
    }
    if let Some(flag) = parsed.include_timestamp {
        cfg.include_timestamp = flag;
    }
    if let Some(creator) = trimmed(parsed.creator) {
        cfg.creator = creator;
    }
    if let Some(level) = trimmed(parsed.log_level) {
        cfg.log_level = level.parse::<LogLevel>().map_err(LogRelayError::Config)?;
    }
    cfg.log_file = trimmed(parsed.log_file).map(PathBuf::from);

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .map_err(|e| LogRelayError::Config(format!("read config xml '{}': {e}", path.display())))?;
    let parsed: XmlConfig = if contents.trim().is_empty() {
        XmlConfig::default()
    } else {
        from_xml_str(&contents).map_err(|e| {
            LogRelayError::Config(format!("parse config xml '{}': {e}", path.display()))
        })?
    };
    let cfg = xml_to_config(parsed)?;
    debug!(path = %path.display(), "Loaded config xml");
    Ok(cfg)
}

/// Resolve the effective config.
///
/// Order: `explicit` path (must exist), then `$LOG_RELAY_CONFIG` / the
/// platform default (used only if the file exists), then built-in defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return load_config_from_xml_path(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => {
            info!(path = %path.display(), "Using config file");
            load_config_from_xml_path(&path)
        }
        _ => {
            debug!("No config file found; using defaults");
            Ok(Config::default())
        }
    }
}
