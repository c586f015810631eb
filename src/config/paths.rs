//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/channel paths and detects symlinked ancestors for safety.

use dirs::{config_dir, runtime_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LOG_RELAY_CONFIG";

/// Config path: `$LOG_RELAY_CONFIG` if set, else the OS config dir.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(p));
    }
    if let Some(mut base) = config_dir() {
        base.push("log_relay");
        base.push("config.xml");
        Some(base)
    } else {
        env::var("HOME").ok().map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("log_relay")
                .join("config.xml")
        })
    }
}

/// Directory for channel sockets: the user runtime dir when there is one
/// (Linux `$XDG_RUNTIME_DIR`), else the temp dir.
pub fn default_channel_dir() -> PathBuf {
    runtime_dir()
        .unwrap_or_else(env::temp_dir)
        .join("log_relay")
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn channel_dir_is_namespaced() {
        assert!(default_channel_dir().ends_with("log_relay"));
    }

    #[cfg(unix)]
    #[test]
    fn detects_symlinked_parent() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir_all(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert!(path_has_symlink_ancestor(&link.join("diag.log")).unwrap());
        // macOS temp dirs sit behind /var -> /private/var
        let baseline = path_has_symlink_ancestor(&real).unwrap();
        assert_eq!(path_has_symlink_ancestor(&real.join("diag.log")).unwrap(), baseline);
    }
}
