//! Config module.
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{CONFIG_ENV, default_channel_dir, default_config_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel, default_creator};
pub use validate::MAX_CONNECT_TIMEOUT;
pub use xml::{load_config, load_config_from_xml_path};
