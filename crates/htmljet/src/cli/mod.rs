//! Command implementations.

pub mod cleanup;
pub mod config;
pub mod progress;
pub mod snap;

use htmljet_core::{Config, ConfigError};
use std::path::{Path, PathBuf};

/// Expand a leading `~` in a path argument.
pub fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Load config from `path`, or from the default location when none is given.
///
/// An explicit path must exist; a missing default file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Where `config` subcommands read and write.
pub fn config_path(path: Option<PathBuf>) -> PathBuf {
    path.unwrap_or_else(Config::default_path)
}
