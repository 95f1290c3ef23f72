//! Configuration loading and config file resolution
//!
//! Config file location follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/reel/<module>.toml`)
//! 4. System-wide `/etc/reel/<module>.toml` (Linux only)

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Resolves the config file for one REEL module
#[derive(Debug, Clone)]
pub struct ConfigPathResolver {
    module_name: String,
    env_var_name: String,
}

impl ConfigPathResolver {
    pub fn new(module_name: impl Into<String>, env_var_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            env_var_name: env_var_name.into(),
        }
    }

    /// Resolve config file path using the priority order documented above
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Result<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            debug!(path = %path.display(), "Config path from command line");
            return Ok(path.to_path_buf());
        }

        // Priority 2: Environment variable (empty values are ignored)
        if let Ok(value) = std::env::var(&self.env_var_name) {
            if !value.trim().is_empty() {
                debug!(env = %self.env_var_name, path = %value, "Config path from environment");
                return Ok(PathBuf::from(value));
            }
        }

        // Priority 3/4: platform locations, first existing wins
        let candidates = self.default_locations();
        for candidate in &candidates {
            if candidate.exists() {
                debug!(path = %candidate.display(), "Config path from default location");
                return Ok(candidate.clone());
            }
        }

        Err(Error::Config(format!(
            "No config file found for {}. \
             Pass a path on the command line, set {}, or create one of: {}",
            self.module_name,
            self.env_var_name,
            candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }

    /// Default config file locations for the current platform, in priority order
    pub fn default_locations(&self) -> Vec<PathBuf> {
        let file_name = format!("{}.toml", self.module_name);
        let mut locations = Vec::new();

        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("reel").join(&file_name));
        }

        if cfg!(target_os = "linux") {
            locations.push(PathBuf::from("/etc/reel").join(&file_name));
        }

        locations
    }
}

/// Read and parse a TOML file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Resolve `path` against the directory holding `config_file` when it is relative
pub fn resolve_relative_to(config_file: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }

    match config_file.parent() {
        Some(dir) => dir.join(path),
        None => path.to_path_buf(),
    }
}
