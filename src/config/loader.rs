//! Configuration loading from disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use crate::config::raw::{ParseError, RawConfig};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("parse error in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },
}

/// Read and parse a configuration file.
pub fn load_raw(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    RawConfig::parse(&content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Owner of the most recently loaded [`RawConfig`] and its source path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    raw: RawConfig,
}

impl ConfigStore {
    /// Load the file at `path`.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let raw = load_raw(&path)?;
        Ok(Self { path, raw })
    }

    /// Build a store from already-parsed contents.
    pub fn from_raw(path: impl Into<PathBuf>, raw: RawConfig) -> Self {
        Self {
            path: path.into(),
            raw,
        }
    }

    /// Re-read the file and replace the in-memory contents.
    ///
    /// On error the previous contents are left untouched.
    pub fn reload(&mut self) -> Result<&RawConfig, ConfigError> {
        let raw = load_raw(&self.path)?;
        self.raw = raw;
        Ok(&self.raw)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn raw(&self) -> &RawConfig {
        &self.raw
    }

    /// Typed lookup; absent or unparsable values yield `default`.
    pub fn get<T: FromStr>(&self, section: &str, key: &str, default: T) -> T {
        get(&self.raw, section, key, default)
    }

    pub fn get_str(&self, section: &str, key: &str, default: &str) -> String {
        get_str(&self.raw, section, key, default)
    }

    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        get_bool(&self.raw, section, key, default)
    }

    pub fn get_list(&self, section: &str, key: &str, default: &str) -> Vec<String> {
        get_list(&self.raw, section, key, default)
    }
}

/// Typed lookup into a [`RawConfig`]; absent or unparsable values yield `default`.
pub fn get<T: FromStr>(raw: &RawConfig, section: &str, key: &str, default: T) -> T {
    raw.value(section, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub fn get_str(raw: &RawConfig, section: &str, key: &str, default: &str) -> String {
    raw.value(section, key).unwrap_or(default).to_string()
}

pub fn get_bool(raw: &RawConfig, section: &str, key: &str, default: bool) -> bool {
    match raw.value(section, key).map(|v| v.to_ascii_lowercase()) {
        Some(v) => match v.as_str() {
            "1" | "t" | "true" | "yes" | "y" | "on" => true,
            "0" | "f" | "false" | "no" | "n" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

/// A `|`-separated list; blank items are dropped.
pub fn get_list(raw: &RawConfig, section: &str, key: &str, default: &str) -> Vec<String> {
    raw.value(section, key)
        .unwrap_or(default)
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
