//! Data directory layout and `nebula.toml` loading.
//!
//! ```text
//! ~/.nebula/
//! ├── nebula.toml   (optional)
//! └── nebula.db
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;

use nebula_core::EngineConfig;

use crate::error::{Result, StoreError};
use crate::store::Store;

pub const CONFIG_FILE: &str = "nebula.toml";
pub const DB_FILE: &str = "nebula.db";
pub const DEFAULT_COMPANION: &str = "Nebula";

/// Default base directory for all nebula storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".nebula")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Contents of `nebula.toml`. Missing keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Companion used when `--companion` is not given.
    pub companion: Option<String>,
    pub engine: EngineConfig,
}

impl FileConfig {
    pub fn companion_name(&self) -> &str {
        self.companion.as_deref().unwrap_or(DEFAULT_COMPANION)
    }
}

/// Read `<dir>/nebula.toml`. A missing file yields the defaults; a
/// present but invalid one is an error.
pub fn load_config(dir: &Path) -> Result<FileConfig> {
    let path = dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no {} found, using defaults", path.display());
            return Ok(FileConfig::default());
        }
        Err(e) => {
            return Err(StoreError::InvalidData(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<FileConfig> {
    let config: FileConfig = toml::from_str(text)?;
    config.engine.validate()?;
    Ok(config)
}

/// Storage key for a companion name: lowercase, with anything outside
/// `[a-z0-9_-]` replaced by `_`.
pub fn companion_key(name: &str) -> String {
    let key: String = name
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if key.is_empty() {
        companion_key(DEFAULT_COMPANION)
    } else {
        key
    }
}

/// Open `<dir>/nebula.db`, creating the directory as needed.
pub fn open_store(dir: &Path) -> Result<Store> {
    fs::create_dir_all(dir).map_err(|e| {
        StoreError::InvalidData(format!("failed to create {}: {e}", dir.display()))
    })?;
    Store::open(&dir.join(DB_FILE))
}
