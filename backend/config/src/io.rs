//! Config file read/write with a single rolling backup.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::schema::GateFileConfig;

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigIoError {
    #[error("failed to read config file {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config TOML at {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("failed to serialize config to TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("failed to write config file {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

/// Resolves the gate's config directory. Priority: `CMDGATE_CONFIG_DIR` env
/// var, then `~/.cmdgate`, falling back to a relative `.cmdgate` when no
/// home directory can be determined.
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CMDGATE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir().map(|home| home.join(".cmdgate")).unwrap_or_else(|| PathBuf::from(".cmdgate"))
}

pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Loads and parses the config file. Returns the all-`None` default when
/// the file doesn't exist yet — a missing config is a first-run state, not
/// an error.
pub async fn load_config(path: &Path) -> Result<GateFileConfig, ConfigIoError> {
    if !path.exists() {
        debug!(path = %path.display(), "config file does not exist; using built-in defaults");
        return Ok(GateFileConfig::default());
    }

    let raw = fs::read_to_string(path).await.map_err(|source| ConfigIoError::Read { path: path.to_path_buf(), source })?;
    let config: GateFileConfig =
        toml::from_str(&raw).map_err(|source| ConfigIoError::Parse { path: path.to_path_buf(), source })?;

    info!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Writes the config atomically (temp file + rename), keeping a single
/// `.bak` copy of whatever was there before.
pub async fn write_config(config: &GateFileConfig, path: &Path) -> Result<(), ConfigIoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.map_err(|source| ConfigIoError::Write { path: parent.to_path_buf(), source })?;
    }

    if path.exists() {
        let backup = path.with_extension("toml.bak");
        if let Err(e) = fs::copy(path, &backup).await {
            warn!(path = %backup.display(), error = %e, "failed to write config backup");
        }
    }

    let rendered = toml::to_string_pretty(config)?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, rendered.as_bytes())
        .await
        .map_err(|source| ConfigIoError::Write { path: tmp_path.clone(), source })?;
    fs::rename(&tmp_path, path).await.map_err(|source| ConfigIoError::Write { path: path.to_path_buf(), source })?;

    info!(path = %path.display(), "wrote config");
    Ok(())
}
