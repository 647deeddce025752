use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transport::{TransportOptions, DEFAULT_CHUNK_SIZE};

pub const DEFAULT_REGION: &str = "virginia";
pub const DEFAULT_INDEX_URL: &str = "https://download.geofabrik.de/north-america/us.html";
pub const DEFAULT_FILE_BASE_URL: &str = "https://download.geofabrik.de/north-america/us";
pub const DEFAULT_DATA_DIR: &str = "../data";

/// Settings loaded from `~/.config/osmget/config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsmgetConfig {
    /// Region fetched when none is given on the command line.
    pub region: String,
    /// HTML page listing per-region `<region>-latest.osm.pbf` links.
    pub index_url: String,
    /// Directory URL the extract is downloaded from; the file name is appended.
    pub file_base_url: String,
    /// Local directory the extract is written to (created if missing).
    pub data_dir: PathBuf,
    /// Maximum bytes per body chunk.
    pub chunk_size: usize,
    /// Report a short body as truncated instead of success.
    pub verify_length: bool,
    pub connect_timeout_secs: u64,
}

impl Default for OsmgetConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            file_base_url: DEFAULT_FILE_BASE_URL.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify_length: true,
            connect_timeout_secs: 30,
        }
    }
}

impl OsmgetConfig {
    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            chunk_size: self.chunk_size,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("osmget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<OsmgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = OsmgetConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<OsmgetConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: OsmgetConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
