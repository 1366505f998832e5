//! Configuration loading and data folder resolution
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! Levels 1 and 2 arrive together as [`ConfigOverrides`], the service's CLI
//! parser reads both.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PRODUCTS_FILE: &str = "products.json";
pub const DEFAULT_LIVE_PRODUCTS_FILE: &str = "liveProducts.json";
pub const DEFAULT_SSE_KEEPALIVE_SECS: u64 = 15;

/// Directory name used under the platform config/data folders
const APP_DIR: &str = "catalog-live";

/// Contents of the optional `config.toml`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_folder: Option<PathBuf>,
    pub products_file: Option<String>,
    pub live_products_file: Option<String>,
    pub sse_keepalive_secs: Option<u64>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_folder: Option<PathBuf>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub data_folder: PathBuf,
    pub products_file: String,
    pub live_products_file: String,
    pub sse_keepalive: Duration,
}

impl ServiceConfig {
    /// Merge overrides, file settings and compiled defaults
    pub fn resolve(overrides: &ConfigOverrides, file: Option<&TomlConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();

        Self {
            host: overrides
                .host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            data_folder: overrides
                .data_folder
                .clone()
                .or(file.data_folder)
                .unwrap_or_else(default_data_folder),
            products_file: file
                .products_file
                .unwrap_or_else(|| DEFAULT_PRODUCTS_FILE.to_string()),
            live_products_file: file
                .live_products_file
                .unwrap_or_else(|| DEFAULT_LIVE_PRODUCTS_FILE.to_string()),
            sse_keepalive: Duration::from_secs(
                file.sse_keepalive_secs
                    .unwrap_or(DEFAULT_SSE_KEEPALIVE_SECS)
                    .max(1),
            ),
        }
    }

    /// Backing file of the record store
    pub fn products_path(&self) -> PathBuf {
        self.data_folder.join(&self.products_file)
    }

    /// Backing file of the live submission buffer
    pub fn live_products_path(&self) -> PathBuf {
        self.data_folder.join(&self.live_products_file)
    }

    /// `host:port` for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Create the data folder if missing
    pub fn ensure_data_folder(&self) -> Result<()> {
        if !self.data_folder.exists() {
            std::fs::create_dir_all(&self.data_folder)?;
            info!("Created data folder: {}", self.data_folder.display());
        }
        Ok(())
    }
}

/// Load `config.toml`.
///
/// An explicitly requested file must exist and parse. The default location
/// is optional: when absent, defaults are used and a warning is logged.
pub fn load_toml_config(explicit: Option<&Path>) -> Result<Option<TomlConfig>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => {
                warn!("No config file found, using defaults");
                return Ok(None);
            }
        },
    };

    let content = std::fs::read_to_string(&path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    let config = toml::from_str::<TomlConfig>(&content)
        .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(Some(config))
}

/// Platform config file location, e.g. `~/.config/catalog-live/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("./catalog_data"))
}
