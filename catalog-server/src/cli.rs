//! Command-line arguments
//!
//! Every flag falls back to an environment variable; anything left unset is
//! taken from the TOML config file, then from compiled defaults.

use catalog_common::config::{load_toml_config, ConfigOverrides, ServiceConfig};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-server", version, about = "Live product catalog service")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "CATALOG_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "CATALOG_PORT")]
    pub port: Option<u16>,

    /// Folder holding the catalog and live submission files
    #[arg(long, env = "CATALOG_DATA_FOLDER")]
    pub data_folder: Option<PathBuf>,

    /// Path to config.toml (defaults to the platform config folder)
    #[arg(long, env = "CATALOG_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            data_folder: self.data_folder.clone(),
        }
    }

    /// Resolve the full service configuration
    pub fn load_config(&self) -> catalog_common::Result<ServiceConfig> {
        let file = load_toml_config(self.config.as_deref())?;
        Ok(ServiceConfig::resolve(&self.overrides(), file.as_ref()))
    }
}
