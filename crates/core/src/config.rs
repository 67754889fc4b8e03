//! Application configuration handling.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Directory name under the user's config root.
const CONFIG_DIR: &str = "gamedex";

/// Config file name within [`CONFIG_DIR`].
const CONFIG_FILE: &str = "config.toml";

/// Default upstream catalog endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.curseforge.com/v1";

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# gamedex configuration.
#
# No API key ships with the application; supply yours here or via the
# GAMEDEX_API_KEY environment variable. Without a key the upstream will
# reject requests and the viewer falls back to its offline sample data.

api_base_url = "https://api.curseforge.com/v1"
api_key = ""
"#;

/// Runtime configuration for the catalog client.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Base URL of the upstream catalog API.
    pub api_base_url: String,
    /// Key sent in the `x-api-key` header. Empty disables the header.
    pub api_key: String,
}

impl AppConfig {
    /// Load configuration from defaults, the user config file, and
    /// `GAMEDEX_`-prefixed environment variables, in ascending priority.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load configuration reading the file at an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let settings = Config::builder()
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("api_key", "")?
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("GAMEDEX"))
            .build()
            .context("failed to assemble configuration")?;

        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }
}

/// Location of the user config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write a commented template config if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(&config_path())
}

fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
