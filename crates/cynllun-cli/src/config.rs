//! Configuration file management for cynllun.
//!
//! Provides a TOML-based config file at `~/.config/cynllun/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use cynllun_core::leads::LeadStore;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub leads: LeadsSection,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ServiceSection {
    /// Anthropic API key for the generation service.
    #[serde(default)]
    pub api_key: String,
    /// Model override; empty means the built-in default.
    #[serde(default)]
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct LeadsSection {
    /// Path to the lead-capture JSON file; empty means `leads.json` in the
    /// working directory.
    #[serde(default)]
    pub path: String,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the cynllun config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/cynllun` or `~/.config/cynllun`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("cynllun");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("cynllun")
}

/// Return the path to the cynllun config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix (the file holds an API key).
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct CynllunConfig {
    /// API key for the generation service; `None` when unconfigured.
    /// A missing key is not an error here -- generation actions surface it
    /// as a service-unavailable failure at call time.
    pub api_key: Option<String>,
    /// Model override; `None` means the gateway default.
    pub model: Option<String>,
    pub lead_store: LeadStore,
}

impl CynllunConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config
    /// file > default.
    ///
    /// - API key: `cli_api_key` > `ANTHROPIC_API_KEY` env > `service.api_key`
    /// - Model: `CYNLLUN_MODEL` env > `service.model` > built-in default
    /// - Lead path: `CYNLLUN_LEADS_PATH` env > `leads.path` > `leads.json`
    pub fn resolve(cli_api_key: Option<&str>) -> Self {
        let file_config = load_config().ok();

        let api_key = cli_api_key
            .map(str::to_string)
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .or_else(|| {
                file_config
                    .as_ref()
                    .map(|cfg| cfg.service.api_key.clone())
            })
            .filter(|key| !key.trim().is_empty());

        let model = std::env::var("CYNLLUN_MODEL")
            .ok()
            .or_else(|| file_config.as_ref().map(|cfg| cfg.service.model.clone()))
            .filter(|m| !m.trim().is_empty());

        let lead_path = std::env::var("CYNLLUN_LEADS_PATH")
            .ok()
            .or_else(|| file_config.as_ref().map(|cfg| cfg.leads.path.clone()))
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| "leads.json".to_string());

        Self {
            api_key,
            model,
            lead_store: LeadStore::new(lead_path),
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
