//! Configuration for the Area hints layer
//!
//! Loads configuration from TOML file at `~/.config/area/hints.toml`
//! Auto-generates default config file on first run if missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::wm::properties::WindowAction;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub icons: IconConfig,
    pub screens: ScreenConfig,
    pub actions: ActionsConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        let config = Self::load_from(&config_path)?;
        info!("Configuration loaded from {:?}", config_path);
        debug!("Config: {:?}", config);
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Get the path to the config file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("area");

        Ok(config_dir.join("hints.toml"))
    }

    /// Save default configuration to file
    fn save_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_string =
            toml::to_string_pretty(&Self::default()).context("Failed to serialize default config")?;
        fs::write(path, toml_string).context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// Icon rendering for panels and switchers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    /// Icon edge length in logical pixels
    pub launcher_icon_size: u32,
    /// Multiplier applied on top of the launcher size
    pub zoom_scale: f32,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            launcher_icon_size: 32,
            zoom_scale: 1.0,
        }
    }
}

impl IconConfig {
    /// Rendered edge length in pixels, at least 1.
    pub fn icon_size(&self) -> u32 {
        let size = (self.launcher_icon_size as f32 * self.zoom_scale).round();
        if size.is_finite() && size >= 1.0 { size as u32 } else { 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Scale factor shared by all outputs
    pub scale: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Actions advertised in `_NET_WM_ALLOWED_ACTIONS` for ordinary windows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    pub allowed: Vec<WindowAction>,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            allowed: vec![
                WindowAction::Move,
                WindowAction::Resize,
                WindowAction::Minimize,
                WindowAction::MaximizeHorz,
                WindowAction::MaximizeVert,
                WindowAction::Fullscreen,
                WindowAction::Close,
            ],
        }
    }
}
