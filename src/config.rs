use anyhow::Context;
use config::{Config, ConfigError, Environment, File, FileFormat};
use gridwalk_navigation::FollowerConfig;
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Everything the application reads at start-up.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub map: MapSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub follower: FollowerConfig,
    #[serde(default)]
    pub sim: SimSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapSettings {
    /// Tile edge length in world units
    #[serde(default = "default_spacing")]
    pub spacing: f32,
    #[serde(default)]
    pub origin_x: f32,
    #[serde(default)]
    pub origin_y: f32,
    #[serde(default = "default_hurdle_cost")]
    pub hurdle_cost: u32,
    /// Tile rows, top row first: `.` open, `#` wall, `~` forest
    #[serde(default)]
    pub layout: Vec<String>,
    /// When set, replaces `layout` with a seeded scatter
    #[serde(default)]
    pub random: Option<RandomMapSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomMapSettings {
    pub width: usize,
    pub height: usize,
    pub blocked_ratio: f64,
    pub hurdle_ratio: f64,
    pub seed: u64,
}

/// Start cell of the agent.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AgentSettings {
    pub start_x: usize,
    pub start_y: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Navigation tick rate in Hz
    pub tick_hz: f32,
    /// Pixels per tile in the visualization
    pub tile_px: f32,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self { tick_hz: 60.0, tile_px: 48.0 }
    }
}

fn default_spacing() -> f32 {
    1.0
}

fn default_hurdle_cost() -> u32 {
    5
}

fn env_overlay() -> Environment {
    Environment::with_prefix("GRIDWALK").separator("__").try_parsing(true)
}

pub fn load_config() -> Result<Config, ConfigError> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(true))
        .add_source(env_overlay())
        .build();

    match settings {
        Ok(config) => {
            info!("Successfully loaded configuration");
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

/// Loads and validates the settings from the default file plus `GRIDWALK__*` overrides.
pub fn load_settings() -> anyhow::Result<Settings> {
    let config = load_config().context("loading configuration")?;
    into_settings(config)
}

fn into_settings(config: Config) -> anyhow::Result<Settings> {
    let settings: Settings = config.try_deserialize().context("deserializing settings")?;
    settings.follower.validate().context("invalid [follower] settings")?;
    if !(settings.sim.tick_hz.is_finite() && settings.sim.tick_hz > 0.0) {
        anyhow::bail!("sim.tick_hz must be positive, got {}", settings.sim.tick_hz);
    }
    Ok(settings)
}

#[cfg(test)]
pub fn settings_from_str(toml: &str) -> anyhow::Result<Settings> {
    let config = Config::builder().add_source(File::from_str(toml, FileFormat::Toml)).build()?;
    into_settings(config)
}
