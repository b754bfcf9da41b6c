//! Configuration file support.
//!
//! Settings are read from `~/.config/particle-playground/config.toml` (or a path
//! given on the command line). Missing files fall back to defaults, and
//! out-of-range values are clamped with a warning rather than rejected.

pub mod enums;
pub mod keybindings;
pub mod types;

pub use enums::{ColorMode, ColorSpec, SpawnMode};
pub use keybindings::{Action, KeyBinding, KeybindingsConfig};
pub use types::{HistoryConfig, InteractionConfig, SessionConfig, SpawnConfig};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure.
///
/// # Example TOML
/// ```toml
/// [spawn]
/// default_size = 10.0
/// default_mass = 1.0
/// mode = "stream"
/// stream_rate = 20.0
///
/// [interaction]
/// removal_radius_px = 30.0
///
/// [history]
/// capacity = 100
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub spawn: SpawnConfig,

    #[serde(default)]
    pub interaction: InteractionConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

/// Clamps `value` into `[min, max]`, logging when it had to move.
fn clamp_logged(name: &str, value: &mut f32, min: f32, max: f32) {
    if !(min..=max).contains(value) {
        warn!(
            "Invalid {} {:.2}, clamping to {:.1}-{:.1} range",
            name, *value, min, max
        );
        *value = if value.is_nan() {
            min
        } else {
            value.clamp(min, max)
        };
    }
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    pub fn validate_and_clamp(&mut self) {
        let spawn = &mut self.spawn;
        clamp_logged("min_size", &mut spawn.min_size, 0.5, 100.0);
        clamp_logged("max_size", &mut spawn.max_size, spawn.min_size, 1000.0);
        clamp_logged(
            "default_size",
            &mut spawn.default_size,
            spawn.min_size,
            spawn.max_size,
        );
        clamp_logged("default_mass", &mut spawn.default_mass, 0.001, 10_000.0);
        clamp_logged("stream_rate", &mut spawn.stream_rate, 1.0, 120.0);
        clamp_logged("draw_step", &mut spawn.draw_step, 1.0, 500.0);
        clamp_logged("shape_length", &mut spawn.shape_length, 5.0, 1000.0);
        clamp_logged("velocity_scale", &mut spawn.velocity_scale, 0.0, 20.0);

        if !(3..=12).contains(&spawn.shape_sides) {
            warn!(
                "Invalid shape_sides {}, clamping to 3-12 range",
                spawn.shape_sides
            );
            spawn.shape_sides = spawn.shape_sides.clamp(3, 12);
        }

        let interaction = &mut self.interaction;
        clamp_logged(
            "drag_threshold_px",
            &mut interaction.drag_threshold_px,
            0.0,
            50.0,
        );
        clamp_logged(
            "removal_radius_px",
            &mut interaction.removal_radius_px,
            1.0,
            500.0,
        );
        clamp_logged(
            "pick_tolerance_px",
            &mut interaction.pick_tolerance_px,
            0.0,
            100.0,
        );
        clamp_logged("throw_scale", &mut interaction.throw_scale, 0.0, 10.0);

        if !(1..=1000).contains(&self.history.capacity) {
            warn!(
                "Invalid history capacity {}, clamping to 1-1000 range",
                self.history.capacity
            );
            self.history.capacity = self.history.capacity.clamp(1, 1000);
        }
    }

    /// Returns the path to the default configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("particle-playground");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    /// Loads configuration from `path`, or returns defaults if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Serializes the config to TOML at `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, config_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Directory where sessions are stored, honouring `session.storage_dir`.
    pub fn session_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.session.storage_dir {
            return Ok(dir.clone());
        }
        Ok(dirs::data_dir()
            .context("Could not find data directory")?
            .join("particle-playground")
            .join("sessions"))
    }

    /// JSON schema describing the config file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
