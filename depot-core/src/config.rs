use std::{fs, io, path::Path};

use depot_utils::TimeSpan;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../../package-content/depot_config.json5");

/// Errors while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file couldn't be read or written.
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    /// The file isn't valid JSON5 or doesn't match the schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json5::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Simulation settings, loaded from `depot_config.json5`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DepotConfig {
    /// Steps per second.
    pub tick_rate: u32,
    /// Disposal unit defaults.
    #[serde(default)]
    pub disposal: DisposalConfig,
}

/// Defaults applied to every disposal unit on initialisation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisposalConfig {
    /// How long a unit shows as flushed before it starts charging.
    pub flush_delay: TimeSpan,
    /// Whether units flush on their own.
    pub automatic_engage: bool,
    /// Delay of the automatic flush.
    pub automatic_engage_time: TimeSpan,
    /// Time to climb in.
    pub entry_delay: TimeSpan,
    /// Time to put someone else in.
    pub dragged_entry_delay: TimeSpan,
}

impl DepotConfig {
    /// Loads the config at `path`, writing the default one first if there is none.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let config_str = fs::read_to_string(path)?;
            let config = Self::from_json5(&config_str)?;
            log::info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG)?;
        log::info!("Wrote default config to {}", path.display());
        Ok(Self::default())
    }

    /// Parses and validates a config.
    pub fn from_json5(config_str: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json5::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=1000).contains(&self.tick_rate) {
            return Err(ConfigError::Invalid("Tick rate must be in range 1..1000"));
        }
        let disposal = &self.disposal;
        if disposal.flush_delay < TimeSpan::ZERO {
            return Err(ConfigError::Invalid("Flush delay must not be negative"));
        }
        if disposal.flush_delay > crate::disposal::pressure::pressurize_time() {
            return Err(ConfigError::Invalid("Flush delay must not exceed the pressurize time"));
        }
        if disposal.automatic_engage_time < TimeSpan::ZERO {
            return Err(ConfigError::Invalid("Automatic engage time must not be negative"));
        }
        Ok(())
    }

    /// Length of one simulation step.
    #[must_use]
    pub fn tick_period(&self) -> TimeSpan {
        TimeSpan::from_secs_f64(1.0 / f64::from(self.tick_rate))
    }
}

impl Default for DepotConfig {
    fn default() -> Self {
        Self {
            tick_rate: 20,
            disposal: DisposalConfig::default(),
        }
    }
}

impl Default for DisposalConfig {
    fn default() -> Self {
        Self {
            flush_delay: TimeSpan::from_secs(3),
            automatic_engage: true,
            automatic_engage_time: TimeSpan::from_secs(30),
            entry_delay: TimeSpan::from_millis(500),
            dragged_entry_delay: TimeSpan::from_secs(2),
        }
    }
}
