//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::joystick::axis_mapper::MappingProfile;
use crate::joystick::uinput::BUTTON_COUNT;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// UDP listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

/// Sensor-to-axis mapping configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MappingConfig {
    #[serde(default = "default_profile")]
    pub profile: MappingProfile,

    /// Overrides the profile's roll clamp (degrees)
    #[serde(default)]
    pub clamp_range: Option<u8>,

    /// Overrides the profile's roll inversion
    #[serde(default)]
    pub invert_roll: Option<bool>,
}

/// Virtual joystick configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DeviceConfig {
    #[serde(default = "default_device_name")]
    pub name: String,

    #[serde(default = "default_restart_button")]
    pub restart_button: u16,

    #[serde(default = "default_restart_hold_ms")]
    pub restart_hold_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_status_interval_packets")]
    pub status_interval_packets: u64,

    /// Directory for a daily rolling log file, console only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

// Default value functions
fn default_listen_addr() -> String { "0.0.0.0:5005".to_string() }

fn default_profile() -> MappingProfile { MappingProfile::Combined }

fn default_device_name() -> String { "PowerSteer Virtual Joystick".to_string() }
fn default_restart_button() -> u16 { 1 }
fn default_restart_hold_ms() -> u64 { 100 }

fn default_status_interval_packets() -> u64 { 1000 }

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { listen_addr: default_listen_addr() }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            clamp_range: None,
            invert_roll: None,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: default_device_name(),
            restart_button: default_restart_button(),
            restart_hold_ms: default_restart_hold_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            status_interval_packets: default_status_interval_packets(),
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use powersteer_bridge::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed listening address
    ///
    /// # Errors
    ///
    /// Returns `Config` error if `listen_addr` is not `ip:port`
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.network.listen_addr.parse().map_err(|_| {
            BridgeError::Config(format!(
                "listen_addr {:?} is not a valid ip:port address",
                self.network.listen_addr
            ))
        })
    }

    /// Restart button hold time
    pub fn restart_hold(&self) -> Duration {
        Duration::from_millis(self.device.restart_hold_ms)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;

        if let Some(clamp_range) = self.mapping.clamp_range {
            if !(1..=180).contains(&clamp_range) {
                return Err(BridgeError::Config(
                    "clamp_range must be between 1 and 180".to_string(),
                ));
            }
        }

        if self.device.name.trim().is_empty() {
            return Err(BridgeError::Config("device name cannot be empty".to_string()));
        }

        if !(1..=BUTTON_COUNT).contains(&self.device.restart_button) {
            return Err(BridgeError::Config(format!(
                "restart_button must be between 1 and {}",
                BUTTON_COUNT
            )));
        }

        if self.device.restart_hold_ms == 0 || self.device.restart_hold_ms > 10000 {
            return Err(BridgeError::Config(
                "restart_hold_ms must be between 1 and 10000".to_string(),
            ));
        }

        if self.logging.status_interval_packets == 0 {
            return Err(BridgeError::Config(
                "status_interval_packets must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
