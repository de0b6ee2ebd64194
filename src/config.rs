//! Configuration for the TrigIO daemon
//!
//! Loads configuration from a TOML file with the minimal parameters needed
//! to bind the service and construct the output driver.

use crate::error::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Options forwarded verbatim to the driver factory
pub type DriverOptions = HashMap<String, String>;

/// Top-level daemon configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// UDP port to listen on
    pub port: u16,
    /// Output driver identifier (e.g. "dummy", "leonardo", "uno")
    pub driver: String,
    /// Driver-specific options (serial drivers require "port", accept "baud")
    #[serde(default)]
    pub options: DriverOptions,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }
}
