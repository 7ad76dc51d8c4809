//! Configuration loading and parsing.
//!
//! ```toml
//! location = "lab-north"
//!
//! [reader]
//! idle_ticks = 25
//! tick_interval_ms = 1
//!
//! [door]
//! unlock_hold_ms = 5000
//!
//! [[credentials]]
//! name = "Alice"
//! facility_code = 7
//! card_code = 4660
//! ```

use anyhow::{Context, Result};
use goldilock_core::constants::{
    DEFAULT_EVENT_CHANNEL_CAPACITY, DEFAULT_IDLE_TICKS, DEFAULT_TICK_INTERVAL_MS,
    DEFAULT_UNLOCK_HOLD_MS,
};
use goldilock_door::{AllowEntry, AllowList, DoorConfig};
use goldilock_hardware::ReaderConfig;
use goldilock_wiegand::FormatCatalog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main application configuration (loaded from goldilock.toml)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub reader: ReaderSection,
    #[serde(default)]
    pub door: DoorSection,
    /// Replaces the built-in catalog when present. Order is priority.
    #[serde(default)]
    pub formats: Option<FormatCatalog>,
    #[serde(default)]
    pub credentials: Vec<AllowEntry>,
}

fn default_location() -> String {
    "door".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReaderSection {
    #[serde(default = "default_idle_ticks")]
    pub idle_ticks: u32,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
    /// Pause between lines when frames are read as text.
    #[serde(default = "default_line_gap_ms")]
    pub line_gap_ms: u64,
}

fn default_idle_ticks() -> u32 {
    DEFAULT_IDLE_TICKS
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_channel_capacity() -> usize {
    DEFAULT_EVENT_CHANNEL_CAPACITY
}

fn default_line_gap_ms() -> u64 {
    100
}

impl Default for ReaderSection {
    fn default() -> Self {
        Self {
            idle_ticks: default_idle_ticks(),
            tick_interval_ms: default_tick_interval_ms(),
            channel_capacity: default_channel_capacity(),
            line_gap_ms: default_line_gap_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DoorSection {
    #[serde(default = "default_unlock_hold_ms")]
    pub unlock_hold_ms: u64,
}

fn default_unlock_hold_ms() -> u64 {
    DEFAULT_UNLOCK_HOLD_MS
}

impl Default for DoorSection {
    fn default() -> Self {
        Self {
            unlock_hold_ms: default_unlock_hold_ms(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            reader: ReaderSection::default(),
            door: DoorSection::default(),
            formats: None,
            credentials: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Format catalog to resolve against.
    pub fn catalog(&self) -> FormatCatalog {
        self.formats.clone().unwrap_or_default()
    }

    pub fn reader_config(&self) -> ReaderConfig {
        ReaderConfig::default()
            .idle_ticks(self.reader.idle_ticks)
            .tick_interval(Duration::from_millis(self.reader.tick_interval_ms))
            .channel_capacity(self.reader.channel_capacity)
    }

    pub fn line_gap(&self) -> Duration {
        Duration::from_millis(self.reader.line_gap_ms)
    }

    pub fn door_config(&self) -> DoorConfig {
        DoorConfig::default()
            .location(self.location.clone())
            .unlock_hold(Duration::from_millis(self.door.unlock_hold_ms))
    }

    pub fn allow_list(&self) -> AllowList {
        AllowList::new(self.credentials.clone())
    }
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<AppConfig> {
    toml::from_str(content).context("Invalid configuration")
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Load `explicit` if given, else the default path if it exists, else defaults.
pub fn resolve_config(explicit: Option<&Path>, default_path: &Path) -> Result<AppConfig> {
    match explicit {
        Some(path) => load_config(path),
        None if default_path.exists() => load_config(default_path),
        None => Ok(AppConfig::default()),
    }
}
