//! Common types shared across reader and lock implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "Front door reader", "Mock Relay").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional physical attachment, such as a GPIO pin pair.
    pub attachment: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            attachment: None,
        }
    }

    /// Set where the device is attached.
    pub fn with_attachment(mut self, attachment: impl Into<String>) -> Self {
        self.attachment = Some(attachment.into());
        self
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.model)?;
        if let Some(attachment) = &self.attachment {
            write!(f, " on {attachment}")?;
        }
        Ok(())
    }
}

/// Output state of the lock relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayState {
    /// Relay off, door locked.
    Released,

    /// Relay driven, door unlocked.
    Energized,
}

impl RelayState {
    pub fn is_energized(self) -> bool {
        matches!(self, Self::Energized)
    }
}
