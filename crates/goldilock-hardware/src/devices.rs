//! Enum wrappers for device dispatch.
//!
//! Native `async fn` in traits is not object-safe, so `Box<dyn EdgeSource>`
//! is not available. These enums give the reader manager and the door
//! controller one concrete type per device role while keeping static
//! dispatch.
//!
//! # Examples
//!
//! ```
//! use goldilock_hardware::devices::AnyEdgeSource;
//! use goldilock_hardware::mock::MockWiegandReader;
//!
//! let (reader, _handle) = MockWiegandReader::new();
//! let source = AnyEdgeSource::from(reader);
//! ```

use crate::line::LineEdgeSource;
use crate::mock::{MockRelay, MockWiegandReader};
use crate::traits::{EdgeSource, LockActuator};
use crate::{DeviceInfo, RelayState, Result};
use goldilock_core::EdgeKind;
use std::time::Duration;

/// Enum wrapper for edge source dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyEdgeSource {
    /// Mock reader driven through a handle.
    Mock(MockWiegandReader),

    /// Frames read as text lines.
    Lines(LineEdgeSource),
}

impl EdgeSource for AnyEdgeSource {
    async fn next_edge(&mut self) -> Result<Option<EdgeKind>> {
        match self {
            Self::Mock(device) => device.next_edge().await,
            Self::Lines(device) => device.next_edge().await,
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
            Self::Lines(device) => device.get_info().await,
        }
    }
}

impl From<MockWiegandReader> for AnyEdgeSource {
    fn from(device: MockWiegandReader) -> Self {
        Self::Mock(device)
    }
}

impl From<LineEdgeSource> for AnyEdgeSource {
    fn from(device: LineEdgeSource) -> Self {
        Self::Lines(device)
    }
}

/// Enum wrapper for lock actuator dispatch.
///
/// # Examples
///
/// ```
/// use goldilock_hardware::devices::AnyLockActuator;
/// use goldilock_hardware::traits::LockActuator;
/// use goldilock_hardware::mock::MockRelay;
///
/// let (relay, _handle) = MockRelay::new();
/// let lock = AnyLockActuator::Mock(relay);
/// assert!(!lock.state().is_energized());
/// ```
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyLockActuator {
    /// Mock relay for development and testing.
    Mock(MockRelay),
    // TODO: GPIO relay variant once a pin-control crate is chosen for the target board.
}

impl LockActuator for AnyLockActuator {
    async fn release(&mut self, hold: Duration) -> Result<()> {
        match self {
            Self::Mock(device) => device.release(hold).await,
        }
    }

    fn state(&self) -> RelayState {
        match self {
            Self::Mock(device) => device.state(),
        }
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        match self {
            Self::Mock(device) => device.get_info().await,
        }
    }
}

impl From<MockRelay> for AnyLockActuator {
    fn from(device: MockRelay) -> Self {
        Self::Mock(device)
    }
}
