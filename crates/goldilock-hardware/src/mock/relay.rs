//! Mock lock relay.
//!
//! Records every release instead of driving a GPIO pin, and can be told to
//! fail so that callers' error paths can be exercised.

use crate::{
    HardwareError, Result,
    traits::LockActuator,
    types::{DeviceInfo, RelayState},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Mock relay for testing and development.
///
/// # Examples
///
/// ```
/// use goldilock_hardware::mock::MockRelay;
/// use goldilock_hardware::traits::LockActuator;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> goldilock_hardware::Result<()> {
///     let (mut relay, mut handle) = MockRelay::new();
///
///     relay.release(Duration::from_millis(1)).await?;
///
///     assert_eq!(handle.next_release().await, Some(Duration::from_millis(1)));
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockRelay {
    /// Records each completed release
    release_tx: mpsc::Sender<Duration>,

    /// Shared failure switch
    failing: Arc<AtomicBool>,

    /// Device name
    name: String,

    /// Current output
    state: RelayState,
}

impl MockRelay {
    /// Create a new mock relay with the default name.
    pub fn new() -> (Self, MockRelayHandle) {
        Self::with_name("Mock Relay".to_string())
    }

    /// Create a new mock relay with a custom name.
    pub fn with_name(name: String) -> (Self, MockRelayHandle) {
        let (release_tx, release_rx) = mpsc::channel(32);
        let failing = Arc::new(AtomicBool::new(false));

        let relay = Self {
            release_tx,
            failing: Arc::clone(&failing),
            name,
            state: RelayState::Released,
        };
        let handle = MockRelayHandle {
            release_rx,
            failing,
        };

        (relay, handle)
    }
}

impl LockActuator for MockRelay {
    async fn release(&mut self, hold: Duration) -> Result<()> {
        if self.failing.load(Ordering::Acquire) {
            return Err(HardwareError::actuator(format!(
                "{}: simulated relay failure",
                self.name
            )));
        }

        let energized = Energized::new(&mut self.state);
        info!(relay = %self.name, hold_ms = hold.as_millis() as u64, "Relay energized");
        tokio::time::sleep(hold).await;
        drop(energized);
        info!(relay = %self.name, "Relay released");

        // The handle may have been dropped; the release still happened.
        let _ = self.release_tx.try_send(hold);
        Ok(())
    }

    fn state(&self) -> RelayState {
        self.state
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        Ok(DeviceInfo::new(self.name.clone(), "Mock Relay"))
    }
}

/// Holds the relay energized; dropping it releases, even when the hold is
/// cancelled part way.
struct Energized<'a>(&'a mut RelayState);

impl<'a> Energized<'a> {
    fn new(state: &'a mut RelayState) -> Self {
        *state = RelayState::Energized;
        Self(state)
    }
}

impl Drop for Energized<'_> {
    fn drop(&mut self) {
        *self.0 = RelayState::Released;
    }
}

/// Handle for observing and controlling a mock relay.
#[derive(Debug)]
pub struct MockRelayHandle {
    release_rx: mpsc::Receiver<Duration>,
    failing: Arc<AtomicBool>,
}

impl MockRelayHandle {
    /// Wait for the next completed release and return its hold time.
    ///
    /// Returns `None` once the relay has been dropped and every recorded
    /// release has been read.
    pub async fn next_release(&mut self) -> Option<Duration> {
        self.release_rx.recv().await
    }

    /// Next recorded release, if one is already waiting.
    pub fn try_next_release(&mut self) -> Option<Duration> {
        self.release_rx.try_recv().ok()
    }

    /// Make subsequent releases fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }
}
