//! Hardware device trait definitions.
//!
//! These traits are the seams between the capture/resolution core and the
//! physical world: an [`EdgeSource`] delivers Wiegand pulses, a
//! [`LockActuator`] drives the door relay. Mock and line-based
//! implementations live in this crate; GPIO drivers plug in the same way.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DeviceInfo, RelayState};
use goldilock_core::EdgeKind;
use std::time::Duration;

/// Source of Wiegand edge events.
///
/// Each call yields one already-debounced pulse. Implementations should
/// return as soon as an edge is available; the reader manager forwards it to
/// frame capture without further buffering.
///
/// # Object Safety and Dynamic Dispatch
///
/// This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generics, or the enum wrapper
/// [`AnyEdgeSource`](crate::devices::AnyEdgeSource) for dynamic choice.
///
/// # Examples
///
/// ```no_run
/// use goldilock_hardware::traits::EdgeSource;
/// use goldilock_hardware::error::Result;
///
/// async fn count_edges<S: EdgeSource>(source: &mut S) -> Result<usize> {
///     let mut count = 0;
///     while source.next_edge().await?.is_some() {
///         count += 1;
///     }
///     Ok(count)
/// }
/// ```
pub trait EdgeSource: Send {
    /// Wait for the next edge.
    ///
    /// Returns `Ok(None)` once the source is exhausted and will produce no
    /// more edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the device fails or delivers malformed input.
    async fn next_edge(&mut self) -> Result<Option<EdgeKind>>;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}

/// Door lock relay.
///
/// # Examples
///
/// ```no_run
/// use goldilock_hardware::traits::LockActuator;
/// use goldilock_hardware::error::Result;
/// use std::time::Duration;
///
/// async fn open_briefly<L: LockActuator>(lock: &mut L) -> Result<()> {
///     lock.release(Duration::from_secs(5)).await
/// }
/// ```
pub trait LockActuator: Send + Sync {
    /// Energize the relay for `hold`, then release it.
    ///
    /// Completes once the relay is back in the released state.
    ///
    /// # Errors
    ///
    /// Returns an error if the relay cannot be driven.
    async fn release(&mut self, hold: Duration) -> Result<()>;

    /// Current relay output.
    fn state(&self) -> RelayState;

    /// Get device information.
    async fn get_info(&self) -> Result<DeviceInfo>;
}
