//! Device layer for the Goldilock door controller.
//!
//! This crate connects Wiegand frame capture to the outside world. It defines
//! the device traits, the mock and line-based implementations used for
//! development and testing, and the reader manager that runs capture and
//! resolution as async tasks.
//!
//! # Device Traits
//!
//! - [`EdgeSource`]: delivers DATA0/DATA1 pulses, one [`EdgeKind`] at a time.
//! - [`LockActuator`]: drives the door relay.
//!
//! Both use native `async fn` in traits (Rust 1.90 + Edition 2024 RPITIT).
//! They are not object-safe; [`devices`] provides enum wrappers for
//! dynamic choice of implementation.
//!
//! # Reader Pipeline
//!
//! ```no_run
//! use goldilock_hardware::{AnyEdgeSource, ReaderConfig, ReaderEvent, ReaderManager};
//! use goldilock_hardware::mock::MockWiegandReader;
//! use goldilock_wiegand::{FormatResolver, WIEGAND_26_FACILITY};
//!
//! #[tokio::main]
//! async fn main() -> goldilock_hardware::Result<()> {
//!     let (reader, card_reader) = MockWiegandReader::new();
//!
//!     let mut manager = ReaderManager::new(ReaderConfig::default(), FormatResolver::standard());
//!     manager.register_source(AnyEdgeSource::Mock(reader));
//!     let mut handle = manager.start();
//!
//!     card_reader.present_card(&WIEGAND_26_FACILITY, 7, 4660).await?;
//!
//!     if let Some(ReaderEvent::FrameResolved { resolution, .. }) = handle.recv().await {
//!         println!("{resolution}");
//!     }
//!
//!     handle.shutdown().await
//! }
//! ```
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`][error::Result] with
//! [`HardwareError`], which covers disconnection, malformed input and relay
//! failures.
//!
//! [`EdgeKind`]: goldilock_core::EdgeKind

pub mod devices;
pub mod error;
pub mod line;
pub mod manager;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyEdgeSource, AnyLockActuator};
pub use error::{HardwareError, Result};
pub use line::LineEdgeSource;
pub use manager::{ReaderConfig, ReaderEvent, ReaderHandle, ReaderManager};
pub use traits::{EdgeSource, LockActuator};
pub use types::{DeviceInfo, RelayState};
