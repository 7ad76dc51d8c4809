//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring a reader or relay board.

pub mod reader;
pub mod relay;

// Re-export commonly used types
pub use reader::{MockWiegandReader, MockWiegandReaderHandle};
pub use relay::{MockRelay, MockRelayHandle};
