//! Core constants for the Wiegand door controller.
//!
//! A Wiegand reader drives two data lines, DATA0 and DATA1, both held high at
//! rest. A short low pulse on DATA0 transmits a `0`, a pulse on DATA1 a `1`, with
//! a few milliseconds between pulses. There is no frame delimiter: a card read
//! ends when the lines stay quiet for longer than the idle window.
//!
//! ```text
//! DATA0 ‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//! DATA1 ‾‾‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾‾|_|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾
//!           0     1     0      1   |<-- idle window -->| frame ready
//! ```
//!
//! # Usage
//!
//! ```
//! use goldilock_core::constants::*;
//! use std::time::Duration;
//!
//! let idle = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS) * DEFAULT_IDLE_TICKS;
//! assert_eq!(idle, Duration::from_millis(25));
//! assert!(MAX_BITS >= 37);
//! ```

// ============================================================================
// Frame capture
// ============================================================================

/// Maximum number of bits held in one frame.
///
/// Edges arriving after the buffer is full are dropped; the frame still
/// closes on the idle timeout and resolves as unrecognized unless its capped
/// length happens to equal a catalog entry.
pub const MAX_BITS: usize = 100;

/// Default idle window in ticks.
///
/// Must exceed the gap between two bits of one transmission (typically
/// 2 ms, at most around 20 ms on slow readers) while staying short enough that
/// the door reacts without visible delay.
pub const DEFAULT_IDLE_TICKS: u32 = 25;

/// Default duration of one capture tick in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1;

/// Default capacity of the reader event channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// Door actuation
// ============================================================================

/// How long the lock relay stays energized after a granted read.
pub const DEFAULT_UNLOCK_HOLD_MS: u64 = 5000;

// ============================================================================
// Configuration
// ============================================================================

/// Default configuration file location.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/goldilock/goldilock.toml";

/// Widest field the resolver can extract into a code.
pub const MAX_FIELD_WIDTH: usize = u64::BITS as usize;
