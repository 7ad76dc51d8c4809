//! Access decisions for the Goldilock door controller.
//!
//! This crate sits downstream of the reader pipeline: it takes each
//! [`Resolution`](goldilock_wiegand::Resolution), looks the card up through
//! an [`Authorizer`], and pulses the lock relay when access is granted.
//!
//! Unrecognized frames never reach the authorizer. They are logged with
//! their bit count and answered with `nop`.

pub mod authorizer;
pub mod controller;
pub mod error;

pub use authorizer::{AccessDecision, AllowEntry, AllowList, Authorizer, DenyReason};
pub use controller::{AccessOutcome, DoorConfig, DoorController};
pub use error::{DoorError, DoorResult};
