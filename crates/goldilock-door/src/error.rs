//! Error types for door decisions.

use goldilock_hardware::HardwareError;
use thiserror::Error;

/// Errors raised while deciding on or acting upon a card read.
///
/// A denied card is not an error; it is an
/// [`AccessDecision`](crate::AccessDecision).
#[derive(Debug, Error)]
pub enum DoorError {
    /// The lock could not be driven.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// The authorizer could not reach a decision.
    #[error("Authorization error: {0}")]
    Authorization(String),
}

/// Specialized result type for door operations
pub type DoorResult<T> = Result<T, DoorError>;
