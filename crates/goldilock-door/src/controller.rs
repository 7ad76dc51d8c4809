//! Door controller: from a resolved frame to a relay pulse.
//!
//! ```text
//! Resolution ──► Decoded ──► Authorizer ──► Granted ──► LockActuator::release
//!      │                          └──────► Denied  ──► (no action)
//!      └───────► Unrecognized ──► Ignored
//! ```

use crate::authorizer::{AccessDecision, Authorizer, DenyReason};
use crate::error::DoorResult;
use goldilock_core::constants::DEFAULT_UNLOCK_HOLD_MS;
use goldilock_hardware::LockActuator;
use goldilock_wiegand::{DecodedCode, Resolution};
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Door behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorConfig {
    /// Identifier of this door, included in every log line.
    pub location: String,

    /// How long the relay stays energized on a grant.
    pub unlock_hold: Duration,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            location: "door".to_string(),
            unlock_hold: Duration::from_millis(DEFAULT_UNLOCK_HOLD_MS),
        }
    }
}

impl DoorConfig {
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn unlock_hold(mut self, hold: Duration) -> Self {
        self.unlock_hold = hold;
        self
    }
}

/// What the controller did with one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The relay was pulsed for `holder`.
    Unlocked { holder: String, code: DecodedCode },

    /// The card was refused.
    Denied { reason: DenyReason, code: DecodedCode },

    /// The frame matched no known format.
    Ignored { length: usize },
}

impl AccessOutcome {
    /// Response name reported to the operator.
    pub fn response(&self) -> &'static str {
        match self {
            Self::Unlocked { .. } => "unlock_door",
            Self::Denied { .. } | Self::Ignored { .. } => "nop",
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked { .. })
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlocked { holder, code } => write!(f, "unlocked for {holder}: {code}"),
            Self::Denied { reason, code } => write!(f, "denied ({reason}): {code}"),
            Self::Ignored { length } => write!(f, "ignored unrecognized {length}-bit frame"),
        }
    }
}

/// Applies access decisions to a lock.
///
/// # Examples
///
/// ```
/// use goldilock_door::{AllowEntry, AllowList, DoorConfig, DoorController};
/// use goldilock_hardware::mock::MockRelay;
/// use goldilock_wiegand::{FormatResolver, WIEGAND_26_FACILITY};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> goldilock_door::DoorResult<()> {
/// let (relay, mut pulses) = MockRelay::new();
/// let allow = AllowList::new(vec![AllowEntry::new("Alice", 7, 4660)]);
/// let config = DoorConfig::default().unlock_hold(Duration::from_millis(1));
/// let mut door = DoorController::new(allow, relay, config);
///
/// let bits = WIEGAND_26_FACILITY.encode(7, 4660).unwrap();
/// let outcome = door.handle(&FormatResolver::standard().resolve(&bits)).await?;
///
/// assert!(outcome.is_unlocked());
/// assert_eq!(pulses.try_next_release(), Some(Duration::from_millis(1)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DoorController<A, L> {
    authorizer: A,
    lock: L,
    config: DoorConfig,
}

impl<A: Authorizer, L: LockActuator> DoorController<A, L> {
    pub fn new(authorizer: A, lock: L, config: DoorConfig) -> Self {
        Self {
            authorizer,
            lock,
            config,
        }
    }

    pub fn config(&self) -> &DoorConfig {
        &self.config
    }

    pub fn authorizer(&self) -> &A {
        &self.authorizer
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// Act on one resolved frame.
    ///
    /// Returns once the relay has been released again after a grant.
    ///
    /// # Errors
    ///
    /// Fails when the authorizer cannot decide or the relay cannot be driven.
    pub async fn handle(&mut self, resolution: &Resolution) -> DoorResult<AccessOutcome> {
        let location = self.config.location.as_str();

        let code = match resolution {
            Resolution::Decoded(code) => code,
            Resolution::Unrecognized { length } => {
                info!(location, bits = length, response = "nop", "Unknown card format");
                return Ok(AccessOutcome::Ignored { length: *length });
            }
        };

        info!(
            location,
            format = %code.format_name,
            facility_code = code.facility_code,
            tag_id = code.card_code,
            "Card read"
        );

        let outcome = match self.authorizer.authorize(code).await? {
            AccessDecision::Granted { holder } => {
                self.lock.release(self.config.unlock_hold).await?;
                AccessOutcome::Unlocked {
                    holder,
                    code: code.clone(),
                }
            }
            AccessDecision::Denied(reason) => AccessOutcome::Denied {
                reason,
                code: code.clone(),
            },
        };

        match &outcome {
            AccessOutcome::Unlocked { holder, .. } => {
                info!(location, holder = %holder, response = outcome.response(), "Access granted");
            }
            AccessOutcome::Denied { reason, .. } => {
                warn!(location, reason = %reason, response = outcome.response(), "Access denied");
            }
            AccessOutcome::Ignored { .. } => {}
        }

        Ok(outcome)
    }
}
