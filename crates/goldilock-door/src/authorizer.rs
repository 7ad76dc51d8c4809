//! Credential lookup.
//!
//! An [`Authorizer`] turns a decoded card into an [`AccessDecision`]. The
//! in-memory [`AllowList`] is the local implementation: one entry per
//! enrolled card, matched on facility and card code.
//!
//! # Security
//!
//! The allow-list scan compares every entry with constant-time equality
//! from the `subtle` crate, folds the results with conditional selection,
//! and never stops at the first hit. The loop does the same work for every
//! entry whether or not it matches.

#![allow(async_fn_in_trait)]

use crate::error::DoorResult;
use goldilock_wiegand::DecodedCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// Why a card was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// No entry carries this facility and card code.
    NotEnrolled,

    /// The only matching entries are disabled.
    Disabled,

    /// More than one enabled entry carries this code.
    DuplicateCredential,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotEnrolled => "not enrolled",
            Self::Disabled => "disabled",
            Self::DuplicateCredential => "duplicate credential",
        };
        write!(f, "{reason}")
    }
}

/// Outcome of a credential lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// The card belongs to exactly one enabled holder.
    Granted { holder: String },

    /// The card must not open the door.
    Denied(DenyReason),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Decides whether a decoded card opens the door.
///
/// # Examples
///
/// ```
/// use goldilock_door::{AccessDecision, Authorizer, DoorResult};
/// use goldilock_wiegand::DecodedCode;
///
/// /// Grants every card from one facility.
/// struct FacilityGate(u64);
///
/// impl Authorizer for FacilityGate {
///     async fn authorize(&self, code: &DecodedCode) -> DoorResult<AccessDecision> {
///         if code.facility_code == self.0 {
///             Ok(AccessDecision::Granted { holder: format!("card {}", code.card_code) })
///         } else {
///             Ok(AccessDecision::Denied(goldilock_door::DenyReason::NotEnrolled))
///         }
///     }
/// }
/// ```
pub trait Authorizer: Send + Sync {
    /// Look up `code`.
    ///
    /// # Errors
    ///
    /// Returns an error only when no decision can be made (for example a
    /// backing store is unreachable). An unknown card is `Ok(Denied(..))`.
    async fn authorize(&self, code: &DecodedCode) -> DoorResult<AccessDecision>;
}

/// One enrolled card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowEntry {
    /// Card holder, reported when access is granted.
    pub name: String,

    pub facility_code: u64,

    pub card_code: u64,

    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl AllowEntry {
    /// Create an enabled entry.
    pub fn new(name: impl Into<String>, facility_code: u64, card_code: u64) -> Self {
        Self {
            name: name.into(),
            facility_code,
            card_code,
            enabled: true,
        }
    }

    /// Set whether the entry may open the door.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn matches(&self, code: &DecodedCode) -> Choice {
        self.facility_code.ct_eq(&code.facility_code) & self.card_code.ct_eq(&code.card_code)
    }
}

/// In-memory allow-list.
///
/// # Examples
///
/// ```
/// use goldilock_door::{AccessDecision, AllowEntry, AllowList, Authorizer};
/// use goldilock_wiegand::{FormatResolver, WIEGAND_26_FACILITY};
///
/// # #[tokio::main]
/// # async fn main() -> goldilock_door::DoorResult<()> {
/// let list = AllowList::new(vec![AllowEntry::new("Alice", 7, 4660)]);
///
/// let bits = WIEGAND_26_FACILITY.encode(7, 4660).unwrap();
/// let resolution = FormatResolver::standard().resolve(&bits);
/// let code = resolution.decoded().unwrap();
///
/// assert_eq!(
///     list.authorize(code).await?,
///     AccessDecision::Granted { holder: "Alice".to_string() }
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<AllowEntry>,
}

impl AllowList {
    pub fn new(entries: Vec<AllowEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries allowed to open the door.
    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.enabled).count()
    }

    pub fn entries(&self) -> &[AllowEntry] {
        &self.entries
    }

    /// Synchronous lookup behind [`Authorizer::authorize`].
    pub fn decide(&self, code: &DecodedCode) -> AccessDecision {
        let mut enabled_matches = 0u64;
        let mut disabled_matches = 0u64;
        let mut found = Choice::from(0);
        let mut first = 0u64;

        for (index, entry) in self.entries.iter().enumerate() {
            let hit = entry.matches(code);
            let enabled = Choice::from(u8::from(entry.enabled));
            let enabled_hit = hit & enabled;

            enabled_matches += u64::conditional_select(&0, &1, enabled_hit);
            disabled_matches += u64::conditional_select(&0, &1, hit & !enabled);
            first = u64::conditional_select(&first, &(index as u64), enabled_hit & !found);
            found |= enabled_hit;
        }

        match (enabled_matches, disabled_matches) {
            (1, _) => match self.entries.get(first as usize) {
                Some(entry) => AccessDecision::Granted {
                    holder: entry.name.clone(),
                },
                None => AccessDecision::Denied(DenyReason::NotEnrolled),
            },
            (0, 0) => AccessDecision::Denied(DenyReason::NotEnrolled),
            (0, _) => AccessDecision::Denied(DenyReason::Disabled),
            _ => AccessDecision::Denied(DenyReason::DuplicateCredential),
        }
    }
}

impl FromIterator<AllowEntry> for AllowList {
    fn from_iter<I: IntoIterator<Item = AllowEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Authorizer for AllowList {
    async fn authorize(&self, code: &DecodedCode) -> DoorResult<AccessDecision> {
        Ok(self.decide(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::borrow::Cow;

    fn code(facility_code: u64, card_code: u64) -> DecodedCode {
        DecodedCode {
            card_code,
            facility_code,
            format_name: Cow::Borrowed("26-bit facility"),
        }
    }

    fn staff() -> AllowList {
        AllowList::new(vec![
            AllowEntry::new("Alice", 7, 4660),
            AllowEntry::new("Bob", 7, 4661),
            AllowEntry::new("Carol", 7, 4662).enabled(false),
            AllowEntry::new("Dave", 12, 99),
            AllowEntry::new("Dave again", 12, 99),
            AllowEntry::new("Erin", 3, 500),
            AllowEntry::new("Erin (old)", 3, 500).enabled(false),
            AllowEntry::new("Frank (old)", 5, 1).enabled(false),
            AllowEntry::new("Frank", 5, 1),
        ])
    }

    #[rstest]
    #[case::single_enabled(7, 4660, AccessDecision::Granted { holder: "Alice".into() })]
    #[case::enabled_beside_disabled(3, 500, AccessDecision::Granted { holder: "Erin".into() })]
    #[case::enabled_after_disabled(5, 1, AccessDecision::Granted { holder: "Frank".into() })]
    #[case::unknown_card(7, 1, AccessDecision::Denied(DenyReason::NotEnrolled))]
    #[case::wrong_facility(8, 4660, AccessDecision::Denied(DenyReason::NotEnrolled))]
    #[case::disabled(7, 4662, AccessDecision::Denied(DenyReason::Disabled))]
    #[case::duplicate(12, 99, AccessDecision::Denied(DenyReason::DuplicateCredential))]
    fn test_decide(#[case] facility: u64, #[case] card: u64, #[case] expected: AccessDecision) {
        assert_eq!(staff().decide(&code(facility, card)), expected);
    }

    #[test]
    fn test_empty_list_denies() {
        let list = AllowList::default();
        assert!(list.is_empty());
        assert_eq!(
            list.decide(&code(0, 0)),
            AccessDecision::Denied(DenyReason::NotEnrolled)
        );
    }

    #[test]
    fn test_counts() {
        let list = staff();
        assert_eq!(list.len(), 9);
        assert_eq!(list.enabled_count(), 6);
        assert_eq!(list.entries()[0].name, "Alice");
    }

    #[test]
    fn test_from_iterator() {
        let list: AllowList = (1..=3).map(|n| AllowEntry::new(format!("user {n}"), 1, n)).collect();
        assert_eq!(list.len(), 3);
        assert!(list.decide(&code(1, 2)).is_granted());
    }

    #[test]
    fn test_entry_deserialize_defaults_enabled() {
        let entry: AllowEntry =
            serde_json::from_str(r#"{"name":"Alice","facility_code":7,"card_code":4660}"#).unwrap();
        assert!(entry.enabled);
        assert_eq!(entry, AllowEntry::new("Alice", 7, 4660));
    }

    #[test]
    fn test_deny_reason_display() {
        assert_eq!(DenyReason::NotEnrolled.to_string(), "not enrolled");
        assert_eq!(DenyReason::Disabled.to_string(), "disabled");
        assert_eq!(
            DenyReason::DuplicateCredential.to_string(),
            "duplicate credential"
        );
    }

    #[tokio::test]
    async fn test_authorize_matches_decide() {
        let list = staff();
        let decision = list.authorize(&code(7, 4661)).await.unwrap();
        assert_eq!(decision, AccessDecision::Granted { holder: "Bob".into() });
    }
}
