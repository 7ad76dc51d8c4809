//! Format resolution and field extraction.
//!
//! Resolution walks the catalog in priority order and returns the first
//! descriptor whose length matches the frame. It is a pure function of the
//! catalog and the bits: no logging, no mutation, same answer every time.

use crate::bitstream::BitStream;
use crate::catalog::FormatCatalog;
use crate::format::BitRange;
use goldilock_core::constants::MAX_FIELD_WIDTH;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Codes extracted from a recognized frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecodedCode {
    /// Card number within the facility.
    pub card_code: u64,
    /// Facility (site) code; zero for formats without a facility field.
    pub facility_code: u64,
    /// Name of the descriptor that matched.
    pub format_name: Cow<'static, str>,
}

impl fmt::Display for DecodedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "facility {} card {} ({})",
            self.facility_code, self.card_code, self.format_name
        )
    }
}

/// Outcome of resolving one frame.
///
/// `Unrecognized` is an ordinary result: noise, partial reads and
/// unsupported cards all end up here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
#[must_use]
pub enum Resolution {
    Decoded(DecodedCode),
    Unrecognized { length: usize },
}

impl Resolution {
    pub fn is_decoded(&self) -> bool {
        matches!(self, Resolution::Decoded(_))
    }

    pub fn decoded(&self) -> Option<&DecodedCode> {
        match self {
            Resolution::Decoded(code) => Some(code),
            Resolution::Unrecognized { .. } => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Decoded(code) => write!(f, "{code}"),
            Resolution::Unrecognized { length } => write!(f, "unrecognized {length}-bit frame"),
        }
    }
}

/// Read `range` of `bits` as a big-endian unsigned integer.
///
/// The first bit of the range is the most significant bit of the result.
/// Returns `None` when the range does not lie inside `bits` or is wider than
/// 64 bits.
///
/// # Examples
///
/// ```
/// use goldilock_wiegand::{BitRange, extract_bits};
///
/// let bits = [true, false, true, true, false];
/// assert_eq!(extract_bits(&bits, BitRange::new(1, 4)), Some(0b011));
/// assert_eq!(extract_bits(&bits, BitRange::new(3, 6)), None);
/// ```
pub fn extract_bits(bits: &[bool], range: BitRange) -> Option<u64> {
    if range.width() > MAX_FIELD_WIDTH {
        return None;
    }
    let field = bits.get(range.start..range.end)?;
    Some(
        field
            .iter()
            .fold(0u64, |acc, &bit| (acc << 1) | u64::from(bit)),
    )
}

/// Matches frames against a [`FormatCatalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatResolver {
    catalog: FormatCatalog,
}

impl FormatResolver {
    pub fn new(catalog: FormatCatalog) -> Self {
        Self { catalog }
    }

    /// Resolver over [`FormatCatalog::standard`].
    pub fn standard() -> Self {
        Self::new(FormatCatalog::standard())
    }

    pub fn catalog(&self) -> &FormatCatalog {
        &self.catalog
    }

    /// Resolve a captured frame.
    pub fn resolve(&self, bits: &BitStream) -> Resolution {
        self.resolve_bits(bits.as_slice())
    }

    /// Resolve a raw bit slice; its length is the frame length.
    pub fn resolve_bits(&self, bits: &[bool]) -> Resolution {
        self.catalog
            .iter()
            .find_map(|format| format.decode_bits(bits))
            .map_or(
                Resolution::Unrecognized { length: bits.len() },
                Resolution::Decoded,
            )
    }
}
