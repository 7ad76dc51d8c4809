//! Card format descriptors.
//!
//! A format is identified only by its exact frame length; the facility and
//! card fields are half-open bit index ranges inside the frame. Parity bits
//! are not part of either field and are not checked.
//!
//! | Format | Bits | Facility | Card |
//! |--------|------|----------|------|
//! | 26-bit facility (H10301) | 26 | `[1, 9)` | `[9, 25)` |
//! | 26-bit standard (no facility) | 26 | – | `[1, 25)` |
//! | 35-bit HID Corporate 1000 | 35 | `[2, 14)` | `[14, 34)` |
//! | 37-bit H10304 | 37 | `[1, 17)` | `[17, 36)` |

use crate::bitstream::BitStream;
use crate::resolver::{DecodedCode, extract_bits};
use goldilock_core::constants::{MAX_BITS, MAX_FIELD_WIDTH};
use goldilock_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Half-open bit index interval `[start, end)` within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitRange {
    pub start: usize,
    pub end: usize,
}

impl BitRange {
    /// Create a range without validation.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of bits covered.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether the two ranges share at least one index.
    #[must_use]
    pub const fn overlaps(&self, other: &BitRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Largest value a field of this width can hold.
    #[must_use]
    pub fn max_value(&self) -> u64 {
        match self.width() {
            0 => 0,
            w if w >= MAX_FIELD_WIDTH => u64::MAX,
            w => (1u64 << w) - 1,
        }
    }

    /// Check that the range is non-empty, fits in `total_bits`, and is narrow
    /// enough to extract into a `u64`.
    pub fn validate(&self, total_bits: usize) -> Result<()> {
        let reason = if self.is_empty() {
            "range is empty".to_string()
        } else if self.end > total_bits {
            format!("range ends past the {total_bits}-bit frame")
        } else if self.width() > MAX_FIELD_WIDTH {
            format!("range is wider than {MAX_FIELD_WIDTH} bits")
        } else {
            return Ok(());
        };

        Err(Error::InvalidBitRange {
            start: self.start,
            end: self.end,
            reason,
        })
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// One known card encoding.
///
/// # Examples
///
/// ```
/// use goldilock_wiegand::{BitRange, FormatDescriptor};
///
/// let format = FormatDescriptor::new(
///     "34-bit H10306",
///     34,
///     Some(BitRange::new(1, 17)),
///     BitRange::new(17, 33),
/// )
/// .unwrap();
///
/// let frame = format.encode(12, 345).unwrap();
/// let code = format.decode(&frame).unwrap();
/// assert_eq!((code.facility_code, code.card_code), (12, 345));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFormat")]
pub struct FormatDescriptor {
    name: Cow<'static, str>,
    total_bits: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    facility: Option<BitRange>,
    card: BitRange,
}

/// Unchecked descriptor as written in configuration.
#[derive(Deserialize)]
struct RawFormat {
    name: String,
    total_bits: usize,
    #[serde(default)]
    facility: Option<BitRange>,
    card: BitRange,
}

impl TryFrom<RawFormat> for FormatDescriptor {
    type Error = Error;

    fn try_from(raw: RawFormat) -> Result<Self> {
        Self::new(raw.name, raw.total_bits, raw.facility, raw.card)
    }
}

/// 26-bit H10301: 8-bit facility, 16-bit card.
pub const WIEGAND_26_FACILITY: FormatDescriptor = FormatDescriptor::builtin(
    "26-bit facility",
    26,
    Some(BitRange::new(1, 9)),
    BitRange::new(9, 25),
);

/// 26-bit read as one 24-bit card number with no facility.
///
/// Shares its length with [`WIEGAND_26_FACILITY`] and is therefore not part
/// of the standard catalog; place it ahead of the facility variant to prefer
/// this reading.
pub const WIEGAND_26_NO_FACILITY: FormatDescriptor =
    FormatDescriptor::builtin("26-bit standard", 26, None, BitRange::new(1, 25));

/// 35-bit HID Corporate 1000: 12-bit company code, 20-bit card.
pub const HID_CORPORATE_1000_35: FormatDescriptor = FormatDescriptor::builtin(
    "35-bit HID Corporate 1000",
    35,
    Some(BitRange::new(2, 14)),
    BitRange::new(14, 34),
);

/// 37-bit HID H10304: 16-bit facility, 19-bit card.
pub const HID_H10304_37: FormatDescriptor = FormatDescriptor::builtin(
    "37-bit H10304",
    37,
    Some(BitRange::new(1, 17)),
    BitRange::new(17, 36),
);

impl FormatDescriptor {
    const fn builtin(
        name: &'static str,
        total_bits: usize,
        facility: Option<BitRange>,
        card: BitRange,
    ) -> Self {
        Self {
            name: Cow::Borrowed(name),
            total_bits,
            facility,
            card,
        }
    }

    /// Create a validated descriptor.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidFormat` or `Error::InvalidBitRange` when a range
    /// lies outside the frame, is empty or too wide, or when the facility and
    /// card ranges overlap.
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        total_bits: usize,
        facility: Option<BitRange>,
        card: BitRange,
    ) -> Result<Self> {
        let descriptor = Self {
            name: name.into(),
            total_bits,
            facility,
            card,
        };
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Check the descriptor invariants.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("name is empty"));
        }
        if self.total_bits == 0 || self.total_bits > MAX_BITS {
            return Err(self.invalid(format!("total_bits must be 1-{MAX_BITS}")));
        }

        self.card.validate(self.total_bits)?;
        if let Some(facility) = &self.facility {
            facility.validate(self.total_bits)?;
            if facility.overlaps(&self.card) {
                return Err(self.invalid(format!(
                    "facility range {facility} overlaps card range {}",
                    self.card
                )));
            }
        }
        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::InvalidFormat {
            name: self.name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Exact frame length this format matches.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    pub fn facility_range(&self) -> Option<BitRange> {
        self.facility
    }

    pub fn card_range(&self) -> BitRange {
        self.card
    }

    /// Whether a frame of `length` bits can be this format.
    #[inline]
    pub fn matches_length(&self, length: usize) -> bool {
        self.total_bits == length
    }

    /// Extract the codes from a frame of exactly this format's length.
    ///
    /// Returns `None` for any other length; never reads outside `bits`.
    pub fn decode(&self, bits: &BitStream) -> Option<DecodedCode> {
        self.decode_bits(bits.as_slice())
    }

    pub(crate) fn decode_bits(&self, bits: &[bool]) -> Option<DecodedCode> {
        if !self.matches_length(bits.len()) {
            return None;
        }

        let facility_code = match self.facility {
            Some(range) => extract_bits(bits, range)?,
            None => 0,
        };
        let card_code = extract_bits(bits, self.card)?;

        Some(DecodedCode {
            card_code,
            facility_code,
            format_name: self.name.clone(),
        })
    }

    /// Build a frame carrying the given codes.
    ///
    /// Bits outside the two fields, including parity positions, are zero.
    ///
    /// # Errors
    ///
    /// Returns `Error::ValueOutOfRange` if a value does not fit its field, or
    /// if a non-zero facility is given for a format without a facility field.
    pub fn encode(&self, facility_code: u64, card_code: u64) -> Result<BitStream> {
        let mut stream = BitStream::new();
        for _ in 0..self.total_bits.min(MAX_BITS) {
            stream.push(false);
        }

        match self.facility {
            Some(range) => write_field(&mut stream, range, "facility", facility_code)?,
            None if facility_code != 0 => {
                return Err(Error::ValueOutOfRange {
                    field: "facility",
                    value: facility_code,
                    width: 0,
                });
            }
            None => {}
        }
        write_field(&mut stream, self.card, "card", card_code)?;

        Ok(stream)
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bits, ", self.name, self.total_bits)?;
        match &self.facility {
            Some(range) => write!(f, "facility {range}, ")?,
            None => write!(f, "no facility, ")?,
        }
        write!(f, "card {})", self.card)
    }
}

fn write_field(
    stream: &mut BitStream,
    range: BitRange,
    field: &'static str,
    value: u64,
) -> Result<()> {
    if value > range.max_value() {
        return Err(Error::ValueOutOfRange {
            field,
            value,
            width: range.width(),
        });
    }

    let width = range.width();
    for offset in 0..width {
        let shift = width - 1 - offset;
        stream.set(range.start + offset, (value >> shift) & 1 == 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(WIEGAND_26_FACILITY, 8, 16)]
    #[case(WIEGAND_26_NO_FACILITY, 0, 24)]
    #[case(HID_CORPORATE_1000_35, 12, 20)]
    #[case(HID_H10304_37, 16, 19)]
    fn test_builtin_field_widths(
        #[case] format: FormatDescriptor,
        #[case] facility_width: usize,
        #[case] card_width: usize,
    ) {
        format.validate().unwrap();
        assert_eq!(
            format.facility_range().map_or(0, |r| r.width()),
            facility_width
        );
        assert_eq!(format.card_range().width(), card_width);
    }

    #[test]
    fn test_bit_range_overlap() {
        let a = BitRange::new(1, 9);
        assert!(a.overlaps(&BitRange::new(8, 10)));
        assert!(!a.overlaps(&BitRange::new(9, 25)));
        assert!(!BitRange::new(9, 25).overlaps(&a));
    }

    #[rstest]
    #[case(BitRange::new(5, 5), 26)]
    #[case(BitRange::new(9, 27), 26)]
    #[case(BitRange::new(0, 70), 100)]
    fn test_bit_range_validate_rejects(#[case] range: BitRange, #[case] total_bits: usize) {
        assert!(matches!(
            range.validate(total_bits),
            Err(Error::InvalidBitRange { .. })
        ));
    }

    #[test]
    fn test_bit_range_max_value() {
        assert_eq!(BitRange::new(1, 9).max_value(), 255);
        assert_eq!(BitRange::new(0, 64).max_value(), u64::MAX);
        assert_eq!(BitRange::new(3, 3).max_value(), 0);
    }

    #[test]
    fn test_new_rejects_overlapping_fields() {
        let err = FormatDescriptor::new(
            "broken",
            26,
            Some(BitRange::new(1, 10)),
            BitRange::new(9, 25),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_new_rejects_oversized_frame() {
        let err = FormatDescriptor::new("huge", MAX_BITS + 1, None, BitRange::new(0, 8))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }

    #[test]
    fn test_decode_requires_exact_length() {
        let frame = WIEGAND_26_FACILITY.encode(1, 2).unwrap();
        assert!(HID_CORPORATE_1000_35.decode(&frame).is_none());
        assert!(WIEGAND_26_FACILITY.decode(&frame).is_some());
    }

    #[test]
    fn test_decode_ignores_parity_bits() {
        let mut frame = WIEGAND_26_FACILITY.encode(7, 4660).unwrap();
        frame.set(0, true);
        frame.set(25, true);

        let code = WIEGAND_26_FACILITY.decode(&frame).unwrap();
        assert_eq!(code.facility_code, 7);
        assert_eq!(code.card_code, 4660);
    }

    #[test]
    fn test_encode_rejects_values_too_wide() {
        let err = WIEGAND_26_FACILITY.encode(256, 1).unwrap_err();
        assert!(matches!(
            err,
            Error::ValueOutOfRange {
                field: "facility",
                width: 8,
                ..
            }
        ));

        let err = WIEGAND_26_FACILITY.encode(1, 65536).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { field: "card", .. }));
    }

    #[test]
    fn test_encode_rejects_facility_without_field() {
        assert!(WIEGAND_26_NO_FACILITY.encode(1, 1).is_err());
        assert!(WIEGAND_26_NO_FACILITY.encode(0, 1).is_ok());
    }

    #[test]
    fn test_encode_places_msb_first() {
        let frame = WIEGAND_26_FACILITY.encode(0x80, 1).unwrap();
        assert_eq!(frame.len(), 26);
        assert_eq!(frame.get(1), Some(true));
        assert_eq!(frame.get(8), Some(false));
        assert_eq!(frame.get(24), Some(true));
        assert_eq!(frame.get(23), Some(false));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            WIEGAND_26_FACILITY.to_string(),
            "26-bit facility (26 bits, facility [1, 9), card [9, 25))"
        );
        assert_eq!(
            WIEGAND_26_NO_FACILITY.to_string(),
            "26-bit standard (26 bits, no facility, card [1, 25))"
        );
    }

    #[test]
    fn test_descriptor_deserialization() {
        let json = r#"{
            "name": "34-bit H10306",
            "total_bits": 34,
            "facility": { "start": 1, "end": 17 },
            "card": { "start": 17, "end": 33 }
        }"#;
        let format: FormatDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(format.name(), "34-bit H10306");
        assert_eq!(format.facility_range(), Some(BitRange::new(1, 17)));

        let json =
            r#"{ "name": "card only", "total_bits": 10, "card": { "start": 0, "end": 10 } }"#;
        let format: FormatDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(format.facility_range(), None);
    }

    #[test]
    fn test_deserialization_validates_ranges() {
        let json =
            r#"{ "name": "short", "total_bits": 10, "card": { "start": 4, "end": 20 } }"#;
        let err = serde_json::from_str::<FormatDescriptor>(json).unwrap_err();
        assert!(err.to_string().contains("Invalid bit range"));

        let json = r#"{
            "name": "overlap",
            "total_bits": 26,
            "facility": { "start": 1, "end": 13 },
            "card": { "start": 9, "end": 25 }
        }"#;
        assert!(serde_json::from_str::<FormatDescriptor>(json).is_err());
    }
}
