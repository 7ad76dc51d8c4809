use serde::{Deserialize, Serialize};
use std::fmt;

/// One already-debounced pulse from a Wiegand reader.
///
/// A pulse on DATA0 carries a `0` bit, a pulse on DATA1 carries a `1` bit.
/// Events have no payload beyond which line fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Pulse on DATA0.
    Zero,
    /// Pulse on DATA1.
    One,
}

impl EdgeKind {
    /// Edge that transmits the given bit.
    #[inline]
    #[must_use]
    pub fn from_bit(bit: bool) -> Self {
        if bit { EdgeKind::One } else { EdgeKind::Zero }
    }

    /// Bit carried by this edge.
    #[inline]
    #[must_use]
    pub fn bit(self) -> bool {
        matches!(self, EdgeKind::One)
    }

    /// Parse a `'0'` or `'1'` character.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(EdgeKind::Zero),
            '1' => Some(EdgeKind::One),
            _ => None,
        }
    }

    /// Name of the data line that carries this edge.
    #[must_use]
    pub fn line(self) -> &'static str {
        match self {
            EdgeKind::Zero => "DATA0",
            EdgeKind::One => "DATA1",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EdgeKind::Zero => write!(f, "0"),
            EdgeKind::One => write!(f, "1"),
        }
    }
}

impl From<bool> for EdgeKind {
    fn from(bit: bool) -> Self {
        EdgeKind::from_bit(bit)
    }
}
