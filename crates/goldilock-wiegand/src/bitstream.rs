//! Bounded, ordered bit buffer for one Wiegand frame.

use goldilock_core::constants::MAX_BITS;
use goldilock_core::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Ordered sequence of received bits.
///
/// Index 0 is the first bit received. The buffer is a fixed array of
/// [`MAX_BITS`] so appending never allocates; once full, further pushes are
/// refused rather than overwriting earlier bits.
#[derive(Clone, PartialEq, Eq)]
pub struct BitStream {
    bits: [bool; MAX_BITS],
    len: usize,
}

impl BitStream {
    /// Create an empty stream.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bits: [false; MAX_BITS],
            len: 0,
        }
    }

    /// Build a stream from a slice, keeping at most [`MAX_BITS`] bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use goldilock_wiegand::BitStream;
    ///
    /// let stream = BitStream::from_bits(&[true, false, true]);
    /// assert_eq!(stream.len(), 3);
    /// assert_eq!(stream.to_string(), "101");
    /// ```
    #[must_use]
    pub fn from_bits(bits: &[bool]) -> Self {
        let mut stream = Self::new();
        for &bit in bits.iter().take(MAX_BITS) {
            stream.push(bit);
        }
        stream
    }

    /// Append one bit.
    ///
    /// Returns `false` without modifying the stream when it is already full.
    pub fn push(&mut self, bit: bool) -> bool {
        if self.len >= MAX_BITS {
            return false;
        }
        self.bits[self.len] = bit;
        self.len += 1;
        true
    }

    /// Set the bit at `index`, which must be below [`len`](Self::len).
    pub(crate) fn set(&mut self, index: usize, bit: bool) {
        if index < self.len {
            self.bits[index] = bit;
        }
    }

    /// Number of bits held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether another push would be refused.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= MAX_BITS
    }

    /// Bits held, in arrival order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits[..self.len]
    }

    /// Bit at `index`, if held.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<bool> {
        self.as_slice().get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.as_slice().iter().copied()
    }

    /// Drop every bit.
    pub fn clear(&mut self) {
        self.bits = [false; MAX_BITS];
        self.len = 0;
    }
}

impl Default for BitStream {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitStream({} bits: {})", self.len, self)
    }
}

/// Renders the stream as a string of `0` and `1`.
impl fmt::Display for BitStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Parses `0`/`1` characters; whitespace and `_` are accepted as separators.
///
/// Bits beyond [`MAX_BITS`] are dropped, matching what capture would do with
/// the same edges.
impl FromStr for BitStream {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut stream = Self::new();
        for (position, c) in s.chars().enumerate() {
            match c {
                '0' => {
                    stream.push(false);
                }
                '1' => {
                    stream.push(true);
                }
                '_' => {}
                c if c.is_whitespace() => {}
                found => return Err(Error::InvalidBitString { found, position }),
            }
        }
        Ok(stream)
    }
}

impl<'a> IntoIterator for &'a BitStream {
    type Item = bool;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, bool>>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter().copied()
    }
}
