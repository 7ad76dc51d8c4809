//! Ordered catalog of known formats.
//!
//! Catalog order is the tie-break policy: when two descriptors share a frame
//! length, the earlier one wins for every frame of that length. Use
//! [`FormatCatalog::ambiguous_lengths`] to surface such overlaps.

use crate::format::{FormatDescriptor, HID_CORPORATE_1000_35, HID_H10304_37, WIEGAND_26_FACILITY};
use goldilock_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Immutable, validated, priority-ordered list of formats.
///
/// # Examples
///
/// ```
/// use goldilock_wiegand::{FormatCatalog, WIEGAND_26_NO_FACILITY, WIEGAND_26_FACILITY};
///
/// let standard = FormatCatalog::standard();
/// assert_eq!(standard.len(), 3);
/// assert!(standard.ambiguous_lengths().is_empty());
///
/// let both = FormatCatalog::new(vec![WIEGAND_26_FACILITY, WIEGAND_26_NO_FACILITY]).unwrap();
/// assert_eq!(both.ambiguous_lengths(), vec![26]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FormatDescriptor>", into = "Vec<FormatDescriptor>")]
pub struct FormatCatalog {
    formats: Vec<FormatDescriptor>,
}

impl FormatCatalog {
    /// Build a catalog, validating every descriptor.
    ///
    /// # Errors
    ///
    /// Returns an error if the list is empty, a descriptor is invalid, or two
    /// descriptors share a name.
    pub fn new(formats: Vec<FormatDescriptor>) -> Result<Self> {
        if formats.is_empty() {
            return Err(Error::Config("format catalog is empty".to_string()));
        }

        {
            let mut names = HashSet::new();
            for format in &formats {
                format.validate()?;
                if !names.insert(format.name()) {
                    return Err(Error::InvalidFormat {
                        name: format.name().to_string(),
                        reason: "duplicate format name".to_string(),
                    });
                }
            }
        }

        Ok(Self { formats })
    }

    /// The default priority order: 26-bit facility, 35-bit, 37-bit.
    pub fn standard() -> Self {
        Self {
            formats: vec![WIEGAND_26_FACILITY, HID_CORPORATE_1000_35, HID_H10304_37],
        }
    }

    /// Formats in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &FormatDescriptor> {
        self.formats.iter()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Look up a format by name.
    pub fn find(&self, name: &str) -> Option<&FormatDescriptor> {
        self.formats.iter().find(|f| f.name() == name)
    }

    /// Formats that a frame of `length` bits could be, in priority order.
    pub fn candidates(&self, length: usize) -> impl Iterator<Item = &FormatDescriptor> {
        self.formats
            .iter()
            .filter(move |f| f.matches_length(length))
    }

    /// Frame lengths claimed by more than one format, ascending.
    pub fn ambiguous_lengths(&self) -> Vec<usize> {
        let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
        for format in &self.formats {
            *counts.entry(format.total_bits()).or_default() += 1;
        }
        counts
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(length, _)| length)
            .collect()
    }
}

impl Default for FormatCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<FormatDescriptor>> for FormatCatalog {
    type Error = Error;

    fn try_from(formats: Vec<FormatDescriptor>) -> Result<Self> {
        Self::new(formats)
    }
}

impl From<FormatCatalog> for Vec<FormatDescriptor> {
    fn from(catalog: FormatCatalog) -> Self {
        catalog.formats
    }
}

impl<'a> IntoIterator for &'a FormatCatalog {
    type Item = &'a FormatDescriptor;
    type IntoIter = std::slice::Iter<'a, FormatDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.formats.iter()
    }
}
