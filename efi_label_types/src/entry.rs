// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{GuidLe, LbaLe, U16Le, U64Le};
use core::fmt::{self, Display, Formatter};
use core::mem;
use core::str::FromStr;

use bytemuck::{Pod, Zeroable};

/// Partition attribute bits.
///
/// Only the low sixteen bits of the attribute word are surfaced in the
/// label model; the rest are preserved as reserved.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    Hash,
    Ord,
    PartialOrd,
    Pod,
    Zeroable,
)]
#[repr(transparent)]
pub struct GptPartitionAttributes(pub U64Le);

impl GptPartitionAttributes {
    /// If set, bit `0` indicates the partition is required for the
    /// platform to function.
    pub const REQUIRED_PARTITION_BIT: u8 = 0;

    /// Get the low sixteen bits of the attribute word.
    #[must_use]
    pub fn low_word(self) -> u16 {
        U16Le([self.0 .0[0], self.0 .0[1]]).to_u16()
    }

    /// Create an attribute word from its low sixteen bits, leaving the
    /// remaining bits clear.
    #[must_use]
    pub fn from_low_word(word: u16) -> Self {
        Self(U64Le::from_u64(u64::from(word)))
    }

    /// Get the required-partition attribute.
    #[must_use]
    pub fn required_partition(self) -> bool {
        self.0 .0[0] & (1 << Self::REQUIRED_PARTITION_BIT) != 0
    }
}

impl Display for GptPartitionAttributes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06x}", self.low_word())
    }
}

struct GptPartitionNameCharIter<'a> {
    name: &'a GptPartitionName,
    byte_index: usize,
}

impl Iterator for GptPartitionNameCharIter<'_> {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = &self.name.0;

        if self.byte_index >= bytes.len() {
            return None;
        }

        // UEFI strings are UCS-2, not UTF-16; every character is
        // exactly one 16-bit unit.
        let c = (u16::from(bytes[self.byte_index + 1]) << 8)
            | u16::from(bytes[self.byte_index]);

        // Stop iteration at the first null terminator.
        if c == 0 {
            self.byte_index = bytes.len();
            return None;
        }

        self.byte_index += 2;

        Some(char::try_from(u32::from(c)).unwrap_or('�'))
    }
}

/// Human readable partition label encoded as a null-terminated UCS-2
/// string of at most 36 units.
///
/// # Examples
///
/// Construct from a UTF-8 string:
///
/// ```
/// use efi_label_types::GptPartitionName;
///
/// let name: GptPartitionName = "root".parse().unwrap();
/// assert_eq!(name.to_string(), "root");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct GptPartitionName(pub [u8; 72]);

// Manual implementation needed because of the large array field.
#[allow(unsafe_code)]
unsafe impl Pod for GptPartitionName {}
#[allow(unsafe_code)]
unsafe impl Zeroable for GptPartitionName {}

impl GptPartitionName {
    /// Number of UCS-2 units in the name field.
    pub const NUM_UNITS: usize = 36;

    /// True if the first character is a null terminator.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0[0] == 0 && self.0[1] == 0
    }

    /// Iterate over the characters of the name. Iteration stops at the
    /// first null terminator or the end of the field; invalid characters
    /// become the Unicode replacement character.
    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        GptPartitionNameCharIter {
            name: self,
            byte_index: 0,
        }
    }

    /// Narrow each UCS-2 unit to its low eight bits, the form the label
    /// model stores.
    #[must_use]
    pub fn to_narrow(&self) -> [u8; Self::NUM_UNITS] {
        let mut narrow = [0; Self::NUM_UNITS];
        for (unit, b) in narrow.iter_mut().enumerate() {
            *b = self.0[unit * 2];
        }
        narrow
    }

    /// Widen narrowed name bytes back to UCS-2 units.
    #[must_use]
    pub fn from_narrow(narrow: &[u8; Self::NUM_UNITS]) -> Self {
        let mut name = Self::default();
        for (unit, &b) in narrow.iter().enumerate() {
            name.0[unit * 2] = b;
        }
        name
    }
}

impl Display for GptPartitionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl Default for GptPartitionName {
    fn default() -> Self {
        Self([0; 72])
    }
}

/// Error type for [`GptPartitionName::from_str`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum GptPartitionNameFromStrError {
    /// Input string is too long.
    Length,

    /// Input string contains a character that cannot be represented in
    /// UCS-2.
    InvalidChar,
}

impl Display for GptPartitionNameFromStrError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => f.write_str("input string is too long"),
            Self::InvalidChar => f.write_str(
                "input string contains a character that cannot be represented in UCS-2",
            ),
        }
    }
}

impl std::error::Error for GptPartitionNameFromStrError {}

impl From<ucs2::Error> for GptPartitionNameFromStrError {
    fn from(err: ucs2::Error) -> Self {
        match err {
            ucs2::Error::BufferOverflow => Self::Length,
            ucs2::Error::MultiByte => Self::InvalidChar,
        }
    }
}

impl FromStr for GptPartitionName {
    type Err = GptPartitionNameFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut name = Self::default();

        // Leave room for the null terminator.
        let max_index = name.0.len() - 2 - 1;

        let mut index = 0;
        ucs2::encode_with(s, |c| {
            if index >= max_index {
                Err(ucs2::Error::BufferOverflow)
            } else {
                name.0[index] = u8::try_from(c & 0xff).unwrap();
                name.0[index + 1] = u8::try_from((c & 0xff00) >> 8).unwrap();
                index += 2;
                Ok(())
            }
        })?;
        Ok(name)
    }
}

/// An entry within the GPT partition array.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable)]
#[repr(C)]
pub struct GptPartitionEntry {
    /// ID of the partition's type. The all-zero GUID marks the slot as
    /// not in use.
    pub partition_type_guid: GuidLe,

    /// GUID unique to this partition entry.
    pub unique_partition_guid: GuidLe,

    /// LBA of the partition's first block.
    pub starting_lba: LbaLe,

    /// LBA of the partition's last block.
    pub ending_lba: LbaLe,

    /// Attribute bit flags.
    pub attributes: GptPartitionAttributes,

    /// Human readable partition label.
    pub name: GptPartitionName,
}

// The entry stride and the CRC ranges assume the standard entry size.
const _: () = assert!(mem::size_of::<GptPartitionEntry>() == GptPartitionEntry::SIZE);

impl GptPartitionEntry {
    /// On-disk size in bytes of one entry.
    pub const SIZE: usize = 128;

    /// Check whether the slot is in use. Slots whose type GUID is the
    /// all-zero GUID carry no partition data.
    #[must_use]
    pub fn is_used(&self) -> bool {
        self.partition_type_guid != GuidLe::default()
    }
}

impl Display for GptPartitionEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if !self.is_used() {
            return f.write_str("unused entry");
        }
        write!(
            f,
            "\"{}\" ({}..={}) type {}, guid {}, attrs {}",
            self.name,
            self.starting_lba,
            self.ending_lba,
            self.partition_type_guid,
            self.unique_partition_guid,
            self.attributes,
        )
    }
}
