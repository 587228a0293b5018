// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use bytemuck::{Pod, Zeroable};
use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

/// Globally-unique identifier in canonical byte order.
///
/// The sixteen bytes are stored exactly as they read in the textual
/// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` form. This is the order used
/// throughout the in-memory label model; the partially little-endian
/// order GPT structures use on disk is represented by [`GuidLe`], and
/// converting between the two is total and self-inverse.
///
/// # Examples
///
/// ```
/// use efi_label_types::Guid;
///
/// let guid = Guid::from_fields(
///     0x01234567,
///     0x89ab,
///     0xcdef,
///     0x01,
///     0x23,
///     [0x45, 0x67, 0x89, 0xab, 0xcd, 0xef],
/// );
/// assert_eq!(guid.to_string(), "01234567-89ab-cdef-0123-456789abcdef");
/// assert_eq!(guid.to_le().to_guid(), guid);
/// ```
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable,
)]
#[repr(transparent)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    /// GUID with all bytes set to zero.
    pub const ZERO: Self = Self([0; 16]);

    /// Create a GUID from its five textual fields.
    #[must_use]
    pub const fn from_fields(
        time_low: u32,
        time_mid: u16,
        time_high_and_version: u16,
        clock_seq_high_and_reserved: u8,
        clock_seq_low: u8,
        node: [u8; 6],
    ) -> Self {
        let a = time_low.to_be_bytes();
        let b = time_mid.to_be_bytes();
        let c = time_high_and_version.to_be_bytes();
        Self([
            a[0],
            a[1],
            a[2],
            a[3],
            b[0],
            b[1],
            c[0],
            c[1],
            clock_seq_high_and_reserved,
            clock_seq_low,
            node[0],
            node[1],
            node[2],
            node[3],
            node[4],
            node[5],
        ])
    }

    /// True if every byte is zero.
    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == [0; 16]
    }

    /// Convert to the on-disk byte order.
    #[must_use]
    pub const fn to_le(self) -> GuidLe {
        GuidLe(swap_guid_groups(self.0))
    }
}

impl Default for Guid {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            b[0], b[1], b[2], b[3],
            b[4], b[5],
            b[6], b[7],
            b[8], b[9],
            b[10], b[11], b[12], b[13], b[14], b[15],
        )
    }
}

/// GUID stored in the mixed-endian on-disk order.
///
/// GPT stores the first three GUID fields little-endian and the final
/// eight bytes as-is (Appendix A of the UEFI Specification). Only the
/// byte order differs from [`Guid`]; both directions of the conversion
/// swap the same byte groups.
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
pub struct GuidLe(pub [u8; 16]);

impl GuidLe {
    /// Convert to the canonical byte order.
    #[must_use]
    pub const fn to_guid(self) -> Guid {
        Guid(swap_guid_groups(self.0))
    }
}

impl Display for GuidLe {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.to_guid().fmt(f)
    }
}

const fn swap_guid_groups(b: [u8; 16]) -> [u8; 16] {
    [
        b[3], b[2], b[1], b[0], b[5], b[4], b[7], b[6], b[8], b[9], b[10],
        b[11], b[12], b[13], b[14], b[15],
    ]
}

/// Error type for [`Guid::from_str`].
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd,
)]
pub struct GuidFromStrError;

impl Display for GuidFromStrError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(
            "not a \"xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx\" GUID string",
        )
    }
}

impl std::error::Error for GuidFromStrError {}

impl FromStr for Guid {
    type Err = GuidFromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Byte offset of each hex pair in the textual form; the dashes
        // make them non-uniform.
        const OFFSETS: [usize; 16] = [
            0, 2, 4, 6, 9, 11, 14, 16, 19, 21, 24, 26, 28, 30, 32, 34,
        ];

        let text = s.as_bytes();
        if text.len() != 36 {
            return Err(GuidFromStrError);
        }
        if [8, 13, 18, 23].into_iter().any(|dash| text[dash] != b'-') {
            return Err(GuidFromStrError);
        }

        let mut bytes = [0; 16];
        for (byte, offset) in bytes.iter_mut().zip(OFFSETS) {
            let pair = s.get(offset..offset + 2).ok_or(GuidFromStrError)?;
            *byte =
                u8::from_str_radix(pair, 16).map_err(|_| GuidFromStrError)?;
        }
        Ok(Guid(bytes))
    }
}
