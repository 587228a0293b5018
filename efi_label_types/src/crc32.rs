// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::U32Le;
use bytemuck::{Pod, Zeroable};
use core::fmt::{self, Display, Formatter};

/// 32-bit CRC (cyclic redundancy check) stored little-endian.
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
pub struct Crc32(pub U32Le);

impl Crc32 {
    /// CRC32 algorithm used by the GPT header checksums:
    /// [`crc::CRC_32_ISO_HDLC`].
    ///
    /// This is the reflected IEEE 802.3 CRC with polynomial 0xEDB88320,
    /// initial value 0xFFFFFFFF, and final XOR 0xFFFFFFFF.
    pub const ALGORITHM: crc::Algorithm<u32> = crc::CRC_32_ISO_HDLC;

    /// Compute the checksum of a byte slice.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let crc = crc::Crc::<u32>::new(&Self::ALGORITHM);
        let mut digest = crc.digest();
        digest.update(bytes);
        Self(U32Le::from_u32(digest.finalize()))
    }

    /// Get the checksum as a [`u32`] with the host's endianness.
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self.0.to_u32()
    }
}

impl Display for Crc32 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.to_u32())
    }
}
