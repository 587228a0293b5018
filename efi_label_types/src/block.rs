// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::U64Le;
use bytemuck::{Pod, Zeroable};
use core::fmt::{self, Display, Formatter};
use core::num::NonZeroU32;

/// Logical block address stored as a [`U64Le`].
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
pub struct LbaLe(pub U64Le);

impl LbaLe {
    /// Create a logical block address from a [`u64`].
    #[must_use]
    pub const fn from_u64(v: u64) -> Self {
        Self(U64Le::from_u64(v))
    }

    /// Get the logical block address as a [`u64`].
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0.to_u64()
    }
}

impl Display for LbaLe {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.to_u64().fmt(f)
    }
}

/// Size of a logical block in bytes.
///
/// A block is never smaller than 512 bytes, since sector 0 must hold
/// the whole 512-byte MBR image.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct BlockSize(NonZeroU32);

impl BlockSize {
    /// 512-byte blocks.
    pub const B512: Self = match Self::new(512) {
        Some(size) => size,
        None => panic!("512 is a valid block size"),
    };

    /// 4096-byte blocks.
    pub const B4096: Self = match Self::new(4096) {
        Some(size) => size,
        None => panic!("4096 is a valid block size"),
    };

    /// Create a `BlockSize` from a byte count. Sizes below 512 yield
    /// `None`.
    #[must_use]
    pub const fn new(num_bytes: u32) -> Option<Self> {
        if num_bytes < 512 {
            return None;
        }
        match NonZeroU32::new(num_bytes) {
            Some(size) => Some(Self(size)),
            None => None,
        }
    }

    /// The size in bytes.
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self.0.get()
    }

    /// The size in bytes, widened for sector arithmetic.
    #[must_use]
    pub fn to_u64(self) -> u64 {
        u64::from(self.0.get())
    }

    /// The size in bytes as a buffer length.
    #[must_use]
    pub fn to_usize(self) -> usize {
        self.0
            .get()
            .try_into()
            .expect("block size exceeds the address space")
    }

    /// Panic if `buffer` is empty or not a multiple of the block size.
    pub fn assert_valid_block_buffer(self, buffer: &[u8]) {
        assert!(!buffer.is_empty());
        assert_eq!(buffer.len() % self.to_usize(), 0);
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::B512
    }
}

impl Display for BlockSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}
