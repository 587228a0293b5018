// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{Crc32, GuidLe, LbaLe, U32Le, U64Le};
use bytemuck::{bytes_of, Pod, Zeroable};
use core::fmt::{self, Display, Formatter};
use core::mem;

/// GPT header signature.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable)]
#[repr(transparent)]
pub struct GptHeaderSignature(pub U64Le);

impl GptHeaderSignature {
    /// EFI-compatible partition table header. This is the only valid
    /// signature.
    pub const EFI_COMPATIBLE_PARTITION_TABLE_HEADER: Self =
        Self(U64Le(*b"EFI PART"));

    /// Convert to [`u64`] with the host's endianness.
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0.to_u64()
    }
}

impl Default for GptHeaderSignature {
    fn default() -> Self {
        Self::EFI_COMPATIBLE_PARTITION_TABLE_HEADER
    }
}

impl Display for GptHeaderSignature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if *self == Self::EFI_COMPATIBLE_PARTITION_TABLE_HEADER {
            f.write_str("sig \"EFI PART\"")
        } else {
            write!(f, "bad sig {:#018x}", self.to_u64())
        }
    }
}

/// GPT header revision.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable)]
#[repr(transparent)]
pub struct GptHeaderRevision(pub U32Le);

impl GptHeaderRevision {
    /// Version 1.0. This is the only valid revision.
    pub const VERSION_1_0: Self = Self(U32Le::from_u32(0x0001_0000));
}

impl Default for GptHeaderRevision {
    fn default() -> Self {
        Self::VERSION_1_0
    }
}

impl Display for GptHeaderRevision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0.to_u32())
    }
}

/// GPT header that appears near the start and at the end of a
/// GPT-formatted disk.
///
/// The defined region is 92 bytes; the rest of the containing block is
/// reserved and written as zeroes.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable,
)]
#[repr(C)]
pub struct GptHeader {
    /// Magic signature, `"EFI PART"` in a valid header.
    pub signature: GptHeaderSignature,

    /// Revision number, 0x00010000 in a valid header.
    pub revision: GptHeaderRevision,

    /// Size of the defined header region in bytes. At least 92 and no
    /// larger than the block size in a valid header.
    pub header_size: U32Le,

    /// CRC32 of the first [`header_size`] bytes, computed with this
    /// field zeroed.
    ///
    /// [`header_size`]: Self::header_size
    pub header_crc32: Crc32,

    /// Reserved, must be zero.
    pub reserved: U32Le,

    /// The LBA that contains this header.
    pub my_lba: LbaLe,

    /// The LBA that contains the alternate header.
    pub alternate_lba: LbaLe,

    /// First LBA usable for partition data.
    pub first_usable_lba: LbaLe,

    /// Last LBA usable for partition data.
    pub last_usable_lba: LbaLe,

    /// Unique ID for the disk.
    pub disk_guid: GuidLe,

    /// First LBA of the partition entry array.
    pub partition_entry_lba: LbaLe,

    /// Number of slots in the partition entry array.
    pub number_of_partition_entries: U32Le,

    /// Size in bytes of each entry in the partition entry array.
    pub size_of_partition_entry: U32Le,

    /// CRC32 of the partition entry array.
    pub partition_entry_array_crc32: Crc32,
}

// The codec depends on the defined region being exactly 92 bytes with
// no padding.
const _: () = assert!(mem::size_of::<GptHeader>() == GptHeader::SIZE);

impl GptHeader {
    /// Size in bytes of the defined header region.
    pub const SIZE: usize = 92;

    /// Check if the header's signature is `"EFI PART"`.
    #[must_use]
    pub fn is_signature_valid(&self) -> bool {
        self.signature
            == GptHeaderSignature::EFI_COMPATIBLE_PARTITION_TABLE_HEADER
    }

    /// Calculate the header's CRC32 over the 92-byte defined region,
    /// with the `header_crc32` field treated as zero. The checksum is
    /// returned, not stored.
    #[must_use]
    pub fn calculate_crc32(&self) -> Crc32 {
        let crc = crc::Crc::<u32>::new(&Crc32::ALGORITHM);
        let mut digest = crc.digest();
        let bytes = bytes_of(self);
        digest.update(&bytes[..16]);
        digest.update(&[0u8; 4]); // Zeroes for the `header_crc32` field.
        digest.update(&bytes[20..]);
        Crc32(U32Le::from_u32(digest.finalize()))
    }

    /// Recompute and store the header's CRC32.
    pub fn update_crc32(&mut self) {
        self.header_crc32 = self.calculate_crc32();
    }
}

impl Default for GptHeader {
    fn default() -> Self {
        Self {
            signature: GptHeaderSignature::default(),
            revision: GptHeaderRevision::default(),
            header_size: U32Le::from_u32(
                u32::try_from(Self::SIZE).expect("header size fits in u32"),
            ),
            header_crc32: Crc32::default(),
            reserved: U32Le::default(),
            my_lba: LbaLe::default(),
            alternate_lba: LbaLe::default(),
            first_usable_lba: LbaLe::default(),
            last_usable_lba: LbaLe::default(),
            disk_guid: GuidLe::default(),
            partition_entry_lba: LbaLe::default(),
            number_of_partition_entries: U32Le::default(),
            size_of_partition_entry: U32Le::from_u32(128),
            partition_entry_array_crc32: Crc32::default(),
        }
    }
}

impl Display for GptHeader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GptHeader {{ {}, rev {}, {} bytes, crc {}, at {} (alternate {}), \
             usable {}..={}, guid {}, {} entries of {} at {}, array crc {} }}",
            self.signature,
            self.revision,
            self.header_size,
            self.header_crc32,
            self.my_lba,
            self.alternate_lba,
            self.first_usable_lba,
            self.last_usable_lba,
            self.disk_guid,
            self.number_of_partition_entries,
            self.size_of_partition_entry,
            self.partition_entry_lba,
            self.partition_entry_array_crc32,
        )
    }
}
