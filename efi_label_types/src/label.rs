// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{
    GptPartitionEntry, GptPartitionName, GptPartitionNameFromStrError, Guid,
    PartitionTag,
};
use bitflags::bitflags;
use core::fmt::{self, Display, Formatter};

/// Smallest partition entry array the format permits: 16 KiB, enough
/// for 128 entries of 128 bytes.
pub const MIN_ARRAY_SIZE: u64 = 16 * 1024;

/// Size in bytes of the conventional trailing reserved partition.
pub const RESERVED_PARTITION_BYTES: u64 = 8 * 1024 * 1024;

bitflags! {
    /// State flags attached to a parsed label.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
    pub struct LabelFlags: u32 {
        /// The primary label was corrupt and the reader fell back to a
        /// backup label.
        const PRIMARY_CORRUPT = 0x1;
    }
}

/// One partition slot of a [`DiskLabel`].
///
/// Every slot of the label is materialised whether used or not; unused
/// slots carry [`PartitionTag::UNASSIGNED`] and a size of zero.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Partition {
    /// Partition type GUID as found on disk, canonical byte order.
    pub type_guid: Guid,

    /// GUID unique to this partition, canonical byte order.
    pub unique_guid: Guid,

    /// Local tag derived from the type GUID.
    pub tag: PartitionTag,

    /// Low sixteen bits of the GPT attribute word.
    pub attrs: u16,

    /// First sector of the partition.
    pub start_lba: u64,

    /// Size in sectors. A partition covers
    /// `start_lba..=start_lba + size_lba - 1`.
    pub size_lba: u64,

    /// Partition name, one byte per UCS-2 unit (narrowed to the low
    /// eight bits).
    pub name: [u8; GptPartitionName::NUM_UNITS],
}

impl Partition {
    /// Last sector of the partition. Meaningful only when `size_lba` is
    /// non-zero; an empty partition wraps to `start_lba - 1`.
    #[must_use]
    pub fn end_lba(&self) -> u64 {
        self.start_lba.wrapping_add(self.size_lba).wrapping_sub(1)
    }

    /// Set the partition name from a string. Characters that do not fit
    /// one UCS-2 unit, or names longer than the field, are rejected.
    pub fn set_name(&mut self, name: &str) -> Result<(), GptPartitionNameFromStrError> {
        let encoded: GptPartitionName = name.parse()?;
        self.name = encoded.to_narrow();
        Ok(())
    }

    /// Get the partition name as a string, stopping at the first NUL.
    #[must_use]
    pub fn name_str(&self) -> String {
        self.name
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| char::from(b))
            .collect()
    }
}

impl Default for Partition {
    fn default() -> Self {
        Self {
            type_guid: Guid::ZERO,
            unique_guid: Guid::ZERO,
            tag: PartitionTag::UNASSIGNED,
            attrs: 0,
            start_lba: 0,
            size_lba: 0,
            name: [0; GptPartitionName::NUM_UNITS],
        }
    }
}

/// Error type for [`DiskLabel::validate`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CheckError {
    /// A slot is unassigned but carries a size.
    #[error("partition {index} is \"unassigned\" but has a size of {size}")]
    UnassignedHasSize {
        /// Slot index.
        index: usize,
        /// Size in sectors.
        size: u64,
    },

    /// More than one slot carries the reserved tag.
    #[error("found duplicate reserved partition at {index}")]
    DuplicateReserved {
        /// Slot index of the second reserved partition.
        index: usize,
    },

    /// A partition starts outside the usable region.
    #[error("partition {index} starts at {start}; it must be between {first} and {last}")]
    StartOutOfRange {
        /// Slot index.
        index: usize,
        /// Offending start sector.
        start: u64,
        /// First usable sector.
        first: u64,
        /// Last usable sector.
        last: u64,
    },

    /// A partition ends outside the usable region.
    #[error("partition {index} ends at {end}; it must be between {first} and {last}")]
    EndOutOfRange {
        /// Slot index.
        index: usize,
        /// Offending end sector (exclusive).
        end: u64,
        /// First usable sector.
        first: u64,
        /// Last usable sector.
        last: u64,
    },

    /// Two partitions cover overlapping sector ranges.
    #[error("partition {index} overlaps partition {other}")]
    Overlap {
        /// Slot index of one partition.
        index: usize,
        /// Slot index of the other.
        other: usize,
    },
}

/// In-memory representation of a disk's partition scheme.
///
/// A label is created either by [`init`] (a blank label sized to the
/// device) or by the reader (decoded from the device), mutated freely
/// by its owner, and then handed to the writer. Labels own their
/// partitions by value and are not shared.
///
/// [`init`]: Self::init
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiskLabel {
    /// GPT revision, 0x00010000.
    pub version: u32,

    /// Logical block size in bytes, discovered from the device.
    pub lba_size: u32,

    /// First sector usable for partition data.
    pub first_usable_lba: u64,

    /// Last sector usable for partition data.
    pub last_usable_lba: u64,

    /// Sector of the backup header.
    pub alternate_lba: u64,

    /// Highest addressable sector on the device.
    pub last_lba: u64,

    /// Unique ID for the disk, canonical byte order.
    pub disk_guid: Guid,

    /// State flags; [`LabelFlags::PRIMARY_CORRUPT`] is set when the
    /// reader used a backup label.
    pub flags: LabelFlags,

    /// Partition slots, one per entry of the on-disk array.
    pub parts: Vec<Partition>,
}

impl DiskLabel {
    /// The GPT revision this library reads and writes.
    pub const CURRENT_VERSION: u32 = 0x0001_0000;

    /// Number of blocks occupied by one copy of the label metadata: one
    /// header block plus the partition entry array rounded up to whole
    /// blocks, with the array never smaller than [`MIN_ARRAY_SIZE`].
    #[must_use]
    pub fn label_blocks(n_parts: u32, lba_size: u32) -> u64 {
        let lba_size = u64::from(lba_size);
        let array_bytes = u64::from(n_parts) * GptPartitionEntry::SIZE as u64;
        let mut nblocks = 1 + (array_bytes + lba_size - 1) / lba_size;
        if nblocks * lba_size < MIN_ARRAY_SIZE + lba_size {
            nblocks = MIN_ARRAY_SIZE / lba_size + 1;
        }
        nblocks
    }

    /// Create a blank label for a device of `capacity` sectors of
    /// `lba_size` bytes. All `n_parts` slots are unassigned; the usable
    /// region leaves room for the protective MBR, both headers, and
    /// both entry arrays.
    #[must_use]
    pub fn init(
        n_parts: u32,
        capacity: u64,
        lba_size: u32,
        disk_guid: Guid,
    ) -> Self {
        let nblocks = Self::label_blocks(n_parts, lba_size);
        let last_lba = capacity.saturating_sub(1);
        Self {
            version: Self::CURRENT_VERSION,
            lba_size,
            // One extra block ahead of the metadata for the PMBR; with
            // 512-byte blocks and 128 or fewer partitions this works
            // out to sector 34.
            first_usable_lba: nblocks + 1,
            last_usable_lba: last_lba.saturating_sub(nblocks),
            alternate_lba: last_lba,
            last_lba,
            disk_guid,
            flags: LabelFlags::empty(),
            parts: vec![Partition::default(); usize_from(n_parts)],
        }
    }

    /// Number of partition slots.
    #[must_use]
    pub fn n_parts(&self) -> u32 {
        u32::try_from(self.parts.len()).expect("slot count fits in u32")
    }

    /// Number of sectors of the conventional 8 MiB trailing reserved
    /// partition, rounded up to the block size.
    #[must_use]
    pub fn reserved_sectors(&self) -> u64 {
        let lba_size = u64::from(self.lba_size);
        (RESERVED_PARTITION_BYTES + lba_size - 1) / lba_size
    }

    /// Index of the slot tagged reserved, if any.
    #[must_use]
    pub fn reserved_index(&self) -> Option<usize> {
        self.parts
            .iter()
            .position(|p| p.tag == PartitionTag::RESERVED)
    }

    /// Check the label against the format invariants before writing:
    /// unassigned slots must be empty, at most one slot is reserved,
    /// partitions lie within the usable region, and no two partitions
    /// overlap.
    ///
    /// A slot tagged unassigned that carries a non-zero type GUID is
    /// normalised to [`PartitionTag::UNKNOWN`] rather than treated as
    /// missing; the writer will then refuse it for lack of a reverse
    /// mapping.
    pub fn validate(&mut self) -> Result<(), CheckError> {
        let mut resv_part = None;
        for i in 0..self.parts.len() {
            let (tag, size) = (self.parts[i].tag, self.parts[i].size_lba);
            if tag == PartitionTag::UNASSIGNED {
                if size != 0 {
                    return Err(CheckError::UnassignedHasSize { index: i, size });
                }
                if self.parts[i].type_guid.is_zero() {
                    continue;
                }
                // A non-zero type GUID without a table entry stays
                // visible as "unknown" instead of vanishing.
                self.parts[i].tag = PartitionTag::UNKNOWN;
            }

            if self.parts[i].tag == PartitionTag::RESERVED {
                if resv_part.is_some() {
                    return Err(CheckError::DuplicateReserved { index: i });
                }
                resv_part = Some(i);
            }

            let start = self.parts[i].start_lba;
            let size = self.parts[i].size_lba;
            if start < self.first_usable_lba || start > self.last_usable_lba {
                return Err(CheckError::StartOutOfRange {
                    index: i,
                    start,
                    first: self.first_usable_lba,
                    last: self.last_usable_lba,
                });
            }
            let end = start.wrapping_add(size);
            if end < self.first_usable_lba || end > self.last_usable_lba + 1 {
                return Err(CheckError::EndOutOfRange {
                    index: i,
                    end,
                    first: self.first_usable_lba,
                    last: self.last_usable_lba,
                });
            }

            for j in 0..self.parts.len() {
                let istart = self.parts[i].start_lba;
                let isize = self.parts[i].size_lba;
                let jstart = self.parts[j].start_lba;
                let jsize = self.parts[j].size_lba;
                if i != j && isize != 0 && jsize != 0 {
                    let jend = jstart + jsize - 1;
                    if jstart <= istart && istart <= jend {
                        return Err(CheckError::Overlap { index: i, other: j });
                    }
                }
            }
        }
        Ok(())
    }
}

impl Display for DiskLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DiskLabel {{ guid: {}, lba_size: {}, slots: {}, usable: {}..={}, alternate: {}, last: {}, flags: {:?} }}",
            self.disk_guid,
            self.lba_size,
            self.parts.len(),
            self.first_usable_lba,
            self.last_usable_lba,
            self.alternate_lba,
            self.last_lba,
            self.flags,
        )
    }
}

fn usize_from(v: u32) -> usize {
    usize::try_from(v).expect("u32 fits in usize")
}
