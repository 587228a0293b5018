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
use core::mem;

/// Legacy MBR cylinder/head/sector address.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable)]
#[repr(transparent)]
pub struct Chs(pub [u8; 3]);

impl Chs {
    /// Beginning address used by a protective partition record,
    /// equivalent to LBA 1.
    pub const PROTECTIVE_START: Self = Self([0x00, 0x02, 0x00]);

    /// Ending address used by a protective partition record when the
    /// true end is not representable in CHS form.
    pub const PROTECTIVE_END: Self = Self([0xff, 0xff, 0xff]);
}

impl Display for Chs {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CHS={:#02x}/{:#02x}/{:#02x}", self.0[0], self.0[1], self.0[2])
    }
}

/// Legacy MBR partition record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd, Pod, Zeroable)]
#[repr(C)]
pub struct MbrPartitionRecord {
    /// `0x80` marks the record active (legacy bootable); any other
    /// value marks it inactive.
    pub boot_indicator: u8,

    /// Start of the partition in CHS form.
    pub start_chs: Chs,

    /// Partition type. `0xee` marks the protective record covering a
    /// GPT-formatted disk.
    pub os_indicator: u8,

    /// End of the partition in CHS form.
    pub end_chs: Chs,

    /// Starting LBA of the partition.
    pub starting_lba: U32Le,

    /// Size of the partition in logical blocks.
    pub size_in_lba: U32Le,
}

impl MbrPartitionRecord {
    /// Boot-indicator value marking the record active.
    pub const ACTIVE: u8 = 0x80;

    /// OS-indicator value of an EFI protective record.
    pub const PROTECTIVE_TYPE: u8 = 0xee;

    /// Build the protective record for a disk whose highest addressable
    /// sector is `last_lba`. The record starts at LBA 1 and its size
    /// field carries `last_lba` saturated to 32 bits.
    #[must_use]
    pub fn protective(last_lba: u64, active: bool) -> Self {
        Self {
            boot_indicator: if active { Self::ACTIVE } else { 0 },
            start_chs: Chs::PROTECTIVE_START,
            os_indicator: Self::PROTECTIVE_TYPE,
            end_chs: Chs::PROTECTIVE_END,
            starting_lba: U32Le::from_u32(1),
            size_in_lba: U32Le::from_u32(
                u32::try_from(last_lba).unwrap_or(0xffff_ffff),
            ),
        }
    }

    /// Check whether this record carries the EFI protective type.
    #[must_use]
    pub fn is_protective(&self) -> bool {
        self.os_indicator == Self::PROTECTIVE_TYPE
    }
}

impl Display for MbrPartitionRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type {:#04x} at {}+{}",
            self.os_indicator, self.starting_lba, self.size_in_lba
        )?;
        if self.boot_indicator == Self::ACTIVE {
            f.write_str(" (active)")?;
        }
        Ok(())
    }
}

/// Legacy master boot record, occupying the first 512 bytes of the
/// first block.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(C)]
pub struct Mbr {
    /// Boot code used on non-UEFI systems. Preserved, never generated.
    pub boot_strap_code: [u8; 440],

    /// Unique identifier for the disk. Preserved alongside the boot
    /// code.
    pub unique_mbr_disk_signature: [u8; 4],

    /// Reserved field.
    pub unknown: [u8; 2],

    /// Four legacy partition records.
    pub partitions: [MbrPartitionRecord; 4],

    /// MBR signature, `0xaa55`.
    pub signature: [u8; 2],
}

const _: () = assert!(mem::size_of::<Mbr>() == Mbr::SIZE);

// Manual implementation needed because of the large boot_strap_code
// array field.
#[allow(unsafe_code)]
unsafe impl Pod for Mbr {}
#[allow(unsafe_code)]
unsafe impl Zeroable for Mbr {}

impl Mbr {
    /// Size in bytes of the MBR image.
    pub const SIZE: usize = 512;

    /// The `0xaa55` signature as stored at bytes 510 and 511.
    pub const SIGNATURE: [u8; 2] = [0x55, 0xaa];

    /// Check the trailing two-byte signature.
    #[must_use]
    pub fn is_signature_valid(&self) -> bool {
        self.signature == Self::SIGNATURE
    }

    /// Check whether any of the four partition records carries the EFI
    /// protective type.
    #[must_use]
    pub fn has_protective_record(&self) -> bool {
        self.partitions.iter().any(MbrPartitionRecord::is_protective)
    }

    /// Clear all four partition records.
    pub fn clear_partitions(&mut self) {
        self.partitions = [MbrPartitionRecord::default(); 4];
    }
}

impl Default for Mbr {
    fn default() -> Self {
        Self {
            boot_strap_code: [0; 440],
            unique_mbr_disk_signature: [0; 4],
            unknown: [0; 2],
            partitions: [MbrPartitionRecord::default(); 4],
            signature: Self::SIGNATURE,
        }
    }
}

impl Display for Mbr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let boot_code = if self.boot_strap_code.iter().any(|&b| b != 0) {
            "present"
        } else {
            "empty"
        };
        write!(
            f,
            "Mbr {{ boot code {boot_code}, signature {:02x}{:02x}",
            self.signature[1], self.signature[0]
        )?;
        for (slot, record) in self.partitions.iter().enumerate() {
            if record.os_indicator != 0 {
                write!(f, ", slot {slot}: {record}")?;
            }
        }
        f.write_str(" }")
    }
}
