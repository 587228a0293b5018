// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::Guid;
use core::fmt::{self, Display, Formatter};

/// Boot partition type.
pub const EFI_BOOT: Guid = sun_guid(0x6a82_cb45);
/// Root filesystem partition type.
pub const EFI_ROOT: Guid = sun_guid(0x6a85_cf4d);
/// Swap partition type.
pub const EFI_SWAP: Guid = sun_guid(0x6a87_c46f);
/// `/usr` partition type.
pub const EFI_USR: Guid = sun_guid(0x6a89_8cc3);
/// Whole-disk backup partition type.
pub const EFI_BACKUP: Guid = sun_guid(0x6a8b_642b);
/// `/var` partition type.
pub const EFI_VAR: Guid = sun_guid(0x6a8e_f2e9);
/// `/home` partition type.
pub const EFI_HOME: Guid = sun_guid(0x6a90_ba39);
/// Alternate-sector partition type.
pub const EFI_ALTSCTR: Guid = sun_guid(0x6a92_83a5);
/// Reserved partition type. By convention the reserved partition sits at
/// the end of the data region; see
/// [`DiskLabel::reserved_sectors`](crate::DiskLabel::reserved_sectors).
pub const EFI_RESERVED: Guid = sun_guid(0x6a94_5a3b);
/// EFI system partition type.
pub const EFI_SYSTEM: Guid = Guid::from_fields(
    0xc12a_7328,
    0xf81f,
    0x11d2,
    0xba,
    0x4b,
    [0x00, 0xa0, 0xc9, 0x3e, 0xc9, 0x3b],
);
/// Partition containing a legacy MBR.
pub const EFI_LEGACY_MBR: Guid = Guid::from_fields(
    0x024d_ee41,
    0x33e7,
    0x11d3,
    0x9d,
    0x69,
    [0x00, 0x08, 0xc7, 0x81, 0xf3, 0x9f],
);
/// Veritas public-region partition type.
pub const EFI_SYMC_PUB: Guid = sun_guid(0x6a96_30d1);
/// Veritas CDS partition type.
pub const EFI_SYMC_CDS: Guid = sun_guid(0x6a98_0767);
/// Microsoft reserved partition type.
pub const EFI_MSFT_RESV: Guid = Guid::from_fields(
    0xe3c9_e316,
    0x0b5c,
    0x4db8,
    0x81,
    0x7d,
    [0xf9, 0x2d, 0xf0, 0x02, 0x15, 0xae],
);
/// Basic data partition type.
pub const EFI_DELL_BASIC: Guid = Guid::from_fields(
    0xebd0_a0a2,
    0xb9e5,
    0x4433,
    0x87,
    0xc0,
    [0x68, 0xb6, 0xb7, 0x26, 0x99, 0xc7],
);
/// Software-RAID partition type.
pub const EFI_DELL_RAID: Guid = Guid::from_fields(
    0xa19d_880f,
    0x05fc,
    0x4d3b,
    0xa0,
    0x06,
    [0x74, 0x3f, 0x0f, 0x84, 0x91, 0x1e],
);
/// Linux swap partition type.
pub const EFI_DELL_SWAP: Guid = Guid::from_fields(
    0x0657_fd6d,
    0xa4ab,
    0x43c4,
    0x84,
    0xe5,
    [0x09, 0x33, 0xc8, 0x4b, 0x4f, 0x4f],
);
/// Linux LVM partition type.
pub const EFI_DELL_LVM: Guid = Guid::from_fields(
    0xe6d6_d379,
    0xf507,
    0x44c2,
    0xa2,
    0x3c,
    [0x23, 0x8f, 0x2a, 0x3d, 0xf9, 0x28],
);
/// Linux reserved partition type.
pub const EFI_DELL_RESV: Guid = Guid::from_fields(
    0x8da6_3339,
    0x0007,
    0x60c0,
    0xc4,
    0x36,
    [0x08, 0x3a, 0xc8, 0x23, 0x09, 0x08],
);
/// Apple HFS+ partition type.
pub const EFI_AAPL_HFS: Guid = aapl_guid(0x4846_5300);
/// Apple UFS partition type.
pub const EFI_AAPL_UFS: Guid = aapl_guid(0x5546_5300);
/// Apple ZFS partition type. Identical to [`EFI_USR`]; a forward lookup
/// resolves to the USR tag.
pub const EFI_AAPL_ZFS: Guid = sun_guid(0x6a89_8cc3);
/// Apple APFS partition type.
pub const EFI_AAPL_APFS: Guid = aapl_guid(0x7c34_57ef);
/// BIOS boot partition type.
pub const EFI_BIOS_BOOT: Guid = Guid::from_fields(
    0x2168_6148,
    0x6449,
    0x6e6f,
    0x74,
    0x4e,
    [0x65, 0x65, 0x64, 0x45, 0x46, 0x49],
);
/// FreeBSD boot partition type.
pub const EFI_FREEBSD_BOOT: Guid = Guid::from_fields(
    0x83bd_6b9d,
    0x7f41,
    0x11dc,
    0xbe,
    0x0b,
    [0x00, 0x15, 0x60, 0xb8, 0x4f, 0x0f],
);
/// FreeBSD swap partition type.
pub const EFI_FREEBSD_SWAP: Guid = freebsd_guid(0x516e_7cb5);
/// FreeBSD UFS partition type.
pub const EFI_FREEBSD_UFS: Guid = freebsd_guid(0x516e_7cb6);
/// FreeBSD Vinum partition type.
pub const EFI_FREEBSD_VINUM: Guid = freebsd_guid(0x516e_7cb8);
/// FreeBSD ZFS partition type.
pub const EFI_FREEBSD_ZFS: Guid = freebsd_guid(0x516e_7cba);
/// FreeBSD NANDFS partition type.
pub const EFI_FREEBSD_NANDFS: Guid = Guid::from_fields(
    0x74ba_7dd9,
    0xa689,
    0x11e1,
    0xbd,
    0x04,
    [0x00, 0xe0, 0x81, 0x28, 0x6a, 0xcf],
);

const fn sun_guid(time_low: u32) -> Guid {
    Guid::from_fields(
        time_low,
        0x1dd2,
        0x11b2,
        0x99,
        0xa6,
        [0x08, 0x00, 0x20, 0x73, 0x66, 0x31],
    )
}

const fn aapl_guid(time_low: u32) -> Guid {
    Guid::from_fields(
        time_low,
        0x0000,
        0x11aa,
        0xaa,
        0x11,
        [0x00, 0x30, 0x65, 0x43, 0xec, 0xac],
    )
}

const fn freebsd_guid(time_low: u32) -> Guid {
    Guid::from_fields(
        time_low,
        0x6ecf,
        0x11d6,
        0x8f,
        0xf8,
        [0x00, 0x02, 0x2d, 0x09, 0x71, 0x2b],
    )
}

/// Local numeric identifier for a partition's role.
///
/// Tags are mapped bidirectionally to partition type GUIDs through a
/// fixed conversion table. Type GUIDs with no native tag use fabricated
/// values in the `0x10..=0x1d` range so the reverse table stays
/// unambiguous.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct PartitionTag(pub u16);

impl PartitionTag {
    /// Slot not in use.
    pub const UNASSIGNED: Self = Self(0x00);
    /// Boot partition.
    pub const BOOT: Self = Self(0x01);
    /// Root filesystem.
    pub const ROOT: Self = Self(0x02);
    /// Swap space.
    pub const SWAP: Self = Self(0x03);
    /// `/usr` filesystem.
    pub const USR: Self = Self(0x04);
    /// Whole-disk backup slice.
    pub const BACKUP: Self = Self(0x05);
    /// `/var` filesystem.
    pub const VAR: Self = Self(0x07);
    /// `/home` filesystem.
    pub const HOME: Self = Self(0x08);
    /// Alternate-sector region.
    pub const ALTSCTR: Self = Self(0x09);
    /// Trailing reserved partition.
    pub const RESERVED: Self = Self(0x0b);
    /// EFI system partition.
    pub const SYSTEM: Self = Self(0x0c);
    /// FreeBSD boot.
    pub const FREEBSD_BOOT: Self = Self(0x0d);
    /// FreeBSD swap.
    pub const FREEBSD_SWAP: Self = Self(0x0e);
    /// FreeBSD UFS.
    pub const FREEBSD_UFS: Self = Self(0x0f);
    /// Legacy MBR container (fabricated).
    pub const LEGACY_MBR: Self = Self(0x10);
    /// Veritas public region (fabricated).
    pub const SYMC_PUB: Self = Self(0x11);
    /// Veritas CDS (fabricated).
    pub const SYMC_CDS: Self = Self(0x12);
    /// Microsoft reserved (fabricated).
    pub const MSFT_RESV: Self = Self(0x13);
    /// Basic data (fabricated).
    pub const DELL_BASIC: Self = Self(0x14);
    /// Software RAID (fabricated).
    pub const DELL_RAID: Self = Self(0x15);
    /// Linux swap (fabricated).
    pub const DELL_SWAP: Self = Self(0x16);
    /// Linux LVM (fabricated).
    pub const DELL_LVM: Self = Self(0x17);
    /// BIOS boot partition.
    pub const BIOS_BOOT: Self = Self(0x18);
    /// Linux reserved (fabricated).
    pub const DELL_RESV: Self = Self(0x19);
    /// Apple HFS+ (fabricated).
    pub const AAPL_HFS: Self = Self(0x1a);
    /// Apple UFS (fabricated).
    pub const AAPL_UFS: Self = Self(0x1b);
    /// Apple ZFS (fabricated).
    pub const AAPL_ZFS: Self = Self(0x1c);
    /// Apple APFS (fabricated).
    pub const AAPL_APFS: Self = Self(0x1d);
    /// FreeBSD Vinum.
    pub const FREEBSD_VINUM: Self = Self(0x1e);
    /// FreeBSD ZFS.
    pub const FREEBSD_ZFS: Self = Self(0x1f);
    /// FreeBSD NANDFS.
    pub const FREEBSD_NANDFS: Self = Self(0x20);
    /// Type GUID present on disk but absent from the conversion table.
    pub const UNKNOWN: Self = Self(0xff);

    /// Resolve a type GUID to its tag. The all-zero GUID resolves to
    /// [`UNASSIGNED`]; a non-zero GUID with no table entry yields `None`
    /// (readers surface it as [`UNKNOWN`]).
    ///
    /// [`UNASSIGNED`]: Self::UNASSIGNED
    /// [`UNKNOWN`]: Self::UNKNOWN
    #[must_use]
    pub fn for_type_guid(guid: &Guid) -> Option<Self> {
        CONVERSION_TABLE
            .iter()
            .find(|(g, _)| g == guid)
            .map(|&(_, tag)| tag)
    }

    /// Resolve a tag to its type GUID. Tags with no table entry
    /// (including [`UNKNOWN`]) yield `None`; writers refuse to persist
    /// them because the type identity would be lost.
    ///
    /// [`UNKNOWN`]: Self::UNKNOWN
    #[must_use]
    pub fn to_type_guid(self) -> Option<Guid> {
        CONVERSION_TABLE
            .iter()
            .find(|&&(_, tag)| tag == self)
            .map(|&(guid, _)| guid)
    }
}

impl Display for PartitionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::UNASSIGNED => "unassigned",
            Self::BOOT => "boot",
            Self::ROOT => "root",
            Self::SWAP => "swap",
            Self::USR => "usr",
            Self::BACKUP => "backup",
            Self::VAR => "var",
            Self::HOME => "home",
            Self::ALTSCTR => "alternates",
            Self::RESERVED => "reserved",
            Self::SYSTEM => "system",
            Self::BIOS_BOOT => "bios_boot",
            Self::UNKNOWN => "unknown",
            _ => return write!(f, "tag {:#04x}", self.0),
        };
        f.write_str(name)
    }
}

/// Fixed table pairing type GUIDs with local tags. Lookup in either
/// direction is linear and first match wins, which resolves the
/// duplicated USR / Apple-ZFS GUID in favour of USR on read.
const CONVERSION_TABLE: &[(Guid, PartitionTag)] = &[
    (Guid::ZERO, PartitionTag::UNASSIGNED),
    (EFI_BOOT, PartitionTag::BOOT),
    (EFI_ROOT, PartitionTag::ROOT),
    (EFI_SWAP, PartitionTag::SWAP),
    (EFI_USR, PartitionTag::USR),
    (EFI_BACKUP, PartitionTag::BACKUP),
    (EFI_VAR, PartitionTag::VAR),
    (EFI_HOME, PartitionTag::HOME),
    (EFI_ALTSCTR, PartitionTag::ALTSCTR),
    (EFI_RESERVED, PartitionTag::RESERVED),
    (EFI_SYSTEM, PartitionTag::SYSTEM),
    (EFI_LEGACY_MBR, PartitionTag::LEGACY_MBR),
    (EFI_SYMC_PUB, PartitionTag::SYMC_PUB),
    (EFI_SYMC_CDS, PartitionTag::SYMC_CDS),
    (EFI_MSFT_RESV, PartitionTag::MSFT_RESV),
    (EFI_DELL_BASIC, PartitionTag::DELL_BASIC),
    (EFI_DELL_RAID, PartitionTag::DELL_RAID),
    (EFI_DELL_SWAP, PartitionTag::DELL_SWAP),
    (EFI_DELL_LVM, PartitionTag::DELL_LVM),
    (EFI_DELL_RESV, PartitionTag::DELL_RESV),
    (EFI_AAPL_HFS, PartitionTag::AAPL_HFS),
    (EFI_AAPL_UFS, PartitionTag::AAPL_UFS),
    (EFI_AAPL_ZFS, PartitionTag::AAPL_ZFS),
    (EFI_AAPL_APFS, PartitionTag::AAPL_APFS),
    (EFI_BIOS_BOOT, PartitionTag::BIOS_BOOT),
    (EFI_FREEBSD_BOOT, PartitionTag::FREEBSD_BOOT),
    (EFI_FREEBSD_SWAP, PartitionTag::FREEBSD_SWAP),
    (EFI_FREEBSD_UFS, PartitionTag::FREEBSD_UFS),
    (EFI_FREEBSD_VINUM, PartitionTag::FREEBSD_VINUM),
    (EFI_FREEBSD_ZFS, PartitionTag::FREEBSD_ZFS),
    (EFI_FREEBSD_NANDFS, PartitionTag::FREEBSD_NANDFS),
];
