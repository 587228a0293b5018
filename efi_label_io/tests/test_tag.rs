// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use efi_label_io::efi_label_types::{tag, Guid, PartitionTag};

#[test]
fn test_tag_lookup_both_directions() {
    assert_eq!(
        PartitionTag::for_type_guid(&tag::EFI_ROOT),
        Some(PartitionTag::ROOT)
    );
    assert_eq!(
        PartitionTag::for_type_guid(&tag::EFI_RESERVED),
        Some(PartitionTag::RESERVED)
    );
    assert_eq!(PartitionTag::ROOT.to_type_guid(), Some(tag::EFI_ROOT));
    assert_eq!(PartitionTag::SWAP.to_type_guid(), Some(tag::EFI_SWAP));
    assert_eq!(
        PartitionTag::MSFT_RESV.to_type_guid(),
        Some(tag::EFI_MSFT_RESV)
    );
}

#[test]
fn test_null_guid_is_unassigned() {
    assert_eq!(
        PartitionTag::for_type_guid(&Guid::ZERO),
        Some(PartitionTag::UNASSIGNED)
    );
    assert_eq!(PartitionTag::UNASSIGNED.to_type_guid(), Some(Guid::ZERO));
}

#[test]
fn test_unmatched_lookups() {
    // A GUID this library has never heard of.
    let foreign: Guid =
        "deadbeef-0000-4000-8000-000000000001".parse().unwrap();
    assert_eq!(PartitionTag::for_type_guid(&foreign), None);

    // The unknown tag deliberately has no reverse mapping.
    assert_eq!(PartitionTag::UNKNOWN.to_type_guid(), None);
    assert_eq!(PartitionTag(0x77).to_type_guid(), None);
}

#[test]
fn test_duplicate_usr_apple_zfs_guid() {
    // The USR and Apple-ZFS table entries share one GUID; the forward
    // lookup resolves to USR because it comes first.
    assert_eq!(tag::EFI_USR, tag::EFI_AAPL_ZFS);
    assert_eq!(
        PartitionTag::for_type_guid(&tag::EFI_AAPL_ZFS),
        Some(PartitionTag::USR)
    );
    // Both tags still map back to the shared GUID.
    assert_eq!(PartitionTag::AAPL_ZFS.to_type_guid(), Some(tag::EFI_USR));
}

#[test]
fn test_fabricated_tags_stay_clear_of_native_values() {
    // Native tags sit at 0x00..=0x0f and 0x18, 0x1e..=0x20; the
    // fabricated range must collide with none of them and every tag
    // must round-trip unambiguously through its GUID.
    for fabricated in [
        PartitionTag::LEGACY_MBR,
        PartitionTag::SYMC_PUB,
        PartitionTag::SYMC_CDS,
        PartitionTag::MSFT_RESV,
        PartitionTag::DELL_BASIC,
        PartitionTag::DELL_RAID,
        PartitionTag::DELL_SWAP,
        PartitionTag::DELL_LVM,
        PartitionTag::DELL_RESV,
        PartitionTag::AAPL_HFS,
        PartitionTag::AAPL_UFS,
        PartitionTag::AAPL_APFS,
    ] {
        assert!((0x10..=0x1d).contains(&fabricated.0), "{fabricated}");
        let guid = fabricated.to_type_guid().unwrap();
        assert_eq!(PartitionTag::for_type_guid(&guid), Some(fabricated));
    }
}
