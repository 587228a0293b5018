// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use efi_label_io::efi_label_types::{tag, Guid, GuidLe};

#[test]
fn test_guid_display_and_parse() {
    let guid = Guid::from_fields(
        0x0123_4567,
        0x89ab,
        0xcdef,
        0x01,
        0x23,
        [0x45, 0x67, 0x89, 0xab, 0xcd, 0xef],
    );
    let text = "01234567-89ab-cdef-0123-456789abcdef";
    assert_eq!(guid.to_string(), text);
    assert_eq!(text.parse::<Guid>().unwrap(), guid);

    assert!("01234567-89ab-cdef-0123-456789abcde".parse::<Guid>().is_err());
    assert!("01234567089ab-cdef-0123-456789abcdef".parse::<Guid>().is_err());
    assert!("0123456x-89ab-cdef-0123-456789abcdef".parse::<Guid>().is_err());
}

#[test]
fn test_guid_mixed_endian_conversion() {
    let guid: Guid = "01234567-89ab-cdef-0123-456789abcdef".parse().unwrap();

    // The first three groups are byte swapped on disk, the final eight
    // bytes are stored as-is.
    let le = guid.to_le();
    assert_eq!(
        le,
        GuidLe([
            0x67, 0x45, 0x23, 0x01, 0xab, 0x89, 0xef, 0xcd, 0x01, 0x23,
            0x45, 0x67, 0x89, 0xab, 0xcd, 0xef,
        ])
    );

    // The conversion is self-inverse.
    assert_eq!(le.to_guid(), guid);
    assert_eq!(Guid::ZERO.to_le().to_guid(), Guid::ZERO);
}

#[test]
fn test_guid_zero() {
    assert!(Guid::ZERO.is_zero());
    assert!(!tag::EFI_ROOT.is_zero());
    assert_eq!(Guid::default(), Guid::ZERO);
    assert_eq!(
        Guid::ZERO.to_string(),
        "00000000-0000-0000-0000-000000000000"
    );
}

#[test]
fn test_well_known_type_guids() {
    assert_eq!(
        tag::EFI_ROOT.to_string(),
        "6a85cf4d-1dd2-11b2-99a6-080020736631"
    );
    assert_eq!(
        tag::EFI_RESERVED.to_string(),
        "6a945a3b-1dd2-11b2-99a6-080020736631"
    );
    assert_eq!(
        tag::EFI_SYSTEM.to_string(),
        "c12a7328-f81f-11d2-ba4b-00a0c93ec93b"
    );
    assert_eq!(
        tag::EFI_DELL_BASIC.to_string(),
        "ebd0a0a2-b9e5-4433-87c0-68b6b72699c7"
    );
}
