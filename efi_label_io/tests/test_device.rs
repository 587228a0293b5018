// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod common;

use anyhow::Result;
use common::{set_part, SeqUuid};
use efi_label_io::efi_label_types::{BlockSize, PartitionTag};
use efi_label_io::{
    BlockDevice, DeviceError, Disk, FileDevice, MemDevice,
};

#[test]
fn test_mem_device_geometry_and_bounds() {
    let mut dev = MemDevice::new(64, BlockSize::B512);
    let info = dev.media_info().unwrap();
    assert_eq!(info.capacity_lba, 64);
    assert_eq!(info.lba_size, 512);

    let mut block = [0u8; 512];
    dev.read_efi(63, &mut block).unwrap();
    assert!(matches!(
        dev.read_efi(64, &mut block),
        Err(DeviceError::Io)
    ));
    assert!(matches!(
        dev.write_efi(64, &block),
        Err(DeviceError::Io)
    ));
}

#[test]
fn test_mem_device_rw() {
    let mut dev = MemDevice::new(64, BlockSize::B512);
    let src = [0x5au8; 1024];
    dev.write_efi(3, &src).unwrap();

    // Arbitrary-length read, not a block multiple.
    let mut dst = [0u8; 100];
    dev.read_efi(4, &mut dst).unwrap();
    assert_eq!(dst, [0x5au8; 100]);
}

#[test]
fn test_file_device_round_trip() -> Result<()> {
    let file = tempfile::tempfile()?;
    file.set_len(4 * 1024 * 1024)?;

    let mut disk = Disk::new(FileDevice::new(file, BlockSize::B512))
        .with_uuid_source(Box::new(SeqUuid::default()));
    let mut label = disk.init_label(128).unwrap();
    assert_eq!(label.last_lba, 8191);
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 4096, "root");
    disk.write_label(&mut label).unwrap();

    let reread = disk.read_label().unwrap().label;
    assert_eq!(reread, label);
    Ok(())
}

#[test]
fn test_file_device_reports_length_in_blocks() -> Result<()> {
    let file = tempfile::tempfile()?;
    // A trailing partial block is not addressable.
    file.set_len(4096 + 100)?;
    let mut dev = FileDevice::new(file, BlockSize::B512);
    assert_eq!(dev.media_info().unwrap().capacity_lba, 8);
    Ok(())
}
