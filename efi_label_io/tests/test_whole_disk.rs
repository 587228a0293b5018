// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod common;

use common::{gib_disk, set_part, Recorder, SeqUuid, GIB_SECTORS};
use efi_label_io::efi_label_types::{BlockSize, PartitionTag};
use efi_label_io::{Disk, InvalidLabel, LabelError, MemDevice};

/// A 1 GiB disk labelled with one root partition and the conventional
/// trailing reserved partition, as the growth scenario starts from.
fn grown_candidate() -> Disk<MemDevice> {
    let mut disk = gib_disk();
    let mut label = disk.init_label(8).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    set_part(&mut label, 7, PartitionTag::RESERVED, 262_178, 16_384, "");
    disk.write_label(&mut label).unwrap();
    disk
}

/// Scenario: the device grows from 1 GiB to 2 GiB and the label
/// absorbs the new space.
#[test]
fn test_whole_disk_growth() {
    let mut disk = grown_candidate();
    disk.device_mut().set_capacity(2 * GIB_SECTORS);

    disk.use_whole_disk().unwrap();

    let label = disk.read_label().unwrap().label;
    assert_eq!(label.last_lba, 4_194_303);
    assert_eq!(label.alternate_lba, 4_194_303);
    assert_eq!(label.last_usable_lba, 4_194_270);

    let resv = &label.parts[7];
    assert_eq!(resv.tag, PartitionTag::RESERVED);
    assert_eq!(resv.start_lba, 4_177_887);
    // The reserved partition kept its size and now ends exactly at the
    // last usable sector.
    assert_eq!(resv.size_lba, 16_384);
    assert_eq!(resv.end_lba(), label.last_usable_lba);

    // The root partition was not moved and grew right up to the
    // reserved partition.
    let root = &label.parts[0];
    assert_eq!(root.start_lba, 34);
    assert_eq!(root.size_lba, 4_177_853);
    assert_eq!(root.end_lba(), resv.start_lba - 1);
}

/// A 64 MiB variant of the same layout, for the tests whose sector
/// numbers the growth scenario does not pin.
fn small_candidate() -> Disk<MemDevice> {
    let mut disk = Disk::new(MemDevice::new(131_072, BlockSize::B512))
        .with_uuid_source(Box::new(SeqUuid::default()));
    let mut label = disk.init_label(8).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 16_384, "root");
    set_part(&mut label, 7, PartitionTag::RESERVED, 16_418, 16_384, "");
    disk.write_label(&mut label).unwrap();
    disk
}

/// Running the reshape twice performs no writes the second time.
#[test]
fn test_whole_disk_is_idempotent() {
    let mut disk = small_candidate();
    disk.device_mut().set_capacity(262_144);
    disk.use_whole_disk().unwrap();

    // Re-wrap the device so every subsequent write is recorded.
    let mut recorded = Disk::new(Recorder::new(disk.into_device()))
        .with_uuid_source(Box::new(SeqUuid::default()));
    recorded.use_whole_disk().unwrap();
    assert!(recorded.device().write_log.is_empty());
}

/// An ungrown device round-trips through the reshape without I/O too.
#[test]
fn test_whole_disk_noop_without_growth() {
    let disk = small_candidate();
    let mut recorded = Disk::new(Recorder::new(disk.into_device()))
        .with_uuid_source(Box::new(SeqUuid::default()));
    recorded.use_whole_disk().unwrap();
    assert!(recorded.device().write_log.is_empty());
}

#[test]
fn test_whole_disk_needs_two_partitions() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(1).unwrap();
    disk.write_label(&mut label).unwrap();
    assert!(matches!(
        disk.use_whole_disk(),
        Err(LabelError::Invalid(InvalidLabel::TooFewPartitions(1)))
    ));
}

#[test]
fn test_whole_disk_needs_reserved_last() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(8).unwrap();
    // Reserved in the middle instead of the last slot.
    set_part(&mut label, 3, PartitionTag::RESERVED, 262_178, 16_384, "");
    disk.write_label(&mut label).unwrap();
    assert!(matches!(
        disk.use_whole_disk(),
        Err(LabelError::Invalid(InvalidLabel::ReservedNotLast(3)))
    ));
}

#[test]
fn test_whole_disk_needs_any_reserved() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(8).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    disk.write_label(&mut label).unwrap();
    assert!(matches!(
        disk.use_whole_disk(),
        Err(LabelError::Invalid(InvalidLabel::NoReservedPartition))
    ));
}

#[test]
fn test_whole_disk_needs_reserved_after_data() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(8).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    set_part(&mut label, 7, PartitionTag::RESERVED, 262_178, 16_384, "");
    // A data partition past the reserved one.
    set_part(&mut label, 1, PartitionTag::HOME, 278_562, 1000, "late");
    disk.write_label(&mut label).unwrap();
    assert!(matches!(
        disk.use_whole_disk(),
        Err(LabelError::Invalid(InvalidLabel::ReservedNotAfterData))
    ));
}

/// Growth with every data slot empty still relocates the reserved
/// partition; there is just nothing to grow.
#[test]
fn test_whole_disk_with_only_reserved() {
    let mut disk = Disk::new(MemDevice::new(131_072, BlockSize::B512))
        .with_uuid_source(Box::new(SeqUuid::default()));
    let mut label = disk.init_label(8).unwrap();
    set_part(&mut label, 7, PartitionTag::RESERVED, 16_418, 16_384, "");
    disk.write_label(&mut label).unwrap();

    disk.device_mut().set_capacity(262_144);
    disk.use_whole_disk().unwrap();

    let label = disk.read_label().unwrap().label;
    assert_eq!(label.parts[7].end_lba(), label.last_usable_lba);
    assert!(label.parts[..7].iter().all(|p| p.size_lba == 0));
}

/// 4096-byte sectors use the same arithmetic with a five-block label.
#[test]
fn test_whole_disk_growth_4096() {
    let mut disk = Disk::new(MemDevice::new(32_768, BlockSize::B4096))
        .with_uuid_source(Box::new(SeqUuid::default()));
    let mut label = disk.init_label(8).unwrap();
    let resv_size = label.reserved_sectors();
    assert_eq!(resv_size, 2048);
    set_part(&mut label, 0, PartitionTag::ROOT, 6, 8192, "root");
    set_part(&mut label, 7, PartitionTag::RESERVED, 8198, resv_size, "");
    disk.write_label(&mut label).unwrap();

    disk.device_mut().set_capacity(65_536);
    disk.use_whole_disk().unwrap();

    let label = disk.read_label().unwrap().label;
    assert_eq!(label.last_lba, 65_535);
    assert_eq!(label.last_usable_lba, 65_535 - 5);
    assert_eq!(label.parts[7].end_lba(), label.last_usable_lba);
    assert_eq!(label.parts[0].end_lba(), label.parts[7].start_lba - 1);
}
