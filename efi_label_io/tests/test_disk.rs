// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod common;

use common::{
    gib_disk, sector, set_part, ParavirtualDevice, Recorder, SeqUuid,
    GIB_SECTORS,
};
use efi_label_io::efi_label_types::codec::DecodeError;
use efi_label_io::efi_label_types::{
    bytemuck::from_bytes, BlockSize, CheckError, GptHeader, LabelFlags,
    PartitionTag,
};
use efi_label_io::{
    Disk, InvalidLabel, LabelError, MemDevice, ReadLabel,
};

/// Scenario: initialise and write a blank 1 GiB disk.
#[test]
fn test_blank_label_on_disk_layout() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    assert_eq!(label.first_usable_lba, 34);
    assert_eq!(label.last_usable_lba, 2_097_118);
    assert_eq!(label.alternate_lba, 2_097_151);

    disk.write_label(&mut label).unwrap();
    let dev = disk.into_device();

    let header: &GptHeader =
        from_bytes(&sector(&dev, 1)[..GptHeader::SIZE]);
    assert!(header.is_signature_valid());
    assert_eq!(header.revision.0.to_u32(), 0x0001_0000);
    assert_eq!(header.my_lba.to_u64(), 1);
    assert_eq!(header.alternate_lba.to_u64(), 2_097_151);
    assert_eq!(header.first_usable_lba.to_u64(), 34);
    assert_eq!(header.last_usable_lba.to_u64(), 2_097_118);
    assert_eq!(header.partition_entry_lba.to_u64(), 2);
    assert_eq!(header.number_of_partition_entries.to_u32(), 128);
    assert_eq!(header.size_of_partition_entry.to_u32(), 128);

    // Protective MBR: inactive type-0xEE record in slot 0 spanning the
    // disk.
    let mbr = sector(&dev, 0);
    assert_eq!(mbr[446], 0x00);
    assert_eq!(mbr[450], 0xee);
    assert_eq!(&mbr[454..458], &[0x01, 0x00, 0x00, 0x00]);
    assert_eq!(&mbr[458..462], &[0xff, 0xff, 0x1f, 0x00]);
    assert_eq!(&mbr[510..512], &[0x55, 0xaa]);
}

/// Scenario: add root and swap, write, read back unchanged.
#[test]
fn test_write_read_round_trip() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    set_part(&mut label, 1, PartitionTag::SWAP, 262_178, 262_144, "swap");
    disk.write_label(&mut label).unwrap();

    let ReadLabel {
        label: reread,
        partition_index,
    } = disk.read_label().unwrap();
    assert_eq!(partition_index, 0);
    assert_eq!(reread.flags, LabelFlags::empty());
    assert_eq!(reread, label);
    assert!(!reread.parts[0].unique_guid.is_zero());
    assert_ne!(reread.parts[0].unique_guid, reread.parts[1].unique_guid);
    assert_eq!(reread.parts[0].name_str(), "root");
}

/// Writing the same label twice produces byte-identical label sectors;
/// the first write pinned the unique GUIDs.
#[test]
fn test_rewrite_is_deterministic() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    disk.write_label(&mut label).unwrap();

    // Sector 0, the primary label, and the backup label.
    let head = disk.device().storage()[..34 * 512].to_vec();
    let tail_at = disk.device().storage().len() - 33 * 512;
    let tail = disk.device().storage()[tail_at..].to_vec();

    disk.write_label(&mut label).unwrap();
    assert_eq!(&disk.device().storage()[..34 * 512], &head[..]);
    assert_eq!(&disk.device().storage()[tail_at..], &tail[..]);
}

/// Scenario: corrupt the primary, recover from the backup.
#[test]
fn test_backup_recovery() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    set_part(&mut label, 1, PartitionTag::SWAP, 262_178, 262_144, "swap");
    disk.write_label(&mut label).unwrap();

    // Zero the primary header block.
    disk.device_mut().storage_mut()[512..1024].fill(0);

    let recovered = disk.read_label().unwrap().label;
    assert!(recovered.flags.contains(LabelFlags::PRIMARY_CORRUPT));
    // The backup header's alternate points back at the primary.
    assert_eq!(recovered.alternate_lba, 1);
    assert_eq!(recovered.parts, label.parts);
    assert_eq!(recovered.first_usable_lba, label.first_usable_lba);
    assert_eq!(recovered.last_usable_lba, label.last_usable_lba);
    assert_eq!(recovered.disk_guid, label.disk_guid);
}

/// Scenario: the backup header sits one block before the end, as
/// historical systems placed it.
#[test]
fn test_legacy_backup_recovery() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    disk.write_label(&mut label).unwrap();

    let last = GIB_SECTORS - 1;
    let storage = disk.device_mut().storage_mut();
    // Move the backup header one block down, zero the primary header
    // and the last block.
    let backup =
        storage[usize::try_from(last * 512).unwrap()..].to_vec();
    let legacy_at = usize::try_from((last - 1) * 512).unwrap();
    storage[legacy_at..legacy_at + 512].copy_from_slice(&backup);
    storage[512..1024].fill(0);
    let last_at = usize::try_from(last * 512).unwrap();
    storage[last_at..last_at + 512].fill(0);

    let recovered = disk.read_label().unwrap().label;
    assert!(recovered.flags.contains(LabelFlags::PRIMARY_CORRUPT));
    assert_eq!(recovered.parts, label.parts);
}

/// Scenario: overlapping partitions are refused.
#[test]
fn test_write_rejects_overlap() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    // One sector early: overlaps the root partition's last sector.
    set_part(&mut label, 1, PartitionTag::SWAP, 262_177, 262_144, "swap");
    assert!(matches!(
        disk.write_label(&mut label),
        Err(LabelError::Invalid(InvalidLabel::Check(
            CheckError::Overlap { .. }
        )))
    ));
    // Nothing reached the device.
    assert!(disk.device().storage()[..64 * 512].iter().all(|&b| b == 0));
}

#[test]
fn test_write_rejects_out_of_bounds() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 33, 100, "early");
    assert!(matches!(
        disk.write_label(&mut label),
        Err(LabelError::Invalid(InvalidLabel::Check(
            CheckError::StartOutOfRange { .. }
        )))
    ));
}

#[test]
fn test_write_rejects_unknown_tag() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::UNKNOWN, 34, 100, "mystery");
    assert!(matches!(
        disk.write_label(&mut label),
        Err(LabelError::Invalid(InvalidLabel::Encode(_)))
    ));
    assert!(disk.device().storage()[..64 * 512].iter().all(|&b| b == 0));
}

/// A 256-entry label does not fit the provisional allocation; the
/// reader re-reads with a larger one.
#[test]
fn test_large_entry_count_round_trip() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(256).unwrap();
    assert_eq!(label.first_usable_lba, 66);
    set_part(&mut label, 200, PartitionTag::HOME, 66, 4096, "home");
    disk.write_label(&mut label).unwrap();

    let reread = disk.read_label().unwrap().label;
    assert_eq!(reread.n_parts(), 256);
    assert_eq!(reread, label);
}

/// 4096-byte sectors round-trip with the same code paths.
#[test]
fn test_round_trip_4096() {
    let dev = MemDevice::new(262_144, BlockSize::B4096);
    let mut disk =
        Disk::new(dev).with_uuid_source(Box::new(SeqUuid::default()));
    let mut label = disk.init_label(128).unwrap();
    assert_eq!(label.first_usable_lba, 6);
    set_part(&mut label, 0, PartitionTag::ROOT, 6, 100_000, "root");
    disk.write_label(&mut label).unwrap();

    let reread = disk.read_label().unwrap().label;
    assert_eq!(reread, label);
}

/// A failed backup write must not fail the operation: the primary is
/// already on disk and forms a readable label on its own.
#[test]
fn test_backup_write_failure_is_absorbed() {
    let mut label_disk = Disk::new(Recorder::new(MemDevice::new(
        GIB_SECTORS,
        BlockSize::B512,
    )))
    .with_uuid_source(Box::new(SeqUuid::default()));
    let mut label = label_disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");

    // Fail both the backup array and the backup header writes.
    label_disk.device_mut().fail_writes_at.extend([
        label.last_usable_lba + 1,
        GIB_SECTORS - 1,
    ]);
    label_disk.write_label(&mut label).unwrap();

    // The primary alone is readable.
    let reread = label_disk.read_label().unwrap().label;
    assert_eq!(reread.parts, label.parts);
    assert_eq!(reread.flags, LabelFlags::empty());
}

#[test]
fn test_primary_write_failure_propagates() {
    let mut label_disk = Disk::new(
        Recorder::new(MemDevice::new(GIB_SECTORS, BlockSize::B512))
            .fail_writes_at(&[1]),
    )
    .with_uuid_source(Box::new(SeqUuid::default()));
    let mut label = label_disk.init_label(128).unwrap();
    assert!(matches!(
        label_disk.write_label(&mut label),
        Err(LabelError::Io(_))
    ));
}

/// A disk with no MBR, or with an unrelated MBR, is refused before any
/// GPT bytes are interpreted.
#[test]
fn test_read_refuses_foreign_disks() {
    let mut disk = gib_disk();
    assert!(matches!(
        disk.read_label(),
        Err(LabelError::Invalid(InvalidLabel::MbrSignature))
    ));

    // Valid signature but no protective record.
    disk.device_mut().storage_mut()[510] = 0x55;
    disk.device_mut().storage_mut()[511] = 0xaa;
    assert!(matches!(
        disk.read_label(),
        Err(LabelError::Invalid(InvalidLabel::NoProtectiveRecord))
    ));
}

/// Corrupting both the primary and every backup is unrecoverable.
#[test]
fn test_read_fails_when_all_copies_corrupt() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    disk.write_label(&mut label).unwrap();

    let storage = disk.device_mut().storage_mut();
    storage[512..1024].fill(0);
    let tail = storage.len() - 2 * 512;
    storage[tail..].fill(0);

    assert!(matches!(
        disk.read_label(),
        Err(LabelError::Invalid(InvalidLabel::Decode(
            DecodeError::Signature(0)
        )))
    ));
}

/// Historical paravirtual backends only honour a combined header+array
/// read; the reader retries that shape when the device names itself
/// "vdc".
#[test]
fn test_paravirtual_combined_read() {
    let mut disk = gib_disk();
    let mut label = disk.init_label(128).unwrap();
    set_part(&mut label, 0, PartitionTag::ROOT, 34, 262_144, "root");
    disk.write_label(&mut label).unwrap();

    let mut vdc_disk = Disk::new(ParavirtualDevice {
        inner: disk.into_device(),
    });
    let reread = vdc_disk.read_label().unwrap().label;
    assert_eq!(reread, label);
}
