// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#![allow(dead_code)]

use efi_label_io::efi_label_types::{BlockSize, DiskLabel, Guid, PartitionTag};
use efi_label_io::{
    BlockDevice, DeviceError, Disk, MediaInfo, MemDevice, PartitionInfo,
    UuidSource,
};
use std::collections::HashSet;

/// Sectors of a 1 GiB disk with 512-byte blocks.
pub const GIB_SECTORS: u64 = 2 * 1024 * 1024;

/// Deterministic GUID source: the n-th generated GUID has every byte
/// set to n.
#[derive(Debug, Default)]
pub struct SeqUuid {
    next: u8,
}

impl UuidSource for SeqUuid {
    fn generate(&mut self) -> Guid {
        self.next += 1;
        Guid([self.next; 16])
    }
}

/// A fresh 1 GiB in-memory disk with a deterministic GUID source.
pub fn gib_disk() -> Disk<MemDevice> {
    Disk::new(MemDevice::new(GIB_SECTORS, BlockSize::B512))
        .with_uuid_source(Box::new(SeqUuid::default()))
}

/// Borrow one 512-byte sector of a memory device.
pub fn sector(dev: &MemDevice, lba: u64) -> &[u8] {
    let start = usize::try_from(lba * 512).unwrap();
    &dev.storage()[start..start + 512]
}

/// Set one partition slot in the compact style of the scenarios.
pub fn set_part(
    label: &mut DiskLabel,
    index: usize,
    tag: PartitionTag,
    start: u64,
    size: u64,
    name: &str,
) {
    let part = &mut label.parts[index];
    part.tag = tag;
    part.start_lba = start;
    part.size_lba = size;
    part.set_name(name).unwrap();
}

/// Device wrapper that logs every write and can be told to fail writes
/// at chosen sectors.
#[derive(Debug)]
pub struct Recorder<D> {
    pub inner: D,
    pub write_log: Vec<u64>,
    pub fail_writes_at: HashSet<u64>,
}

impl<D> Recorder<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            write_log: Vec::new(),
            fail_writes_at: HashSet::new(),
        }
    }

    pub fn fail_writes_at(mut self, lbas: &[u64]) -> Self {
        self.fail_writes_at.extend(lbas);
        self
    }
}

impl<D: BlockDevice> BlockDevice for Recorder<D> {
    fn media_info(&mut self) -> Result<MediaInfo, DeviceError> {
        self.inner.media_info()
    }

    fn partition_info(&mut self) -> Result<PartitionInfo, DeviceError> {
        self.inner.partition_info()
    }

    fn read_mbr(&mut self, dst: &mut [u8]) -> Result<(), DeviceError> {
        self.inner.read_mbr(dst)
    }

    fn read_efi(
        &mut self,
        lba: u64,
        dst: &mut [u8],
    ) -> Result<(), DeviceError> {
        self.inner.read_efi(lba, dst)
    }

    fn write_efi(&mut self, lba: u64, src: &[u8]) -> Result<(), DeviceError> {
        if self.fail_writes_at.contains(&lba) {
            return Err(DeviceError::Io);
        }
        self.write_log.push(lba);
        self.inner.write_efi(lba, src)
    }
}

/// Device that reports itself as a paravirtual disk client and rejects
/// single-block label reads at LBA 1, accepting only the combined
/// header+array request.
#[derive(Debug)]
pub struct ParavirtualDevice {
    pub inner: MemDevice,
}

impl BlockDevice for ParavirtualDevice {
    fn media_info(&mut self) -> Result<MediaInfo, DeviceError> {
        self.inner.media_info()
    }

    fn partition_info(&mut self) -> Result<PartitionInfo, DeviceError> {
        Ok(PartitionInfo {
            controller: "vdc".to_owned(),
            drive: "vdc".to_owned(),
            partition_index: 0,
        })
    }

    fn read_mbr(&mut self, dst: &mut [u8]) -> Result<(), DeviceError> {
        self.inner.read_mbr(dst)
    }

    fn read_efi(
        &mut self,
        lba: u64,
        dst: &mut [u8],
    ) -> Result<(), DeviceError> {
        if lba == 1 && dst.len() == 512 {
            return Err(DeviceError::InvalidRequest);
        }
        self.inner.read_efi(lba, dst)
    }

    fn write_efi(&mut self, lba: u64, src: &[u8]) -> Result<(), DeviceError> {
        self.inner.write_efi(lba, src)
    }
}
