// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{BlockDevice, DeviceError, MediaInfo, PartitionInfo};
use efi_label_types::BlockSize;

/// [`BlockDevice`] backed by an in-memory byte vector.
///
/// Useful for building disk images and for tests. Accesses outside the
/// storage fail like a hard device error.
#[derive(Debug)]
pub struct MemDevice {
    storage: Vec<u8>,
    block_size: BlockSize,
    info: PartitionInfo,
}

impl MemDevice {
    /// Create a zero-filled device of `capacity_lba` sectors.
    #[must_use]
    pub fn new(capacity_lba: u64, block_size: BlockSize) -> Self {
        let len = usize::try_from(capacity_lba * block_size.to_u64())
            .expect("device image fits in memory");
        Self::from_vec(vec![0; len], block_size)
    }

    /// Create a device over existing image bytes. A partial block at
    /// the end is not addressable.
    #[must_use]
    pub fn from_vec(storage: Vec<u8>, block_size: BlockSize) -> Self {
        Self {
            storage,
            block_size,
            info: PartitionInfo {
                controller: "mem".to_owned(),
                drive: "mem".to_owned(),
                partition_index: 0,
            },
        }
    }

    /// Override the identity reported by [`BlockDevice::partition_info`].
    #[must_use]
    pub fn with_partition_info(mut self, info: PartitionInfo) -> Self {
        self.info = info;
        self
    }

    /// Resize the device to `capacity_lba` sectors, zero-filling any
    /// new space. Models a virtual disk being grown underneath the
    /// label.
    pub fn set_capacity(&mut self, capacity_lba: u64) {
        let len = usize::try_from(capacity_lba * self.block_size.to_u64())
            .expect("device image fits in memory");
        self.storage.resize(len, 0);
    }

    /// Borrow the image bytes.
    #[must_use]
    pub fn storage(&self) -> &[u8] {
        &self.storage
    }

    /// Mutably borrow the image bytes.
    pub fn storage_mut(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    fn byte_range(
        &self,
        lba: u64,
        len: usize,
    ) -> Result<core::ops::Range<usize>, DeviceError> {
        let start = lba
            .checked_mul(self.block_size.to_u64())
            .and_then(|s| usize::try_from(s).ok())
            .ok_or(DeviceError::Io)?;
        let end = start.checked_add(len).ok_or(DeviceError::Io)?;
        if end > self.storage.len() {
            return Err(DeviceError::Io);
        }
        Ok(start..end)
    }
}

impl BlockDevice for MemDevice {
    fn media_info(&mut self) -> Result<MediaInfo, DeviceError> {
        Ok(MediaInfo {
            capacity_lba: u64::try_from(self.storage.len())
                .map_err(|_| DeviceError::Io)?
                / self.block_size.to_u64(),
            lba_size: self.block_size.to_u32(),
        })
    }

    fn partition_info(&mut self) -> Result<PartitionInfo, DeviceError> {
        Ok(self.info.clone())
    }

    fn read_mbr(&mut self, dst: &mut [u8]) -> Result<(), DeviceError> {
        self.read_efi(0, dst)
    }

    fn read_efi(
        &mut self,
        lba: u64,
        dst: &mut [u8],
    ) -> Result<(), DeviceError> {
        let range = self.byte_range(lba, dst.len())?;
        dst.copy_from_slice(&self.storage[range]);
        Ok(())
    }

    fn write_efi(&mut self, lba: u64, src: &[u8]) -> Result<(), DeviceError> {
        self.block_size.assert_valid_block_buffer(src);
        let range = self.byte_range(lba, src.len())?;
        self.storage[range].copy_from_slice(src);
        Ok(())
    }
}
