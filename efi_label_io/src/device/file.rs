// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{BlockDevice, DeviceError, MediaInfo, PartitionInfo};
use efi_label_types::BlockSize;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

/// [`BlockDevice`] backed by a [`File`], such as a raw device node or a
/// disk image.
///
/// Capacity is derived from the file length; a partial block at the end
/// is not addressable.
#[derive(Debug)]
pub struct FileDevice {
    file: File,
    block_size: BlockSize,
    info: PartitionInfo,
}

impl FileDevice {
    /// Create a `FileDevice`. The file must be open for both reading
    /// and writing if labels are to be written.
    #[must_use]
    pub fn new(file: File, block_size: BlockSize) -> Self {
        Self {
            file,
            block_size,
            info: PartitionInfo {
                controller: "file".to_owned(),
                drive: "file".to_owned(),
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

    fn seek_to(&mut self, lba: u64) -> Result<(), DeviceError> {
        // The end of the range is validated by read_exact/write_all;
        // only the start offset matters here.
        let offset = lba
            .checked_mul(self.block_size.to_u64())
            .ok_or(DeviceError::InvalidRequest)?;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}

impl BlockDevice for FileDevice {
    fn media_info(&mut self) -> Result<MediaInfo, DeviceError> {
        let num_bytes = self.file.seek(SeekFrom::End(0))?;
        Ok(MediaInfo {
            capacity_lba: num_bytes / self.block_size.to_u64(),
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
        self.seek_to(lba)?;
        self.file.read_exact(dst)?;
        Ok(())
    }

    fn write_efi(&mut self, lba: u64, src: &[u8]) -> Result<(), DeviceError> {
        self.block_size.assert_valid_block_buffer(src);
        self.seek_to(lba)?;
        self.file.write_all(src)?;
        self.file.flush()?;
        Ok(())
    }
}
