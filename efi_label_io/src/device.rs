// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod file;
mod mem;

pub use file::FileDevice;
pub use mem::MemDevice;

use std::io;

// errno values shared by every unix target this library drives.
const EIO: i32 = 5;
const EINVAL: i32 = 22;

/// Geometry reported by a block device.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct MediaInfo {
    /// Number of addressable sectors.
    pub capacity_lba: u64,

    /// Logical block size in bytes. Zero means the device does not
    /// know; readers fall back to 512.
    pub lba_size: u32,
}

/// Identity of the opened device node.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct PartitionInfo {
    /// Controller name, e.g. `"sd"`.
    pub controller: String,

    /// Drive name.
    pub drive: String,

    /// Index of the partition node the caller opened.
    pub partition_index: u32,
}

/// Error reported by a [`BlockDevice`].
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// Hard I/O failure; retrying at this layer will not help.
    #[error("hard device I/O failure")]
    Io,

    /// The device does not implement the operation.
    #[error("operation not supported by the device")]
    NotSupported,

    /// The device rejected the request as malformed.
    #[error("invalid request rejected by the device")]
    InvalidRequest,

    /// Any other device failure.
    #[error("device failure: {0}")]
    Other(#[source] io::Error),
}

impl From<io::Error> for DeviceError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::Unsupported {
            return Self::NotSupported;
        }
        match err.raw_os_error() {
            Some(EIO) => Self::Io,
            Some(EINVAL) => Self::InvalidRequest,
            _ => Self::Other(err),
        }
    }
}

/// Capability for reading and writing a partitioned block device.
///
/// The label reader and writer drive a device exclusively through this
/// trait. Reads need not be block-multiples; writes always are. Calls
/// may block at the implementation's discretion; no timeout is imposed.
pub trait BlockDevice {
    /// Get the device geometry.
    fn media_info(&mut self) -> Result<MediaInfo, DeviceError>;

    /// Get the identity of the opened device node.
    fn partition_info(&mut self) -> Result<PartitionInfo, DeviceError>;

    /// Read sector 0 into `dst`, whose length is one block.
    fn read_mbr(&mut self, dst: &mut [u8]) -> Result<(), DeviceError>;

    /// Read `dst.len()` bytes starting at sector `lba`.
    fn read_efi(&mut self, lba: u64, dst: &mut [u8])
        -> Result<(), DeviceError>;

    /// Write `src` starting at sector `lba`.
    fn write_efi(&mut self, lba: u64, src: &[u8]) -> Result<(), DeviceError>;
}
