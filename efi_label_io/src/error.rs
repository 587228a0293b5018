// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::DeviceError;
use efi_label_types::codec::{DecodeError, EncodeError};
use efi_label_types::CheckError;

/// Reason a label (on disk or caller-supplied) failed the format
/// checks.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum InvalidLabel {
    /// Sector 0 does not carry the 0xAA55 MBR signature.
    #[error("bad MBR signature")]
    MbrSignature,

    /// The MBR has no EFI protective partition record; the disk likely
    /// carries an unrelated MBR scheme.
    #[error("no EFI protective partition record in the MBR")]
    NoProtectiveRecord,

    /// The label bytes failed decoding.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The label failed the pre-write invariant checks.
    #[error(transparent)]
    Check(#[from] CheckError),

    /// The label could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The device rejected a request as malformed.
    #[error("invalid request rejected by the device")]
    DeviceRequest,

    /// A backup header places its entry array after itself or out of
    /// addressable range.
    #[error("backup label's entry array is misplaced")]
    BackupArrayPlacement,

    /// The whole-disk reshape needs at least two partitions.
    #[error("too few ({0}) partitions")]
    TooFewPartitions(u32),

    /// A reserved partition occupies a slot other than the last.
    #[error("reserved partition found at unexpected position ({0})")]
    ReservedNotLast(usize),

    /// The last slot is not a reserved partition.
    #[error("no reserved partition")]
    NoReservedPartition,

    /// The reserved partition does not sit after every other partition.
    #[error("reserved partition not after other partitions")]
    ReservedNotAfterData,

    /// Relocating the reserved partition would move it toward the start
    /// of the disk, over space that may hold data.
    #[error("reserved partition size mismatch")]
    ReservedSizeMismatch,
}

/// Error surface of the label operations.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    /// The device layer reported a hard I/O failure.
    #[error("device I/O error")]
    Io(#[source] DeviceError),

    /// The on-disk bytes or the caller-supplied label do not satisfy
    /// the format.
    #[error("invalid label: {0}")]
    Invalid(#[from] InvalidLabel),

    /// Unexpected error from the device capability.
    #[error("device error")]
    Other(#[source] DeviceError),
}

impl LabelError {
    /// Classify a device error: hard I/O failures keep their identity,
    /// rejected requests surface as `Invalid`, anything else is
    /// `Other`.
    pub(crate) fn from_device(err: DeviceError) -> Self {
        match err {
            DeviceError::Io => Self::Io(err),
            DeviceError::InvalidRequest => {
                Self::Invalid(InvalidLabel::DeviceRequest)
            }
            DeviceError::NotSupported | DeviceError::Other(_) => {
                Self::Other(err)
            }
        }
    }
}

impl From<DecodeError> for LabelError {
    fn from(err: DecodeError) -> Self {
        Self::Invalid(InvalidLabel::Decode(err))
    }
}

impl From<CheckError> for LabelError {
    fn from(err: CheckError) -> Self {
        Self::Invalid(InvalidLabel::Check(err))
    }
}

impl From<EncodeError> for LabelError {
    fn from(err: EncodeError) -> Self {
        Self::Invalid(InvalidLabel::Encode(err))
    }
}
