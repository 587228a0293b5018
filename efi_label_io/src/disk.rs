// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{
    BlockDevice, DeviceError, HwFixupSource, InvalidLabel, LabelError,
    OsUuid, UuidSource,
};
use bytemuck::from_bytes;
use efi_label_types::codec::{self, DecodeError};
use efi_label_types::{
    DiskLabel, GptHeader, GptPartitionEntry, Guid, LabelFlags, Mbr,
    Partition, MIN_ARRAY_SIZE,
};
use log::debug;

/// Label operations on one opened block device.
///
/// A `Disk` owns the device capability plus the two auxiliary
/// capabilities the writer consults: a [`UuidSource`] (defaulting to
/// the operating system's randomness) and an optional
/// [`HwFixupSource`] for protective-MBR placement overrides.
///
/// All operations are synchronous; a label obtained here is owned by
/// the caller and never shared.
pub struct Disk<D: BlockDevice> {
    pub(crate) dev: D,
    pub(crate) uuid: Box<dyn UuidSource>,
    pub(crate) fixups: Option<Box<dyn HwFixupSource>>,
}

/// Successful result of [`Disk::read_label`].
#[derive(Clone, Debug)]
pub struct ReadLabel {
    /// The decoded label.
    pub label: DiskLabel,

    /// Index of the partition node the caller opened, as reported by
    /// the device.
    pub partition_index: u32,
}

/// Outcome of probing one label copy.
enum ProbeFailure {
    /// The device could not produce the bytes.
    Device(DeviceError),

    /// The bytes are not a valid header.
    Invalid(DecodeError),
}

impl<D: BlockDevice> Disk<D> {
    /// Wrap an opened device.
    pub fn new(dev: D) -> Self {
        Self {
            dev,
            uuid: Box::new(OsUuid),
            fixups: None,
        }
    }

    /// Replace the GUID generator, e.g. with a deterministic source.
    #[must_use]
    pub fn with_uuid_source(mut self, source: Box<dyn UuidSource>) -> Self {
        self.uuid = source;
        self
    }

    /// Attach a hardware-fixup source consulted when the protective
    /// MBR is written.
    #[must_use]
    pub fn with_fixup_source(
        mut self,
        source: Box<dyn HwFixupSource>,
    ) -> Self {
        self.fixups = Some(source);
        self
    }

    /// Borrow the underlying device.
    pub fn device(&self) -> &D {
        &self.dev
    }

    /// Mutably borrow the underlying device.
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.dev
    }

    /// Recover the underlying device.
    pub fn into_device(self) -> D {
        self.dev
    }

    /// Build a blank label sized to the device: `n_parts` unassigned
    /// slots, a freshly generated disk GUID, and the usable region
    /// derived from the device capacity.
    pub fn init_label(&mut self, n_parts: u32) -> Result<DiskLabel, LabelError> {
        let info = self.dev.media_info().map_err(|err| {
            debug!("couldn't read disk information");
            LabelError::from_device(err)
        })?;
        let lba_size = if info.lba_size == 0 {
            debug!("assuming 512-byte sectors");
            512
        } else {
            info.lba_size
        };
        let disk_guid = self.uuid.generate();
        Ok(DiskLabel::init(
            n_parts,
            info.capacity_lba,
            lba_size,
            disk_guid,
        ))
    }

    /// Locate and decode a valid label.
    ///
    /// The primary copy at LBA 1 is tried first. If its header is
    /// invalid, the reader falls back to the backup header at
    /// `capacity - 2` (a placement some historical systems produced)
    /// and then at `capacity - 1`, setting
    /// [`LabelFlags::PRIMARY_CORRUPT`] on the returned label when
    /// either backup is used. A label carrying more entries than the
    /// provisional 128-slot allocation is re-read once with a larger
    /// one.
    pub fn read_label(&mut self) -> Result<ReadLabel, LabelError> {
        let (capacity, lba_size) = self.media_geometry()?;

        // Gate on the protective MBR so a disk carrying an unrelated
        // scheme is never misread as GPT.
        let mut mbr_block = vec![0u8; usize_from(lba_size)];
        self.dev
            .read_mbr(&mut mbr_block)
            .map_err(LabelError::from_device)?;
        let mbr: &Mbr = from_bytes(&mbr_block[..Mbr::SIZE]);
        if !mbr.is_signature_valid() {
            return Err(InvalidLabel::MbrSignature.into());
        }
        if !mbr.has_protective_record() {
            return Err(InvalidLabel::NoProtectiveRecord.into());
        }

        let info = self
            .dev
            .partition_info()
            .map_err(LabelError::from_device)?;
        // The "vdc" controller and drive names identify a paravirtual
        // disk client; see the quirk handling in read_into.
        let paravirtual = info.controller == "vdc" && info.drive == "vdc";

        // Provisional allocation: as many entries as fit the minimum
        // array size.
        let mut n_parts =
            u32::try_from(MIN_ARRAY_SIZE).unwrap() / entry_size_u32();
        let mut retried = false;
        loop {
            let mut label = blank_label(n_parts, lba_size);
            match self.read_into(&mut label, capacity, lba_size, paravirtual)
            {
                Ok(()) => {
                    label.last_lba = capacity.wrapping_sub(1);
                    return Ok(ReadLabel {
                        label,
                        partition_index: info.partition_index,
                    });
                }
                Err(LabelError::Invalid(InvalidLabel::Decode(
                    DecodeError::TooManyEntries { on_disk, .. },
                ))) if !retried && on_disk > n_parts => {
                    debug!(
                        "label carries {on_disk} entries, re-reading with a larger allocation"
                    );
                    n_parts = on_disk;
                    retried = true;
                }
                Err(err) => {
                    debug!("read of EFI label failed: {err}");
                    return Err(err);
                }
            }
        }
    }

    /// Device geometry with the historical fallbacks: an unknown or
    /// unsupported block size is assumed to be 512 bytes.
    fn media_geometry(&mut self) -> Result<(u64, u32), LabelError> {
        match self.dev.media_info() {
            Ok(info) => {
                let lba_size = if info.lba_size == 0 {
                    debug!("assuming 512-byte sectors");
                    512
                } else {
                    info.lba_size
                };
                Ok((info.capacity_lba, lba_size))
            }
            Err(DeviceError::NotSupported) => {
                debug!("media info not supported, assuming 512-byte sectors");
                Ok((0, 512))
            }
            Err(err) => Err(LabelError::from_device(err)),
        }
    }

    /// Read one header block at `lba` and validate it.
    fn probe_header(
        &mut self,
        lba: u64,
        block: &mut [u8],
        lba_size: u32,
    ) -> Result<GptHeader, ProbeFailure> {
        self.dev
            .read_efi(lba, block)
            .map_err(ProbeFailure::Device)?;
        codec::check_header(block, lba_size).map_err(ProbeFailure::Invalid)
    }

    /// Decode a label copy into `label`, trying primary then backups.
    fn read_into(
        &mut self,
        label: &mut DiskLabel,
        capacity: u64,
        lba_size: u32,
        paravirtual: bool,
    ) -> Result<(), LabelError> {
        let lba = usize_from(lba_size);
        let total_blocks = DiskLabel::label_blocks(label.n_parts(), lba_size);
        let mut buf =
            vec![0u8; usize::try_from(total_blocks * u64::from(lba_size)).expect("label fits in memory")];

        match self.probe_header(1, &mut buf[..lba], lba_size) {
            Ok(header) => {
                let entry_lba = header.partition_entry_lba.to_u64();
                self.dev
                    .read_efi(entry_lba, &mut buf[lba..])
                    .map_err(read_error)?;
                decode_into_label(label, &buf, lba_size)?;
                return Ok(());
            }
            Err(ProbeFailure::Device(DeviceError::InvalidRequest))
                if paravirtual =>
            {
                // Historical paravirtual backends rejected the
                // header-only read; they only honour one combined
                // header+array request.
                debug!("paravirtual disk, retrying a combined label read");
                self.dev.read_efi(1, &mut buf).map_err(read_error)?;
                decode_into_label(label, &buf, lba_size)?;
                return Ok(());
            }
            Err(ProbeFailure::Device(err)) => return Err(read_error(err)),
            Err(ProbeFailure::Invalid(_)) => {
                // No valid primary; fall through to the backups.
            }
        }

        // The backup header normally sits in the last block. Historical
        // SCSI drivers hid the last sector on some systems, so a disk
        // may instead carry it one block earlier; that placement is
        // probed first. In both cases the entry array sits between its
        // starting LBA and the backup header.
        let mut last_invalid = None;
        for backup_lba in [capacity.wrapping_sub(2), capacity.wrapping_sub(1)]
        {
            match self.probe_header(backup_lba, &mut buf[..lba], lba_size) {
                Ok(header) => {
                    debug!(
                        "primary label corrupt; using backup label at block {backup_lba}"
                    );
                    label.flags |= LabelFlags::PRIMARY_CORRUPT;

                    let on_disk =
                        header.number_of_partition_entries.to_u32();
                    if on_disk > label.n_parts() {
                        return Err(DecodeError::TooManyEntries {
                            on_disk,
                            max: label.n_parts(),
                        }
                        .into());
                    }

                    let entry_lba = header.partition_entry_lba.to_u64();
                    let array_bytes = backup_lba
                        .checked_sub(entry_lba)
                        .and_then(|sectors| {
                            sectors.checked_mul(u64::from(lba_size))
                        })
                        .and_then(|bytes| usize::try_from(bytes).ok())
                        .ok_or(InvalidLabel::BackupArrayPlacement)?;
                    if array_bytes > buf.len() - lba {
                        return Err(DecodeError::ArrayTruncated {
                            needed: u64::try_from(array_bytes).unwrap(),
                            available: u64::try_from(buf.len() - lba)
                                .unwrap(),
                        }
                        .into());
                    }

                    self.dev
                        .read_efi(entry_lba, &mut buf[lba..lba + array_bytes])
                        .map_err(read_error)?;
                    decode_into_label(label, &buf, lba_size)?;
                    return Ok(());
                }
                Err(ProbeFailure::Invalid(err)) => last_invalid = Some(err),
                Err(ProbeFailure::Device(err)) => return Err(read_error(err)),
            }
        }

        Err(last_invalid.expect("both backup probes were attempted").into())
    }
}

/// A label as the reader allocates it: geometry unknown, every slot
/// blank. Decoding fills in the rest.
fn blank_label(n_parts: u32, lba_size: u32) -> DiskLabel {
    DiskLabel {
        version: DiskLabel::CURRENT_VERSION,
        lba_size,
        first_usable_lba: 0,
        last_usable_lba: 0,
        alternate_lba: 0,
        last_lba: 0,
        disk_guid: Guid::ZERO,
        flags: LabelFlags::empty(),
        parts: vec![
            Partition::default();
            usize::try_from(n_parts).expect("slot count fits in usize")
        ],
    }
}

fn decode_into_label(
    label: &mut DiskLabel,
    buf: &[u8],
    lba_size: u32,
) -> Result<(), LabelError> {
    codec::decode_into(label, buf, lba_size)?;
    Ok(())
}

/// Classify a device failure on a label-range read: hard I/O failures
/// keep their identity, everything else is unexpected.
fn read_error(err: DeviceError) -> LabelError {
    match err {
        DeviceError::Io => LabelError::Io(err),
        other => LabelError::Other(other),
    }
}

fn entry_size_u32() -> u32 {
    u32::try_from(GptPartitionEntry::SIZE).expect("entry size fits in u32")
}

fn usize_from(v: u32) -> usize {
    usize::try_from(v).expect("u32 fits in usize")
}
