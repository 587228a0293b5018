// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{fixes, pmbr, BlockDevice, Disk, LabelError, PmbrFixups};
use bytemuck::bytes_of;
use efi_label_types::codec;
use efi_label_types::{
    Crc32, DiskLabel, GptHeader, GptPartitionEntry, LbaLe, PartitionTag,
};
use log::{debug, warn};

impl<D: BlockDevice> Disk<D> {
    /// Serialise `label` and its protective MBR to the device.
    ///
    /// The label is validated first; partitions that are in use but
    /// lack a unique GUID get a freshly generated one (mutating
    /// `label`). Writes are issued in order: primary header plus entry
    /// array, backup entry array, backup header, protective MBR. A
    /// failure writing the primary is returned to the caller; failures
    /// of the three later writes are logged and absorbed, because the
    /// primary on disk already forms a readable label and a reader
    /// recovers from a stale backup on its own.
    pub fn write_label(
        &mut self,
        label: &mut DiskLabel,
    ) -> Result<(), LabelError> {
        self.dev
            .partition_info()
            .map_err(LabelError::from_device)?;

        label.validate()?;
        if label.reserved_index().is_none() {
            debug!("no reserved partition found");
        }

        let lba_size = label.lba_size;
        let lba = usize::try_from(lba_size).expect("u32 fits in usize");
        let total_blocks =
            DiskLabel::label_blocks(label.n_parts(), lba_size);
        // Blocks occupied by the entry array alone.
        let array_blocks = total_blocks - 1;
        let backup_header_lba =
            label.last_usable_lba + 1 + array_blocks;

        let mut buf = vec![
            0u8;
            usize::try_from(total_blocks * u64::from(lba_size))
                .expect("label fits in memory")
        ];

        for (i, part) in label.parts.iter_mut().enumerate() {
            if part.tag == PartitionTag::UNASSIGNED {
                continue;
            }
            // The label must not lose type identity: a tag without a
            // reverse mapping refuses the whole write, before anything
            // reaches the device. The model's type GUID is kept in
            // step with the tag actually persisted.
            part.type_guid = part.tag.to_type_guid().ok_or(
                codec::EncodeError::UnknownTag {
                    index: i,
                    tag: part.tag,
                },
            )?;
            if part.unique_guid.is_zero() {
                part.unique_guid = self.uuid.generate();
            }
        }

        codec::encode_entries(label, &mut buf[lba..])?;

        let array_bytes =
            label.parts.len() * GptPartitionEntry::SIZE;
        let mut header =
            codec::build_primary_header(label, backup_header_lba);
        header.partition_entry_array_crc32 =
            Crc32::of(&buf[lba..lba + array_bytes]);
        header.update_crc32();
        buf[..GptHeader::SIZE].copy_from_slice(bytes_of(&header));

        self.dev
            .write_efi(1, &buf)
            .map_err(LabelError::from_device)?;

        // The backup entry array is a byte-for-byte copy of the
        // primary's.
        let backup_array_lba = label.last_usable_lba + 1;
        if let Err(err) = self.dev.write_efi(backup_array_lba, &buf[lba..]) {
            warn!(
                "write of backup partitions to block {backup_array_lba} failed: {err}"
            );
        }

        // The backup header is the primary with MyLBA and AlternateLBA
        // swapped and the entry array relocated in front of it.
        header.my_lba = LbaLe::from_u64(backup_header_lba);
        header.alternate_lba = LbaLe::from_u64(1);
        header.partition_entry_lba = LbaLe::from_u64(backup_array_lba);
        header.update_crc32();
        let mut block = vec![0u8; lba];
        block[..GptHeader::SIZE].copy_from_slice(bytes_of(&header));
        if let Err(err) = self.dev.write_efi(backup_header_lba, &block) {
            warn!(
                "write of backup header to block {backup_header_lba} failed: {err}"
            );
        }

        let fixups = match &mut self.fixups {
            Some(source) => fixes::resolve(source.as_mut()),
            None => PmbrFixups::default(),
        };
        if let Err(err) = pmbr::write_pmbr(&mut self.dev, label, fixups) {
            warn!("write of protective MBR failed: {err}");
        }

        Ok(())
    }
}
