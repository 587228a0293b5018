// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{BlockDevice, LabelError, PmbrFixups};
use bytemuck::{bytes_of, from_bytes};
use efi_label_types::{DiskLabel, Mbr, MbrPartitionRecord};
use log::debug;

/// Synthesise and write the protective MBR in sector 0.
///
/// If sector 0 already carries a valid MBR its boot code and disk
/// signature are preserved; otherwise a fresh zeroed record is built.
/// All four partition records are cleared, and one protective record
/// is placed at the slot the hardware fixups name.
pub(crate) fn write_pmbr<D: BlockDevice>(
    dev: &mut D,
    label: &DiskLabel,
    fixups: PmbrFixups,
) -> Result<(), LabelError> {
    let len = if label.lba_size == 0 {
        Mbr::SIZE
    } else {
        usize::try_from(label.lba_size).expect("u32 fits in usize")
    };
    let mut block = vec![0u8; len];

    let mut mbr: Mbr = match dev.read_efi(0, &mut block) {
        Ok(()) => {
            let existing: &Mbr = from_bytes(&block[..Mbr::SIZE]);
            if existing.is_signature_valid() {
                *existing
            } else {
                Mbr::default()
            }
        }
        Err(err) => {
            debug!("could not read sector 0 ({err}); writing a fresh MBR");
            block.fill(0);
            Mbr::default()
        }
    };

    mbr.clear_partitions();
    mbr.partitions[fixups.slot] =
        MbrPartitionRecord::protective(label.last_lba, fixups.active);

    // Bytes of the block beyond the 512-byte MBR image keep whatever
    // the sector already held.
    block[..Mbr::SIZE].copy_from_slice(bytes_of(&mbr));
    dev.write_efi(0, &block).map_err(LabelError::from_device)
}
