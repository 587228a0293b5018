// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{BlockDevice, Disk, InvalidLabel, LabelError, ReadLabel};
use efi_label_types::{DiskLabel, PartitionTag};
use log::debug;

impl<D: BlockDevice> Disk<D> {
    /// Grow the label to consume capacity added to the device.
    ///
    /// The label must keep the conventional layout: its last slot is
    /// the only reserved partition and sits after every other
    /// partition. The reserved partition is relocated to the end of the
    /// (new) usable region, the backup label moves to the new end of
    /// the disk, and the data partition with the highest end LBA grows
    /// over the space freed in between. Nothing is written when no
    /// field changed, so running this twice on an unchanged device is a
    /// no-op.
    pub fn use_whole_disk(&mut self) -> Result<(), LabelError> {
        let ReadLabel { mut label, .. } = self.read_label()?;

        let (last_index, last_used) = find_last_data_partition(&label)?;
        let resv_index = label.parts.len() - 1;
        let mut save = false;

        // Move the backup label to the end of the disk, unless this
        // label itself came from a backup copy (its alternate then
        // points at the primary) or the backup is already there.
        if label.alternate_lba != 1 && label.alternate_lba != label.last_lba
        {
            label.alternate_lba = label.last_lba;
            save = true;
        }

        // The last usable LBA must leave room for the backup entry
        // array and header at the end of the grown disk.
        let nblocks =
            DiskLabel::label_blocks(label.n_parts(), label.lba_size);
        if label.last_usable_lba < label.last_lba - nblocks {
            label.last_usable_lba = label.last_lba - nblocks;
            save = true;
        }

        // Relocate the reserved partition so it ends exactly at the
        // last usable LBA. It only ever moves toward the end of the
        // disk; the space it vacates holds no data that would need
        // copying.
        let resv = &label.parts[resv_index];
        if resv.end_lba() != label.last_usable_lba {
            let new_start =
                label.last_usable_lba - resv.size_lba + 1;
            if new_start < resv.start_lba {
                debug!("reserved partition size mismatch");
                return Err(InvalidLabel::ReservedSizeMismatch.into());
            }
            label.parts[resv_index].start_lba = new_start;
            save = true;
        }

        // Grow the last data partition over the gap up to the
        // (relocated) reserved partition.
        let resv_start = label.parts[resv_index].start_lba;
        if let Some(last_index) = last_index {
            if last_used < resv_start - 1 {
                label.parts[last_index].size_lba +=
                    resv_start - 1 - last_used;
                save = true;
            }
        }

        if !save {
            return Ok(());
        }
        self.write_label(&mut label)
    }
}

/// Find the non-reserved partition with the highest end LBA and verify
/// the layout the reshape depends on: at least two slots, the last slot
/// (and only that slot) reserved, and the reserved partition starting
/// after every other partition.
///
/// Returns the slot index (`None` when every data slot is empty) and
/// the highest used LBA.
fn find_last_data_partition(
    label: &DiskLabel,
) -> Result<(Option<usize>, u64), LabelError> {
    if label.parts.len() < 2 {
        debug!("too few ({}) partitions", label.parts.len());
        return Err(InvalidLabel::TooFewPartitions(label.n_parts()).into());
    }

    let resv_index = label.parts.len() - 1;
    let mut last = None;
    let mut last_used = 0u64;
    for (i, part) in label.parts[..resv_index].iter().enumerate() {
        if part.tag == PartitionTag::RESERVED {
            debug!("reserved partition found at unexpected position ({i})");
            return Err(InvalidLabel::ReservedNotLast(i).into());
        }
        if part.size_lba == 0 {
            continue;
        }
        let end = part.end_lba();
        if last_used < end {
            last = Some(i);
            last_used = end;
        }
    }

    if label.parts[resv_index].tag != PartitionTag::RESERVED {
        debug!("no reserved partition");
        return Err(InvalidLabel::NoReservedPartition.into());
    }

    // The reserved partition must start past every used sector.
    if label.parts[resv_index].start_lba <= last_used {
        debug!("reserved partition not after other partitions");
        return Err(InvalidLabel::ReservedNotAfterData.into());
    }

    Ok((last, last_used))
}
