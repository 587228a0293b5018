// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoding and encoding of one label copy: a GPT header block followed
//! by its partition entry array.
//!
//! Everything in this module is pure; driving the block device to find
//! a decodable label copy (and to place the encoded one) belongs to the
//! IO crate.

use crate::{
    Crc32, DiskLabel, GptHeader, GptPartitionAttributes, GptPartitionEntry,
    GptPartitionName, LbaLe, Partition, PartitionTag, U32Le,
};
use bytemuck::{bytes_of, from_bytes};

/// Error type for [`check_header`] and [`decode_into`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// The header does not begin with `"EFI PART"`.
    #[error("bad EFI signature: {0:#018x}")]
    Signature(u64),

    /// The stored header size is smaller than the defined region or
    /// larger than one block.
    #[error("header size {size} does not fit a {lba_size}-byte block")]
    HeaderSize {
        /// Stored header size.
        size: u32,
        /// Logical block size.
        lba_size: u32,
    },

    /// The header checksum does not match its contents.
    #[error("bad header CRC: {stored:#010x} != {computed:#010x}")]
    HeaderCrc {
        /// Checksum stored in the header.
        stored: u32,
        /// Checksum of the header bytes.
        computed: u32,
    },

    /// The label carries more entries than the caller allocated. The
    /// caller may retry with a label of [`on_disk`] slots.
    ///
    /// [`on_disk`]: Self::TooManyEntries::on_disk
    #[error("label has {on_disk} partition entries, more than the {max} allocated")]
    TooManyEntries {
        /// Entry count stored on disk.
        on_disk: u32,
        /// Entry count the caller allocated.
        max: u32,
    },

    /// The stored entry size is not 128·2ⁿ.
    #[error("unsupported partition entry size {0}")]
    EntrySize(u32),

    /// The entry array does not fit the label region that was read.
    #[error("partition entry array of {needed} bytes exceeds the {available} available")]
    ArrayTruncated {
        /// Bytes the stored entry count requires.
        needed: u64,
        /// Bytes present after the header block.
        available: u64,
    },

    /// The entry array checksum does not match its contents.
    #[error("bad partition array CRC: {stored:#010x} != {computed:#010x}")]
    ArrayCrc {
        /// Checksum stored in the header.
        stored: u32,
        /// Checksum of the array bytes.
        computed: u32,
    },
}

/// Error type for [`encode_entries`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// A slot carries a tag with no reverse mapping; writing it would
    /// lose the partition's type identity.
    #[error("no type GUID for tag {tag} of partition {index}")]
    UnknownTag {
        /// Slot index.
        index: usize,
        /// The unmapped tag.
        tag: PartitionTag,
    },
}

/// Validate one header block and return the decoded header.
///
/// `block` must hold at least one logical block. Checks, in order: the
/// signature, the stored header size against the block size, and the
/// header CRC (computed over the stored header size with the CRC field
/// zeroed).
pub fn check_header(
    block: &[u8],
    lba_size: u32,
) -> Result<GptHeader, DecodeError> {
    let header: GptHeader = *from_bytes(&block[..GptHeader::SIZE]);

    if !header.is_signature_valid() {
        return Err(DecodeError::Signature(header.signature.to_u64()));
    }

    // The defined region can never be larger than one block.
    let header_size = header.header_size.to_u32();
    if header_size < u32::try_from(GptHeader::SIZE).unwrap()
        || header_size > lba_size
    {
        return Err(DecodeError::HeaderSize {
            size: header_size,
            lba_size,
        });
    }

    let crc = crc::Crc::<u32>::new(&Crc32::ALGORITHM);
    let mut digest = crc.digest();
    digest.update(&block[..16]);
    digest.update(&[0u8; 4]); // Zeroes for the CRC field itself.
    digest.update(&block[20..usize_from(header_size)]);
    let computed = digest.finalize();

    let stored = header.header_crc32.to_u32();
    if stored != computed {
        return Err(DecodeError::HeaderCrc { stored, computed });
    }

    Ok(header)
}

/// Decode one label copy from `buf` into `label`.
///
/// `buf` holds the header block followed by the entry array blocks.
/// `label.parts` gives the entry budget: if the disk carries more
/// entries, decoding fails with [`DecodeError::TooManyEntries`] so the
/// caller can re-read with a larger label. On success the header fields
/// and every on-disk entry are filled in and `label.parts` is truncated
/// to the on-disk entry count. `label.last_lba` and `label.flags` are
/// left for the caller, which knows the device and how the label was
/// found.
pub fn decode_into(
    label: &mut DiskLabel,
    buf: &[u8],
    lba_size: u32,
) -> Result<(), DecodeError> {
    let header = check_header(buf, lba_size)?;

    let n_parts = header.number_of_partition_entries.to_u32();
    let max = u32::try_from(label.parts.len()).unwrap_or(u32::MAX);
    if n_parts > max {
        return Err(DecodeError::TooManyEntries {
            on_disk: n_parts,
            max,
        });
    }

    let entry_size = header.size_of_partition_entry.to_u32();
    if entry_size < 128 || !entry_size.is_power_of_two() {
        return Err(DecodeError::EntrySize(entry_size));
    }

    let array = &buf[usize_from(lba_size)..];
    let needed = u64::from(n_parts) * u64::from(entry_size);
    let available = u64::try_from(array.len()).unwrap_or(u64::MAX);
    if needed > available {
        return Err(DecodeError::ArrayTruncated { needed, available });
    }
    let array = &array[..usize::try_from(needed).unwrap()];

    let computed = Crc32::of(array).to_u32();
    let stored = header.partition_entry_array_crc32.to_u32();
    if stored != computed {
        return Err(DecodeError::ArrayCrc { stored, computed });
    }

    label.version = header.revision.0.to_u32();
    label.lba_size = lba_size;
    label.first_usable_lba = header.first_usable_lba.to_u64();
    label.last_usable_lba = header.last_usable_lba.to_u64();
    label.alternate_lba = header.alternate_lba.to_u64();
    label.disk_guid = header.disk_guid.to_guid();

    label.parts.truncate(usize::try_from(n_parts).unwrap());
    for (i, part) in label.parts.iter_mut().enumerate() {
        let offset = i * usize_from(entry_size);
        let entry: &GptPartitionEntry =
            from_bytes(&array[offset..offset + GptPartitionEntry::SIZE]);

        let type_guid = entry.partition_type_guid.to_guid();
        *part = Partition {
            type_guid,
            tag: PartitionTag::for_type_guid(&type_guid)
                .unwrap_or(PartitionTag::UNKNOWN),
            ..Partition::default()
        };
        if part.tag == PartitionTag::UNASSIGNED {
            continue;
        }

        part.attrs = entry.attributes.low_word();
        part.start_lba = entry.starting_lba.to_u64();
        part.size_lba = entry
            .ending_lba
            .to_u64()
            .wrapping_sub(part.start_lba)
            .wrapping_add(1);
        part.name = entry.name.to_narrow();
        part.unique_guid = entry.unique_partition_guid.to_guid();
    }

    Ok(())
}

/// Build the primary header for `label`, with both CRC fields left
/// zero. `backup_header_lba` is where the writer will place the backup
/// header, one block past the backup entry array.
#[must_use]
pub fn build_primary_header(
    label: &DiskLabel,
    backup_header_lba: u64,
) -> GptHeader {
    GptHeader {
        revision: crate::GptHeaderRevision(U32Le::from_u32(label.version)),
        my_lba: LbaLe::from_u64(1),
        alternate_lba: LbaLe::from_u64(backup_header_lba),
        first_usable_lba: LbaLe::from_u64(label.first_usable_lba),
        last_usable_lba: LbaLe::from_u64(label.last_usable_lba),
        disk_guid: label.disk_guid.to_le(),
        partition_entry_lba: LbaLe::from_u64(2),
        number_of_partition_entries: U32Le::from_u32(label.n_parts()),
        ..GptHeader::default()
    }
}

/// Encode the partition entry array into `out`, which must hold at
/// least `n_parts × 128` bytes and arrive zeroed. Unassigned slots stay
/// all-zero; every other slot must carry a tag with a reverse mapping.
pub fn encode_entries(
    label: &DiskLabel,
    out: &mut [u8],
) -> Result<(), EncodeError> {
    for (i, part) in label.parts.iter().enumerate() {
        if part.tag == PartitionTag::UNASSIGNED {
            continue;
        }

        let type_guid = part
            .tag
            .to_type_guid()
            .ok_or(EncodeError::UnknownTag { index: i, tag: part.tag })?;

        let entry = GptPartitionEntry {
            partition_type_guid: type_guid.to_le(),
            unique_partition_guid: part.unique_guid.to_le(),
            starting_lba: LbaLe::from_u64(part.start_lba),
            ending_lba: LbaLe::from_u64(part.end_lba()),
            attributes: GptPartitionAttributes::from_low_word(part.attrs),
            name: GptPartitionName::from_narrow(&part.name),
        };

        let offset = i * GptPartitionEntry::SIZE;
        out[offset..offset + GptPartitionEntry::SIZE]
            .copy_from_slice(bytes_of(&entry));
    }
    Ok(())
}

fn usize_from(v: u32) -> usize {
    usize::try_from(v).expect("u32 fits in usize")
}
