// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Data types and codec for EFI/GPT disk labels.
//!
//! # Label components
//!
//! ```text
//! ┌───┬───────┬─────────────────┬─────────┬─────────────────┬───────┐
//! │MBR│Primary│Primary partition│Partition│Backup partition │Backup │
//! │   │header │entry array      │data     │entry array      │header │
//! └───┴───────┴─────────────────┴─────────┴─────────────────┴───────┘
//! ```
//!
//! 1. The first block of the disk contains a protective MBR. See
//!    [`Mbr`] and [`MbrPartitionRecord::protective`].
//! 2. The second block contains the primary GPT header. See
//!    [`GptHeader`].
//! 3. The blocks after the header contain the partition entry
//!    array. See [`GptPartitionEntry`].
//! 4. At the end of the disk sit a backup entry array and a backup
//!    header, in that order. (Labels written by some historical systems
//!    place the backup header one block earlier; the reader in the IO
//!    crate accepts that placement, the writer never produces it.)
//!
//! The in-memory form of a label is [`DiskLabel`]: host-endian
//! geometry, one [`Partition`] per slot, and the local numeric
//! [`PartitionTag`] type system mapped to and from the on-disk type
//! GUIDs. The [`codec`] module converts between raw label bytes and
//! `DiskLabel`.
//!
//! # Endianness
//!
//! All multi-byte integers on disk are little endian, enforced by the
//! byte-backed [`U16Le`], [`U32Le`], and [`U64Le`] field types. The one
//! exception is the GUID encoding, which is partially little endian and
//! partially big endian as described in Appendix A of the UEFI
//! Specification; [`Guid`] (canonical order) and [`GuidLe`] (on-disk
//! order) keep the two shapes apart.

#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![warn(missing_docs)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

mod block;
pub mod codec;
mod crc32;
mod entry;
mod guid;
mod header;
mod label;
mod mbr;
mod num;
pub mod tag;

// Re-export dependencies.
pub use bitflags;
pub use bytemuck;
pub use crc;
pub use ucs2;

pub use block::{BlockSize, LbaLe};
pub use crc32::Crc32;
pub use entry::{
    GptPartitionAttributes, GptPartitionEntry, GptPartitionName,
    GptPartitionNameFromStrError,
};
pub use guid::{Guid, GuidFromStrError, GuidLe};
pub use header::{GptHeader, GptHeaderRevision, GptHeaderSignature};
pub use label::{
    CheckError, DiskLabel, LabelFlags, Partition, MIN_ARRAY_SIZE,
    RESERVED_PARTITION_BYTES,
};
pub use mbr::{Chs, Mbr, MbrPartitionRecord};
pub use num::{U16Le, U32Le, U64Le};
pub use tag::PartitionTag;
