// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Reading, writing, and reshaping EFI/GPT disk labels through a block
//! device interface.
//!
//! The device is represented by the [`BlockDevice`] trait and can be
//! backed by:
//! * [`FileDevice`]: a raw device node or disk image behind a
//!   [`File`].
//! * [`MemDevice`]: an in-memory image.
//! * A custom implementation of the [`BlockDevice`] trait.
//!
//! Operations live on [`Disk`]:
//! * [`Disk::init_label`] builds a blank [`DiskLabel`] sized to the
//!   device.
//! * [`Disk::read_label`] locates and decodes a valid label, falling
//!   back to either backup location when the primary is corrupt.
//! * [`Disk::write_label`] validates a label and serialises it plus
//!   its protective MBR, tolerating backup-write failures.
//! * [`Disk::use_whole_disk`] grows the label over capacity added to
//!   the device, keeping the trailing reserved partition at the end.
//!
//! Diagnostics go to the [`log`] facade at `debug` level; non-fatal
//! write failures are logged at `warn`. The library installs no
//! logger.
//!
//! [`DiskLabel`]: efi_label_types::DiskLabel
//! [`File`]: std::fs::File

#![warn(missing_docs)]
#![warn(trivial_casts)]
#![warn(trivial_numeric_casts)]
#![warn(unreachable_pub)]
#![warn(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

mod device;
mod disk;
mod error;
mod fixes;
mod pmbr;
mod uuid_source;
mod whole_disk;
mod write;

// Re-export dependencies.
pub use efi_label_types;
pub use log;

pub use device::{
    BlockDevice, DeviceError, FileDevice, MediaInfo, MemDevice,
    PartitionInfo,
};
pub use disk::{Disk, ReadLabel};
pub use error::{InvalidLabel, LabelError};
pub use fixes::{parse_rules, HwFixupSource, IdentStrings, PmbrFixups};
pub use uuid_source::{OsUuid, UuidSource};
