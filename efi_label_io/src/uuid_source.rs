// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use efi_label_types::Guid;

/// Capability for generating random (version 4) GUIDs.
///
/// The writer uses it to stamp the disk GUID of a fresh label and the
/// unique GUID of any partition that lacks one. Tests substitute a
/// deterministic source so emitted bytes can be compared.
pub trait UuidSource {
    /// Generate one GUID in canonical byte order.
    fn generate(&mut self) -> Guid;
}

/// Default [`UuidSource`] drawing from the operating system's
/// randomness.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsUuid;

impl UuidSource for OsUuid {
    fn generate(&mut self) -> Guid {
        Guid(*uuid::Uuid::new_v4().as_bytes())
    }
}
