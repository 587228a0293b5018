// Copyright 2025 The efi-label-rs Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use efi_label_io::efi_label_types::{BlockSize, PartitionTag};
use efi_label_io::{Disk, FileDevice};
use std::{env, fs};

// To create a disk image to test this you can use truncate and sgdisk:
//
// truncate --size 10MiB disk.bin
// sgdisk disk.bin --new=1:2048:4096 --change-name=1:'hello world!' --print
// cargo run --example reader disk.bin

fn main() -> Result<()> {
    let disk_path = env::args().nth(1).expect("one argument is required");
    println!("opening {disk_path} for reading");

    let file = fs::File::open(disk_path)?;
    let mut disk = Disk::new(FileDevice::new(file, BlockSize::B512));

    let read = disk.read_label()?;
    println!("{}", read.label);

    for (slot, part) in read.label.parts.iter().enumerate() {
        if part.tag == PartitionTag::UNASSIGNED {
            continue;
        }
        println!(
            "slot {slot}: {} start={} size={} name=\"{}\"",
            part.tag,
            part.start_lba,
            part.size_lba,
            part.name_str(),
        );
    }

    Ok(())
}
