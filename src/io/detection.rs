// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container format detection.
//!
//! Checks the file signature first and falls back to the extension when the
//! file cannot be read or carries no known signature.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// ROS1 bag (version 2.0)
    Bag,
    /// Not recognized
    Unknown,
}

/// Version line every ROS1 bag v2.0 file starts with.
const BAG_MAGIC: &[u8] = b"#ROSBAG V2.0\n";

/// Detect the container format of `path`.
pub fn detect_format<P: AsRef<Path>>(path: P) -> ContainerFormat {
    let path = path.as_ref();
    match detect_from_magic(path) {
        Some(format) => format,
        None => detect_from_extension(path),
    }
}

fn detect_from_magic(path: &Path) -> Option<ContainerFormat> {
    let mut file = File::open(path).ok()?;
    let mut header = [0u8; 13];
    file.read_exact(&mut header).ok()?;
    if header == BAG_MAGIC {
        Some(ContainerFormat::Bag)
    } else {
        None
    }
}

fn detect_from_extension(path: &Path) -> ContainerFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "bag" => ContainerFormat::Bag,
            _ => ContainerFormat::Unknown,
        })
        .unwrap_or(ContainerFormat::Unknown)
}
