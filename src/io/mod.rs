// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container I/O.
//!
//! Readers announce a container's channels and yield undecoded records for
//! a channel selection in time order.

use std::path::Path;

pub mod detection;
pub mod filter;
pub mod formats;
pub mod memory;
pub mod metadata;
pub mod traits;

pub use detection::{detect_format, ContainerFormat};
pub use filter::TopicFilter;
pub use formats::bag::BagContainer;
pub use memory::MemoryContainer;
pub use metadata::{ConnectionInfo, RawRecord};
pub use traits::{ContainerReader, RecordIter};

/// Errors raised by container readers.
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// The container is missing, unreadable or not in a supported format
    #[error("Cannot open '{path}': {message}")]
    Open {
        /// Container path
        path: String,
        /// Reader message
        message: String,
    },

    /// The container opened but a later read failed
    #[error("Cannot read '{path}': {message}")]
    Read {
        /// Container path
        path: String,
        /// Reader message
        message: String,
    },
}

impl ContainerError {
    /// Create an open error.
    pub fn open(path: impl Into<String>, message: impl Into<String>) -> Self {
        ContainerError::Open {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Open a container file, choosing the reader from its format.
pub fn open_container<P: AsRef<Path>>(path: P) -> Result<Box<dyn ContainerReader>, ContainerError> {
    let path = path.as_ref();
    match detect_format(path) {
        ContainerFormat::Bag => Ok(Box::new(BagContainer::open(path)?)),
        ContainerFormat::Unknown => Err(ContainerError::open(
            path.display().to_string(),
            "unsupported container format",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_unknown_format() {
        let err = open_container("/nonexistent/data.txt").err().unwrap();
        assert!(matches!(err, ContainerError::Open { .. }));
        assert!(err.to_string().contains("unsupported container format"));
    }
}
