// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Metadata and record types shared by all container readers.

use crate::core::NANOS_PER_SEC;

/// One channel (topic) as announced by a container.
///
/// Every field comes straight from the container's connection record; the
/// definition text is parsed later by the schema registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Topic name (e.g., "/odom")
    pub channel: String,
    /// Content checksum of the definition (md5 hex for ROS1)
    pub checksum: String,
    /// Message type name (e.g., "nav_msgs/Odometry")
    pub type_name: String,
    /// Full message definition text
    pub definition: String,
    /// Publishing node, when the container records one
    pub caller_id: Option<String>,
}

impl ConnectionInfo {
    /// Create a new connection description.
    pub fn new(
        channel: impl Into<String>,
        checksum: impl Into<String>,
        type_name: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            checksum: checksum.into(),
            type_name: type_name.into(),
            definition: definition.into(),
            caller_id: None,
        }
    }

    /// Set the caller ID.
    pub fn with_caller_id(mut self, caller_id: impl Into<String>) -> Self {
        self.caller_id = Some(caller_id.into());
        self
    }
}

/// One undecoded record.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Channel the record was published on
    pub channel: String,
    /// Arrival time in nanoseconds
    pub log_time: u64,
    /// Serialized payload
    pub data: Vec<u8>,
    /// Checksum of the connection that carried the record, when known
    pub checksum: Option<String>,
}

impl RawRecord {
    /// Create a record.
    pub fn new(channel: impl Into<String>, log_time: u64, data: Vec<u8>) -> Self {
        Self {
            channel: channel.into(),
            log_time,
            data,
            checksum: None,
        }
    }

    /// Set the connection checksum.
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Arrival time in seconds.
    pub fn timestamp(&self) -> f64 {
        let secs = self.log_time / NANOS_PER_SEC as u64;
        let nanos = self.log_time % NANOS_PER_SEC as u64;
        secs as f64 + nanos as f64 * 1e-9
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
