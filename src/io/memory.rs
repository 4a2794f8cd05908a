// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory container.
//!
//! Holds connections and records in plain vectors. Useful for embedding
//! callers that already have the bytes, and for tests.

use super::filter::TopicFilter;
use super::metadata::{ConnectionInfo, RawRecord};
use super::traits::{ContainerReader, RecordIter};
use super::ContainerError;

/// A container backed by vectors.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    label: String,
    connections: Vec<ConnectionInfo>,
    records: Vec<RawRecord>,
}

impl MemoryContainer {
    /// Create an empty container.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            connections: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Announce a channel.
    pub fn add_connection(&mut self, connection: ConnectionInfo) {
        self.connections.push(connection);
    }

    /// Builder form of [`add_connection`](Self::add_connection).
    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.add_connection(connection);
        self
    }

    /// Append a record. Records are kept sorted by `log_time`; records
    /// with equal times stay in insertion order.
    pub fn push(&mut self, record: RawRecord) {
        let at = self
            .records
            .partition_point(|r| r.log_time <= record.log_time);
        self.records.insert(at, record);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with_record(mut self, channel: &str, log_time: u64, data: Vec<u8>) -> Self {
        self.push(RawRecord::new(channel, log_time, data));
        self
    }
}

impl ContainerReader for MemoryContainer {
    fn path(&self) -> &str {
        &self.label
    }

    fn connections(&self) -> &[ConnectionInfo] {
        &self.connections
    }

    fn record_count(&self, filter: &TopicFilter) -> u64 {
        self.records
            .iter()
            .filter(|r| filter.should_include(&r.channel))
            .count() as u64
    }

    fn records(&self, filter: &TopicFilter) -> Result<RecordIter<'_>, ContainerError> {
        let filter = filter.clone();
        Ok(Box::new(
            self.records
                .iter()
                .filter(move |r| filter.should_include(&r.channel))
                .cloned()
                .map(Ok),
        ))
    }
}
