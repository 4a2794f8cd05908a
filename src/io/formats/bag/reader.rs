// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 bag container using the rosbag crate.
//!
//! Connections are collected from both the index section and the chunk
//! section, since bags written by some tools only announce connections
//! inside chunks. Records are read chunk by chunk and then stable-sorted by
//! time: chunks are not guaranteed to be in time order across topics.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

use crate::io::filter::TopicFilter;
use crate::io::metadata::{ConnectionInfo, RawRecord};
use crate::io::traits::{ContainerReader, RecordIter};
use crate::io::ContainerError;

/// A ROS1 bag file opened for reading.
pub struct BagContainer {
    /// File path
    path: String,
    /// Distinct (topic, checksum) connections in announcement order
    connections: Vec<ConnectionInfo>,
    /// Bag connection ID to topic name and checksum
    conn_topics: HashMap<u32, (String, String)>,
    /// Message count per topic
    counts: HashMap<String, u64>,
}

impl BagContainer {
    /// Open a bag file and read its connection table.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ContainerError> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_string_lossy().to_string();

        let bag = rosbag::RosBag::new(path_ref)
            .map_err(|e| ContainerError::open(&path_str, format!("failed to open bag: {e}")))?;

        let mut container = Self {
            path: path_str,
            connections: Vec::new(),
            conn_topics: HashMap::new(),
            counts: HashMap::new(),
        };
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for record in bag.index_records() {
            let record = record.map_err(|e| {
                ContainerError::open(&container.path, format!("failed to read index: {e}"))
            })?;
            if let rosbag::IndexRecord::Connection(conn) = record {
                container.add_connection(&mut seen, conn);
            }
        }

        // Chunks may announce connections the index lacks; count messages on
        // the same pass.
        for record in bag.chunk_records() {
            let record = record.map_err(|e| {
                ContainerError::open(&container.path, format!("failed to read chunk: {e}"))
            })?;
            if let rosbag::ChunkRecord::Chunk(chunk) = record {
                for msg in chunk.messages() {
                    let msg = msg.map_err(|e| {
                        ContainerError::open(&container.path, format!("failed to read message: {e}"))
                    })?;
                    if let rosbag::MessageRecord::Connection(conn) = msg {
                        container.add_connection(&mut seen, conn);
                    } else if let rosbag::MessageRecord::MessageData(data) = msg {
                        if let Some((topic, _)) = container.conn_topics.get(&data.conn_id) {
                            *container.counts.entry(topic.clone()).or_default() += 1;
                        }
                    }
                }
            }
        }

        debug!(
            path = %container.path,
            connections = container.connections.len(),
            "opened bag"
        );
        Ok(container)
    }

    fn add_connection(
        &mut self,
        seen: &mut HashSet<(String, String)>,
        conn: rosbag::record_types::Connection<'_>,
    ) {
        if self.conn_topics.contains_key(&conn.id) {
            return;
        }
        let checksum = hex::encode(conn.md5sum);
        self.conn_topics
            .insert(conn.id, (conn.topic.to_string(), checksum.clone()));

        if !seen.insert((conn.topic.to_string(), checksum.clone())) {
            return;
        }
        let mut info =
            ConnectionInfo::new(conn.topic, checksum, conn.tp, conn.message_definition);
        if !conn.caller_id.is_empty() {
            info = info.with_caller_id(conn.caller_id);
        }
        self.connections.push(info);
    }

    fn read_error(&self, what: &str, e: impl std::fmt::Display) -> ContainerError {
        ContainerError::Read {
            path: self.path.clone(),
            message: format!("failed to read {what}: {e}"),
        }
    }
}

impl ContainerReader for BagContainer {
    fn path(&self) -> &str {
        &self.path
    }

    fn connections(&self) -> &[ConnectionInfo] {
        &self.connections
    }

    fn record_count(&self, filter: &TopicFilter) -> u64 {
        self.counts
            .iter()
            .filter(|(topic, _)| filter.should_include(topic))
            .map(|(_, count)| count)
            .sum()
    }

    fn records(&self, filter: &TopicFilter) -> Result<RecordIter<'_>, ContainerError> {
        let bag = rosbag::RosBag::new(Path::new(&self.path))
            .map_err(|e| ContainerError::open(&self.path, format!("failed to open bag: {e}")))?;

        let mut records = Vec::new();
        for record in bag.chunk_records() {
            let record = record.map_err(|e| self.read_error("chunk", e))?;
            let rosbag::ChunkRecord::Chunk(chunk) = record else {
                continue;
            };
            for msg in chunk.messages() {
                let msg = msg.map_err(|e| self.read_error("message", e))?;
                let rosbag::MessageRecord::MessageData(data) = msg else {
                    continue;
                };
                let Some((topic, checksum)) = self.conn_topics.get(&data.conn_id) else {
                    continue;
                };
                if filter.should_include(topic) {
                    records.push(
                        RawRecord::new(topic.as_str(), data.time, data.data.to_vec())
                            .with_checksum(checksum.as_str()),
                    );
                }
            }
        }

        // Stable: records sharing a timestamp keep file order.
        records.sort_by_key(|r| r.log_time);
        Ok(Box::new(records.into_iter().map(Ok)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_file() {
        let result = BagContainer::open("/nonexistent/file.bag");
        assert!(matches!(result, Err(ContainerError::Open { .. })));
    }
}
