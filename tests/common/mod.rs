// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// ============================================================================
// ROS1 payload encoding
// ============================================================================

/// Little-endian ROS1 payload builder.
#[derive(Debug, Default)]
pub struct Payload {
    bytes: Vec<u8>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, v: u8) -> Self {
        self.bytes.push(v);
        self
    }

    pub fn bool(self, v: bool) -> Self {
        self.u8(v as u8)
    }

    pub fn i16(mut self, v: i16) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i32(mut self, v: i32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u32(mut self, v: u32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn i64(mut self, v: i64) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn u64(mut self, v: u64) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f32(mut self, v: f32) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn f64(mut self, v: f64) -> Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn string(self, v: &str) -> Self {
        let mut this = self.u32(v.len() as u32);
        this.bytes.extend_from_slice(v.as_bytes());
        this
    }

    pub fn time(self, secs: u32, nsecs: u32) -> Self {
        self.u32(secs).u32(nsecs)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// `std_msgs/Header` dependency block.
pub const HEADER_BLOCK: &str = "================================================================================\n\
MSG: std_msgs/Header\n\
uint32 seq\n\
time stamp\n\
string frame_id\n";

/// Nanoseconds for a time in seconds.
pub fn secs(s: u64) -> u64 {
    s * 1_000_000_000
}

// ============================================================================
// Minimal ROS1 bag writer
// ============================================================================

const OP_MSG_DATA: u8 = 0x02;
const OP_BAG_HEADER: u8 = 0x03;
const OP_INDEX_DATA: u8 = 0x04;
const OP_CHUNK: u8 = 0x05;
const OP_CHUNK_INFO: u8 = 0x06;
const OP_CONNECTION: u8 = 0x07;

/// One connection to write into a test bag.
#[derive(Debug, Clone)]
pub struct BagConnection {
    pub topic: String,
    pub type_name: String,
    /// 32 hex characters
    pub md5sum: String,
    pub definition: String,
}

impl BagConnection {
    pub fn new(topic: &str, type_name: &str, md5sum: &str, definition: &str) -> Self {
        Self {
            topic: topic.to_string(),
            type_name: type_name.to_string(),
            md5sum: md5sum.to_string(),
            definition: definition.to_string(),
        }
    }
}

/// One message: connection index, time in nanoseconds, payload.
pub type BagMessage = (usize, u64, Vec<u8>);

/// Write an uncompressed single-chunk bag.
///
/// Messages are written in the given order, so callers can produce chunks
/// that are not sorted by time.
pub fn write_bag(
    path: &Path,
    connections: &[BagConnection],
    messages: &[BagMessage],
) -> std::io::Result<()> {
    let mut chunk_data = Vec::new();
    for (id, conn) in connections.iter().enumerate() {
        write_connection_record(&mut chunk_data, id as u32, conn);
    }

    let mut indexes: BTreeMap<u32, Vec<((u32, u32), u32)>> = BTreeMap::new();
    for (conn, time_ns, data) in messages {
        let time = ns_to_time(*time_ns);
        let offset = chunk_data.len() as u32;

        let mut fields = BTreeMap::new();
        fields.insert("op", vec![OP_MSG_DATA]);
        fields.insert("conn", (*conn as u32).to_le_bytes().to_vec());
        fields.insert("time", time_to_bytes(time));
        write_header(&mut chunk_data, &fields);
        write_u32(&mut chunk_data, data.len() as u32);
        chunk_data.extend_from_slice(data);

        indexes.entry(*conn as u32).or_default().push((time, offset));
    }

    let chunk_pos = 4096u64;
    let mut body = Vec::new();

    let mut fields = BTreeMap::new();
    fields.insert("op", vec![OP_CHUNK]);
    fields.insert("compression", b"none".to_vec());
    fields.insert("size", (chunk_data.len() as u32).to_le_bytes().to_vec());
    write_header(&mut body, &fields);
    write_u32(&mut body, chunk_data.len() as u32);
    body.extend_from_slice(&chunk_data);

    for (conn, entries) in &indexes {
        let mut fields = BTreeMap::new();
        fields.insert("op", vec![OP_INDEX_DATA]);
        fields.insert("ver", 1u32.to_le_bytes().to_vec());
        fields.insert("conn", conn.to_le_bytes().to_vec());
        fields.insert("count", (entries.len() as u32).to_le_bytes().to_vec());
        write_header(&mut body, &fields);
        write_u32(&mut body, (entries.len() * 12) as u32);
        for (time, offset) in entries {
            write_u32(&mut body, time.0);
            write_u32(&mut body, time.1);
            write_u32(&mut body, *offset);
        }
    }

    let index_pos = chunk_pos + body.len() as u64;
    for (id, conn) in connections.iter().enumerate() {
        write_connection_record(&mut body, id as u32, conn);
    }

    let start = messages.iter().map(|m| m.1).min().unwrap_or(0);
    let end = messages.iter().map(|m| m.1).max().unwrap_or(0);
    let mut fields = BTreeMap::new();
    fields.insert("op", vec![OP_CHUNK_INFO]);
    fields.insert("ver", 1u32.to_le_bytes().to_vec());
    fields.insert("chunk_pos", chunk_pos.to_le_bytes().to_vec());
    fields.insert("start_time", time_to_bytes(ns_to_time(start)));
    fields.insert("end_time", time_to_bytes(ns_to_time(end)));
    fields.insert("count", (indexes.len() as u32).to_le_bytes().to_vec());
    write_header(&mut body, &fields);
    write_u32(&mut body, (indexes.len() * 8) as u32);
    for (conn, entries) in &indexes {
        write_u32(&mut body, *conn);
        write_u32(&mut body, entries.len() as u32);
    }

    let mut out = BufWriter::new(File::create(path)?);
    out.write_all(&file_header(connections.len() as u32, 1, index_pos))?;
    out.write_all(&body)?;
    out.flush()
}

/// Version line plus bag header record, padded to 4096 bytes.
fn file_header(conn_count: u32, chunk_count: u32, index_pos: u64) -> Vec<u8> {
    let mut buffer = b"#ROSBAG V2.0\n".to_vec();
    let version_len = buffer.len();

    let mut fields = BTreeMap::new();
    fields.insert("op", vec![OP_BAG_HEADER]);
    fields.insert("index_pos", index_pos.to_le_bytes().to_vec());
    fields.insert("conn_count", conn_count.to_le_bytes().to_vec());
    fields.insert("chunk_count", chunk_count.to_le_bytes().to_vec());
    let header_len = write_header(&mut buffer, &fields);

    let padding = 4096 - version_len - 4 - header_len - 4;
    write_u32(&mut buffer, padding as u32);
    buffer.resize(buffer.len() + padding, b' ');
    buffer
}

fn write_connection_record(buffer: &mut Vec<u8>, id: u32, conn: &BagConnection) {
    let mut fields = BTreeMap::new();
    fields.insert("op", vec![OP_CONNECTION]);
    fields.insert("conn", id.to_le_bytes().to_vec());
    fields.insert("topic", conn.topic.as_bytes().to_vec());
    write_header(buffer, &fields);

    let mut data = BTreeMap::new();
    data.insert("topic", conn.topic.as_bytes().to_vec());
    data.insert("type", conn.type_name.as_bytes().to_vec());
    data.insert("md5sum", conn.md5sum.as_bytes().to_vec());
    data.insert("message_definition", conn.definition.as_bytes().to_vec());
    data.insert("callerid", b"/test_node".to_vec());
    data.insert("latching", b"0".to_vec());
    write_header(buffer, &data);
}

/// Write `key=value` header fields with their length prefixes. Returns the
/// header length without its own prefix.
fn write_header(buffer: &mut Vec<u8>, fields: &BTreeMap<&str, Vec<u8>>) -> usize {
    let mut header = Vec::new();
    for (key, value) in fields {
        write_u32(&mut header, (key.len() + 1 + value.len()) as u32);
        header.extend_from_slice(key.as_bytes());
        header.push(b'=');
        header.extend_from_slice(value);
    }
    write_u32(buffer, header.len() as u32);
    buffer.extend_from_slice(&header);
    header.len()
}

fn write_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_le_bytes());
}

fn ns_to_time(ns: u64) -> (u32, u32) {
    ((ns / 1_000_000_000) as u32, (ns % 1_000_000_000) as u32)
}

fn time_to_bytes(time: (u32, u32)) -> Vec<u8> {
    let mut bytes = time.0.to_le_bytes().to_vec();
    bytes.extend_from_slice(&time.1.to_le_bytes());
    bytes
}
