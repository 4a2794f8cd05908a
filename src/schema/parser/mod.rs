// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parser implementations.

pub mod msg_parser;

use crate::core::Result;
use crate::schema::MessageSchema;

/// Parse a schema from a string.
///
/// # Arguments
///
/// * `name` - Message type name (e.g. "geometry_msgs/PoseStamped")
/// * `definition` - Schema definition string
///
/// # Returns
///
/// Parsed `MessageSchema`, or `CodecError::MalformedSchema` when the text
/// cannot be tokenized.
pub fn parse_schema(name: &str, definition: &str) -> Result<MessageSchema> {
    msg_parser::parse(name, definition)
}
