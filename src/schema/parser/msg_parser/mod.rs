// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! MSG format parser using Pest.
//!
//! This module handles parsing of ROS1 .msg definitions as stored in bag
//! connection records.
//!
//! The format supports:
//! - Simple field lists (root message)
//! - Dependency blocks with "MSG: TypeName" headers
//! - Array types: T[] (length-prefixed) or T[n] (fixed)
//! - Nested types: package/MessageName
//! - Constants (`TYPE NAME=VALUE`), which occupy no bytes and are dropped
//! - Comments (# style)

use crate::core::CodecError;
use crate::core::Result as CoreResult;
use crate::schema::ast::{Field, FieldType, MessageSchema, MessageType, PrimitiveType};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

/// Pest parser for ROS .msg schema files.
#[derive(Parser)]
#[grammar = "schema/parser/msg_parser/msg.pest"] // Path relative to src/ directory
pub struct MsgParser;

/// Parse a ROS1 .msg definition into a [`MessageSchema`].
///
/// The root field list becomes the type called `name`; every dependency
/// block becomes a type named by its `MSG:` header.
pub fn parse(name: &str, definition: &str) -> CoreResult<MessageSchema> {
    let pairs = MsgParser::parse(Rule::schema, definition)
        .map_err(|e| CodecError::malformed_schema(name, format!("{e}")))?;

    let mut schema = MessageSchema::new(name.to_string());

    for pair in pairs {
        // schema = SOI ~ root_msg ~ (separator ~ dependency_msg)* ~ EOI
        for item in pair.into_inner() {
            match item.as_rule() {
                Rule::root_msg => {
                    let mut msg_type = MessageType::new(name.to_string());
                    for line in item.into_inner() {
                        if let Some(field) = parse_field(name, line)? {
                            msg_type.add_field(field);
                        }
                    }
                    schema.add_type(msg_type);
                }
                Rule::dependency_msg => {
                    let mut inner = item.into_inner();
                    let type_name = inner
                        .next()
                        .and_then(|header| header.into_inner().next())
                        .map(|t| t.as_str().to_string())
                        .ok_or_else(|| CodecError::malformed_schema(name, "empty MSG header"))?;

                    let mut msg_type = MessageType::new(type_name);
                    for line in inner {
                        if let Some(field) = parse_field(name, line)? {
                            msg_type.add_field(field);
                        }
                    }
                    schema.add_type(msg_type);
                }
                _ => {}
            }
        }
    }

    Ok(schema)
}

/// Turn a `field` pair into a [`Field`]. Constants yield `None`.
fn parse_field(schema_name: &str, pair: Pair<Rule>) -> CoreResult<Option<Field>> {
    if pair.as_rule() != Rule::field {
        return Ok(None);
    }

    let mut inner = pair.into_inner();
    let (Some(type_pair), Some(name_pair)) = (inner.next(), inner.next()) else {
        return Err(CodecError::malformed_schema(
            schema_name,
            "field declaration without type or name",
        ));
    };

    let mut type_parts = type_pair.into_inner();
    let base = type_parts
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default();

    let array = match type_parts.next() {
        Some(suffix) => {
            let size = match suffix.into_inner().next() {
                Some(digits) => Some(digits.as_str().parse::<usize>().map_err(|e| {
                    CodecError::malformed_schema(
                        schema_name,
                        format!("bad array size '{}': {e}", digits.as_str()),
                    )
                })?),
                None => None,
            };
            Some(size)
        }
        None => None,
    };

    Ok(Some(Field {
        name: name_pair.as_str().to_string(),
        type_name: build_field_type(&base, array),
    }))
}

/// Build a FieldType from a base type string and array info.
fn build_field_type(base_type_str: &str, array: Option<Option<usize>>) -> FieldType {
    let base = match PrimitiveType::try_from_str(base_type_str) {
        Some(prim) => FieldType::Primitive(prim),
        None => FieldType::Nested(base_type_str.to_string()),
    };

    match array {
        Some(size) => FieldType::Array {
            base_type: Box::new(base),
            size,
        },
        None => base,
    }
}
