// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema parsing for ROS1 message definitions.
//!
//! Text goes through two pure steps:
//! - [`parse_schema`] tokenizes `.msg` text into an AST ([`MessageSchema`])
//! - [`layout::resolve`] links nested type names into a [`MessageLayout`] tree

pub mod ast;
pub mod layout;
pub mod parser;

pub use ast::{Field, FieldType, MessageSchema, MessageType, PrimitiveType};
pub use layout::{ArrayLength, FieldKind, FieldLayout, MessageLayout};
pub use parser::{msg_parser, parse_schema};

use std::sync::Arc;

use crate::core::Result;

/// Parse and resolve a definition in one step.
pub fn parse_layout(type_name: &str, definition: &str) -> Result<Arc<MessageLayout>> {
    let schema = parse_schema(type_name, definition)?;
    layout::resolve(&schema)
}
