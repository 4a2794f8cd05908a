// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Resolved field layouts.
//!
//! A [`MessageLayout`] is the decoder's view of a schema: every nested type
//! reference has been looked up and replaced by a shared pointer to its own
//! layout, so decoding never touches type names.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{CodecError, Result};
use crate::schema::ast::{FieldType, MessageSchema, PrimitiveType};

/// Resolved layout of one message type.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLayout {
    /// Fully-qualified type name
    pub type_name: String,
    /// Fields in wire order
    pub fields: Vec<FieldLayout>,
    /// Encoded size when every field has a fixed width
    pub fixed_size: Option<usize>,
}

/// One field of a [`MessageLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    /// Field name, used as a path segment
    pub name: String,
    /// What the field holds
    pub kind: FieldKind,
}

/// Tagged field kind driving the decode dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Fixed-width or length-prefixed scalar
    Primitive(PrimitiveType),
    /// Nested message
    Message(Arc<MessageLayout>),
    /// Array of primitives or messages
    Array {
        /// Element kind
        element: Box<FieldKind>,
        /// How the element count is obtained
        length: ArrayLength,
    },
}

/// Array length mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLength {
    /// Count declared in the schema (`T[N]`)
    Fixed(usize),
    /// Count read as a `u32` prefix from the buffer (`T[]`)
    Prefixed,
}

impl FieldKind {
    /// Encoded size in bytes, if it does not depend on the data.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldKind::Primitive(p) => p.size(),
            FieldKind::Message(layout) => layout.fixed_size,
            FieldKind::Array {
                element,
                length: ArrayLength::Fixed(n),
            } => element.fixed_size().and_then(|s| s.checked_mul(*n)),
            FieldKind::Array {
                length: ArrayLength::Prefixed,
                ..
            } => None,
        }
    }

    /// Type name as it would be written in `.msg` text.
    pub fn type_label(&self) -> String {
        match self {
            FieldKind::Primitive(p) => p.as_str().to_string(),
            FieldKind::Message(layout) => layout.type_name.clone(),
            FieldKind::Array {
                element,
                length: ArrayLength::Fixed(n),
            } => format!("{}[{n}]", element.type_label()),
            FieldKind::Array {
                element,
                length: ArrayLength::Prefixed,
            } => format!("{}[]", element.type_label()),
        }
    }
}

/// Resolve the root type of `schema` into a layout tree.
///
/// Fails with `MalformedSchema` when a nested type is unknown or when a type
/// contains itself, directly or through other types.
pub fn resolve(schema: &MessageSchema) -> Result<Arc<MessageLayout>> {
    let mut resolver = Resolver {
        schema,
        done: HashMap::new(),
        stack: Vec::new(),
    };
    resolver.resolve_type(&schema.name)
}

struct Resolver<'a> {
    schema: &'a MessageSchema,
    done: HashMap<String, Arc<MessageLayout>>,
    stack: Vec<String>,
}

impl Resolver<'_> {
    fn resolve_type(&mut self, type_name: &str) -> Result<Arc<MessageLayout>> {
        if let Some(layout) = self.done.get(type_name) {
            return Ok(Arc::clone(layout));
        }

        if self.stack.iter().any(|t| t == type_name) {
            let mut chain = self.stack.clone();
            chain.push(type_name.to_string());
            return Err(CodecError::malformed_schema(
                &self.schema.name,
                format!("circular type reference: {}", chain.join(" -> ")),
            ));
        }

        let msg_type = self
            .schema
            .get_type(type_name)
            .ok_or_else(|| CodecError::type_not_found(type_name))?;

        self.stack.push(type_name.to_string());
        let mut fields = Vec::with_capacity(msg_type.fields.len());
        for field in &msg_type.fields {
            let kind = self.resolve_field(&field.type_name, type_name)?;
            fields.push(FieldLayout {
                name: field.name.clone(),
                kind,
            });
        }
        self.stack.pop();

        let fixed_size = fields
            .iter()
            .try_fold(0usize, |acc, f| acc.checked_add(f.kind.fixed_size()?));

        let layout = Arc::new(MessageLayout {
            type_name: type_name.to_string(),
            fields,
            fixed_size,
        });
        self.done.insert(type_name.to_string(), Arc::clone(&layout));
        Ok(layout)
    }

    fn resolve_field(&mut self, field_type: &FieldType, declared_in: &str) -> Result<FieldKind> {
        match field_type {
            FieldType::Primitive(p) => Ok(FieldKind::Primitive(*p)),
            FieldType::Nested(name) => {
                let target = self
                    .schema
                    .resolve_type(name, declared_in)
                    .map(|t| t.name.clone())
                    .ok_or_else(|| {
                        CodecError::malformed_schema(
                            &self.schema.name,
                            format!("unknown type '{name}' in '{declared_in}'"),
                        )
                    })?;
                Ok(FieldKind::Message(self.resolve_type(&target)?))
            }
            FieldType::Array { base_type, size } => {
                let element = self.resolve_field(base_type, declared_in)?;
                Ok(FieldKind::Array {
                    element: Box::new(element),
                    length: match size {
                        Some(n) => ArrayLength::Fixed(*n),
                        None => ArrayLength::Prefixed,
                    },
                })
            }
        }
    }
}

impl MessageLayout {
    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for field in &self.fields {
            writeln!(
                f,
                "{:indent$}{} {}",
                "",
                field.kind.type_label(),
                field.name,
                indent = depth * 2
            )?;
            let mut kind = &field.kind;
            while let FieldKind::Array { element, .. } = kind {
                kind = element;
            }
            if let FieldKind::Message(nested) = kind {
                nested.write_tree(f, depth + 1)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for MessageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.type_name)?;
        self.write_tree(f, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_schema;

    const POSE_STAMPED: &str = "Header header\nPose pose\n\
===\nMSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id\n\
===\nMSG: geometry_msgs/Pose\nPoint position\nfloat64[4] orientation\n\
===\nMSG: geometry_msgs/Point\nfloat64 x\nfloat64 y\nfloat64 z\n";

    #[test]
    fn test_resolve_nested() {
        let schema = parse_schema("geometry_msgs/PoseStamped", POSE_STAMPED).unwrap();
        let layout = resolve(&schema).unwrap();

        assert_eq!(layout.fields.len(), 2);
        let FieldKind::Message(header) = &layout.fields[0].kind else {
            panic!("header should be a message");
        };
        assert_eq!(header.type_name, "std_msgs/Header");
        assert_eq!(header.fixed_size, None);

        let FieldKind::Message(pose) = &layout.fields[1].kind else {
            panic!("pose should be a message");
        };
        assert_eq!(pose.fixed_size, Some(24 + 32));
        assert_eq!(layout.fixed_size, None);
    }

    #[test]
    fn test_unknown_type_is_malformed() {
        let schema = parse_schema("a/Msg", "Missing m").unwrap();
        let err = resolve(&schema).unwrap_err();
        assert!(matches!(err, CodecError::MalformedSchema { .. }));
        assert!(err.to_string().contains("unknown type 'Missing'"));
    }

    #[test]
    fn test_circular_reference_is_malformed() {
        let def = "b/Node next\n===\nMSG: b/Node\nb/Loop inner\n===\nMSG: b/Loop\nb/Node back\n";
        let schema = parse_schema("a/Msg", def).unwrap();
        let err = resolve(&schema).unwrap_err();
        assert!(err.to_string().contains("circular"), "{err}");
    }

    #[test]
    fn test_shared_type_is_not_circular() {
        let def = "Point a\nPoint b\n===\nMSG: geometry_msgs/Point\nfloat64 x\n";
        let schema = parse_schema("geometry_msgs/Pair", def).unwrap();
        let layout = resolve(&schema).unwrap();
        assert_eq!(layout.fixed_size, Some(16));
    }

    #[test]
    fn test_display_tree() {
        let schema = parse_schema("geometry_msgs/PoseStamped", POSE_STAMPED).unwrap();
        let text = resolve(&schema).unwrap().to_string();
        assert!(text.starts_with("geometry_msgs/PoseStamped\n"));
        assert!(text.contains("  geometry_msgs/Pose pose\n"));
        assert!(text.contains("    float64[4] orientation\n"));
    }
}
