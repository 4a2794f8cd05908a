// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema-driven ROS1 record decoder.
//!
//! Walks a [`MessageLayout`] depth-first and reports every scalar together
//! with its field path. Nothing is known about the message type at compile
//! time: paths are built while walking.
//!
//! Path syntax: nested fields join with `.`, array elements append `[i]`,
//! e.g. `poses[1].position.x`.

use std::fmt::Write as _;

use crate::core::{CodecError, Result as CoreResult, Scalar};
use crate::schema::{ArrayLength, FieldKind, MessageLayout, PrimitiveType};
use crate::transform::ArrayPolicy;

use super::cursor::Ros1Buffer;

/// Maximum allowed array length to prevent runaway loops on corrupt data.
const MAX_ARRAY_LENGTH: usize = 10_000_000;

/// One decoded scalar and where it lives in the record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    /// Field path, e.g. `pose.position.x`
    pub path: String,
    /// Decoded value
    pub value: Scalar,
}

impl FieldValue {
    /// Create a field value.
    pub fn new(path: impl Into<String>, value: Scalar) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

/// ROS1 decoder bound to one array policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ros1Decoder {
    policy: ArrayPolicy,
}

impl Ros1Decoder {
    /// Create a decoder applying `policy` to every array.
    pub fn new(policy: ArrayPolicy) -> Self {
        Self { policy }
    }

    /// Decode a record into an ordered list of field values.
    pub fn decode(&self, layout: &MessageLayout, data: &[u8]) -> CoreResult<Vec<FieldValue>> {
        let mut values = Vec::new();
        self.decode_with(layout, data, |path, value| {
            values.push(FieldValue::new(path, value));
        })?;
        Ok(values)
    }

    /// Decode a record, handing each value to `sink` as soon as it is read.
    ///
    /// Returns the position just past the last byte consumed. On error the
    /// sink may already have seen part of the record; callers that need all
    /// or nothing should buffer.
    pub fn decode_with<F>(&self, layout: &MessageLayout, data: &[u8], mut sink: F) -> CoreResult<usize>
    where
        F: FnMut(&str, Scalar),
    {
        let buf = Ros1Buffer::new(data);
        let mut path = String::with_capacity(64);
        self.walk_message(buf, layout, 0, &mut path, true, &mut sink)
    }

    fn walk_message<F>(
        &self,
        buf: Ros1Buffer<'_>,
        layout: &MessageLayout,
        mut pos: usize,
        path: &mut String,
        emit: bool,
        sink: &mut F,
    ) -> CoreResult<usize>
    where
        F: FnMut(&str, Scalar),
    {
        if !emit {
            if let Some(size) = layout.fixed_size {
                return buf.skip(pos, size);
            }
        }

        for field in &layout.fields {
            let mark = path.len();
            if emit {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&field.name);
            }
            pos = self.walk_kind(buf, &field.kind, pos, path, emit, sink)?;
            path.truncate(mark);
        }
        Ok(pos)
    }

    fn walk_kind<F>(
        &self,
        buf: Ros1Buffer<'_>,
        kind: &FieldKind,
        pos: usize,
        path: &mut String,
        emit: bool,
        sink: &mut F,
    ) -> CoreResult<usize>
    where
        F: FnMut(&str, Scalar),
    {
        match kind {
            FieldKind::Primitive(prim) => {
                if emit {
                    let (value, next) = buf.read_primitive(pos, *prim)?;
                    sink(path.as_str(), value);
                    Ok(next)
                } else {
                    buf.skip_primitive(pos, *prim)
                }
            }
            FieldKind::Message(nested) => self.walk_message(buf, nested, pos, path, emit, sink),
            FieldKind::Array { element, length } => {
                let (count, mut pos) = match length {
                    ArrayLength::Fixed(n) => (*n, pos),
                    ArrayLength::Prefixed => {
                        let (n, next) = buf.read_u32(pos)?;
                        (n as usize, next)
                    }
                };
                check_count(buf, element, count, pos)?;

                let mut index = 0;
                while emit && index < count && self.policy.should_expand(count, index) {
                    let mark = path.len();
                    let _ = write!(path, "[{index}]");
                    pos = self.walk_kind(buf, element, pos, path, true, sink)?;
                    path.truncate(mark);
                    index += 1;
                }

                // Dropped elements still occupy bytes.
                let rest = count - index;
                if rest == 0 {
                    return Ok(pos);
                }
                match element.fixed_size() {
                    Some(size) => {
                        let total = size.checked_mul(rest).ok_or_else(|| {
                            CodecError::length_exceeded(count, pos, buf.len())
                        })?;
                        buf.skip(pos, total)
                    }
                    None => {
                        for _ in 0..rest {
                            pos = self.walk_kind(buf, element, pos, path, false, sink)?;
                        }
                        Ok(pos)
                    }
                }
            }
        }
    }
}

/// Reject element counts that cannot fit in the bytes left.
fn check_count(buf: Ros1Buffer<'_>, element: &FieldKind, count: usize, pos: usize) -> CoreResult<()> {
    if count > MAX_ARRAY_LENGTH {
        return Err(CodecError::length_exceeded(count, pos, buf.len()));
    }
    let min = min_size(element);
    if min > 0 && count.saturating_mul(min) > buf.remaining(pos) {
        return Err(CodecError::length_exceeded(count, pos, buf.len()));
    }
    Ok(())
}

/// Smallest number of bytes one value of `kind` can occupy.
fn min_size(kind: &FieldKind) -> usize {
    match kind {
        FieldKind::Primitive(PrimitiveType::String) => 4,
        FieldKind::Primitive(p) => p.size().unwrap_or(0),
        FieldKind::Message(layout) => layout
            .fixed_size
            .unwrap_or_else(|| layout.fields.iter().map(|f| min_size(&f.kind)).sum()),
        FieldKind::Array {
            length: ArrayLength::Prefixed,
            ..
        } => 4,
        FieldKind::Array {
            element,
            length: ArrayLength::Fixed(n),
        } => min_size(element).saturating_mul(*n),
    }
}
