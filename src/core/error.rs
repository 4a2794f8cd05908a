// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for bagseries.
//!
//! Provides error types for schema and record handling:
//! - Schema text parsing and type resolution
//! - Record decoding (truncated buffers, oversized lengths)

use std::fmt;

/// Errors that can occur while parsing schemas or decoding records.
#[derive(Debug, Clone, PartialEq)]
pub enum CodecError {
    /// Schema text cannot be turned into a field layout
    MalformedSchema {
        /// Schema name or identifier
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// Type not found in schema
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Buffer too short for requested read
    TruncatedBuffer {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Array or string length prefix exceeds data bounds
    LengthExceeded {
        /// Length that was read
        length: usize,
        /// Position in buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },

    /// Other error
    Other(String),
}

impl CodecError {
    /// Create a malformed schema error.
    pub fn malformed_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::MalformedSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        CodecError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a truncated buffer error.
    pub fn truncated(requested: usize, available: usize, cursor_pos: u64) -> Self {
        CodecError::TruncatedBuffer {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        CodecError::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Whether this error is local to one record (the load may continue).
    pub fn is_record_local(&self) -> bool {
        matches!(
            self,
            CodecError::TruncatedBuffer { .. } | CodecError::LengthExceeded { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::MalformedSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            CodecError::TypeNotFound { type_name } => vec![("type", type_name.clone())],
            CodecError::TruncatedBuffer {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            CodecError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => vec![
                ("length", length.to_string()),
                ("position", position.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
            CodecError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::MalformedSchema {
                schema_name,
                reason,
            } => {
                write!(f, "Malformed schema '{schema_name}': {reason}")
            }
            CodecError::TypeNotFound { type_name } => {
                write!(f, "Type not found: '{type_name}'")
            }
            CodecError::TruncatedBuffer {
                requested,
                available,
                cursor_pos,
            } => write!(
                f,
                "Truncated buffer: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
            ),
            CodecError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => write!(
                f,
                "Length {length} exceeds buffer at position {position} (buffer length: {buffer_len})"
            ),
            CodecError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Result type for bagseries codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
