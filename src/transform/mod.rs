// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-load transformations applied while flattening records.
//!
//! - [`RenameRules`] rewrites field paths before they become series keys
//! - [`ArrayPolicy`] decides which array elements are expanded

pub mod array_policy;
pub mod rename;

use std::fmt;

pub use array_policy::{ArrayPolicy, DEFAULT_MAX_ARRAY_SIZE};
pub use rename::{RenameRules, RuleSpec};

/// Error types for transformations.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformError {
    /// Invalid renaming rule
    InvalidRule {
        /// The rule pattern
        rule: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// Rules document could not be parsed
    Format {
        /// Parser message
        message: String,
    },

    /// Rules file could not be read
    Io {
        /// File path
        path: String,
        /// Error description
        message: String,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformError::InvalidRule { rule, reason } => {
                write!(f, "Invalid rule '{rule}': {reason}")
            }
            TransformError::Format { message } => {
                write!(f, "Invalid rules document: {message}")
            }
            TransformError::Io { path, message } => {
                write!(f, "Cannot read rules file '{path}': {message}")
            }
        }
    }
}

impl std::error::Error for TransformError {}
