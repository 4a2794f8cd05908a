// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout bagseries.
//!
//! This module provides the foundational types for the library:
//! - [`CodecError`] - Schema and decode error handling
//! - [`Scalar`] - Decoded leaf value
//! - [`SchemaRegistry`] - Per-channel schema registry

pub mod error;
pub mod registry;
pub mod value;

pub use error::{CodecError, Result};
pub use registry::{ChannelSchema, SchemaHandle, SchemaRegistry, SchemaSnapshot};
pub use value::{Scalar, NANOS_PER_SEC};
