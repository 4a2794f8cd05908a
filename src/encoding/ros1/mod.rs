// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! ROS1 serialization.
//!
//! This module provides:
//! - [`cursor`] - Positional little-endian reads with bounds checking
//! - [`decoder`] - Layout-driven decoding into flat field values

pub mod cursor;
pub mod decoder;

pub use cursor::Ros1Buffer;
pub use decoder::{FieldValue, Ros1Decoder};
