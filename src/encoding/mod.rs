// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Message decoding implementations.
//!
//! - [`ros1`] - ROS1 serialization, decoded against a resolved layout

pub mod ros1;

pub use ros1::{FieldValue, Ros1Decoder};
