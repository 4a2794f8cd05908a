// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Container file formats.
//!
//! - [`bag`]: ROS1 bag format support

pub mod bag;
