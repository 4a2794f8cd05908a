// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI subcommands.

mod extract;
mod save_config;
mod schema;
mod topics;

pub use extract::ExtractCmd;
pub use save_config::SaveConfigCmd;
pub use schema::SchemaCmd;
pub use topics::TopicsCmd;
