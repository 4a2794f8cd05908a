// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Bagseries
//!
//! Schema-driven decoding of ROS1 bag files into flattened time series.
//!
//! Every channel in a bag carries its own message definition. This library
//! parses those definitions at load time, decodes each record without any
//! compile-time message type, and appends every scalar to a series keyed by
//! its field path (e.g. `pose.position.x`, `ranges[3]`).
//!
//! ## Architecture
//!
//! - `core/` - Error type, decoded scalar values, schema registry
//! - `schema/` - `.msg` parsing and layout resolution
//! - `encoding/` - ROS1 binary decoding
//! - `transform/` - Path renaming rules and array size policy
//! - `io/` - Container readers (ROS1 bag, in-memory)
//! - `series/` - Series storage and the record extractor
//! - `config` / `session` - Loader settings and the end-to-end load
//!
//! ## Example: Loading a bag
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bagseries::config::SelectAll;
//! use bagseries::session::Loader;
//!
//! let loader = Loader::new();
//! if let Some(report) = loader.load_path("run.bag", None, &mut SelectAll, &mut ())?.report() {
//!     for series in &report.series {
//!         println!("{}: {} points", series.name(), series.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

pub use core::{CodecError, Result, Scalar, SchemaHandle, SchemaRegistry};

// Decoding
pub mod encoding;

// Schema parsing
pub mod schema;

// Renaming rules and array policy
pub mod transform;

pub use transform::{ArrayPolicy, RenameRules, TransformError};

// Container I/O
pub mod io;

pub use io::{BagContainer, ContainerReader, MemoryContainer, RawRecord};

// Series and extraction
pub mod series;

pub use series::{ExtractOptions, Extractor, Series, SeriesMap};

// Load configuration and sessions
pub mod config;
pub mod session;

pub use config::{ChannelSelector, LoaderConfig, PersistedConfig};
pub use session::{LoadError, LoadOutcome, LoadReport, LoadSummary, Loader};
