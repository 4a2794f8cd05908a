// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Bagseries CLI
//!
//! Decode ROS1 bag files into flattened time series.
//!
//! ## Usage
//!
//! ```sh
//! # List topics
//! bagseries topics run.bag
//!
//! # Show the field layout of a topic
//! bagseries schema run.bag /odom
//!
//! # Extract series for two topics, truncating large arrays
//! bagseries extract run.bag --topics /odom,/imu --keep-large-arrays
//!
//! # Save the settings for later loads
//! bagseries save-config load.toml --topics /odom --header-stamp
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{ExtractCmd, SaveConfigCmd, SchemaCmd, TopicsCmd};
use common::Result;

/// Bagseries - ROS1 bag to time series
///
/// Message definitions are read from the bag itself, so any message type
/// can be decoded without generated code.
#[derive(Parser, Clone)]
#[command(name = "bagseries")]
#[command(about = "Decode ROS1 bag files into flattened time series", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// List topics with type, checksum and record count
    Topics(TopicsCmd),

    /// Show the resolved field layout of a topic
    Schema(SchemaCmd),

    /// Load topics into time series and print them
    Extract(ExtractCmd),

    /// Write a persisted configuration document
    SaveConfig(SaveConfigCmd),
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    common::init_tracing();

    match cli.command {
        Commands::Topics(cmd) => cmd.run(),
        Commands::Schema(cmd) => cmd.run(),
        Commands::Extract(cmd) => cmd.run(),
        Commands::SaveConfig(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
