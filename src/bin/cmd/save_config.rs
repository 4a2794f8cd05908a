// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Save-config command - write a persisted configuration document.

use std::path::PathBuf;

use clap::Args;

use super::extract::LoadArgs;
use crate::common::{open_reader, Result};
use bagseries::config::PersistedConfig;
use bagseries::session::channel_list;

/// Write the configuration the flags describe.
#[derive(Args, Clone, Debug)]
pub struct SaveConfigCmd {
    /// Output document (`.json` for JSON, TOML otherwise)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Container whose topics are selected when --topics is not given
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    load: LoadArgs,
}

impl SaveConfigCmd {
    pub fn run(self) -> Result<()> {
        let channels = match &self.input {
            Some(path) => channel_list(open_reader(path)?.as_ref()),
            None => Vec::new(),
        };
        let config = self.load.to_config(&channels);
        PersistedConfig::from(&config).save(&self.output)?;

        println!(
            "Wrote {} ({} topics)",
            self.output.display(),
            config.selected_topics.len()
        );
        Ok(())
    }
}
