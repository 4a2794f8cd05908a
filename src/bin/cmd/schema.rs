// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema command - show the resolved layout of a channel.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;

use crate::common::{open_reader, Result};
use bagseries::schema::parse_layout;

/// Show the field layout of one channel.
#[derive(Args, Clone, Debug)]
pub struct SchemaCmd {
    /// Input file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Channel to show
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Print the raw definition text as well
    #[arg(long)]
    definition: bool,
}

impl SchemaCmd {
    pub fn run(self) -> Result<()> {
        let reader = open_reader(&self.input)?;
        let conn = reader
            .connection(&self.topic)
            .ok_or_else(|| anyhow!("Topic not found: {}", self.topic))?;

        println!("Topic: {}", conn.channel);
        println!("Type: {}", conn.type_name);
        println!("Checksum: {}", conn.checksum);
        if let Some(caller_id) = &conn.caller_id {
            println!("Caller: {caller_id}");
        }

        if self.definition {
            println!();
            println!("{}", conn.definition.trim_end());
        }

        let layout = parse_layout(&conn.type_name, &conn.definition)?;
        println!();
        print!("{layout}");
        match layout.fixed_size {
            Some(size) => println!("Fixed size: {size} bytes"),
            None => println!("Variable size"),
        }

        Ok(())
    }
}
