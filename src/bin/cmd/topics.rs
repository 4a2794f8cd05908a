// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Topics command - list the channels of a container.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use crate::common::{open_reader, Result};
use bagseries::io::TopicFilter;

/// List channels with type, checksum and record count.
#[derive(Args, Clone, Debug)]
pub struct TopicsCmd {
    /// Input file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct TopicRow<'a> {
    topic: &'a str,
    type_name: &'a str,
    checksum: &'a str,
    records: u64,
}

impl TopicsCmd {
    pub fn run(self) -> Result<()> {
        let reader = open_reader(&self.input)?;

        let rows: Vec<TopicRow<'_>> = reader
            .connections()
            .iter()
            .map(|conn| TopicRow {
                topic: &conn.channel,
                type_name: &conn.type_name,
                checksum: &conn.checksum,
                records: reader.record_count(&TopicFilter::include([conn.channel.as_str()])),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        println!("=== Topics in {} ===", self.input.display());
        println!();
        for row in &rows {
            println!("Topic: {}", row.topic);
            println!("  Type: {}", row.type_name);
            println!("  Checksum: {}", row.checksum);
            println!("  Records: {}", row.records);
        }
        println!();
        println!("Total: {} topics", rows.len());

        Ok(())
    }
}
