// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Extract command - load a container into time series.

use std::path::PathBuf;

use anyhow::anyhow;
use clap::Args;
use serde::Serialize;

use crate::common::{
    format_duration, format_timestamp, open_reader, parse_topics, ProgressBar, Result,
};
use bagseries::config::{ChannelSelector, LoaderConfig, PersistedConfig};
use bagseries::series::ScalarSeries;
use bagseries::session::{LoadOutcome, LoadReport, LoadSummary, Loader};
use bagseries::transform::{RenameRules, DEFAULT_MAX_ARRAY_SIZE};

/// Loader settings shared by `extract` and `save-config`.
#[derive(Args, Clone, Debug)]
pub struct LoadArgs {
    /// Comma-separated topics to load (default: all)
    #[arg(short, long, value_name = "TOPICS")]
    topics: Option<String>,

    /// Expand at most this many elements per array
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ARRAY_SIZE)]
    max_array_size: usize,

    /// Truncate arrays over the limit instead of dropping them
    #[arg(long)]
    keep_large_arrays: bool,

    /// Use header.stamp as the timestamp when present
    #[arg(long)]
    header_stamp: bool,

    /// Do not apply renaming rules
    #[arg(long)]
    no_rename: bool,
}

impl LoadArgs {
    /// Settings from the flags, selecting `channels` when no topics were given.
    pub fn to_config(&self, channels: &[(String, String)]) -> LoaderConfig {
        let selected_topics = match &self.topics {
            Some(list) => parse_topics(list),
            None => channels.iter().map(|(name, _)| name.clone()).collect(),
        };
        LoaderConfig {
            selected_topics,
            use_header_stamp: self.header_stamp,
            use_renaming_rules: !self.no_rename,
            max_array_size: self.max_array_size,
            discard_large_arrays: !self.keep_large_arrays,
        }
    }
}

/// Selector answering from the command line flags.
struct FlagSelector<'a>(&'a LoadArgs);

impl ChannelSelector for FlagSelector<'_> {
    fn select(&mut self, channels: &[(String, String)], _defaults: &LoaderConfig) -> Option<LoaderConfig> {
        let config = self.0.to_config(channels);
        for topic in &config.selected_topics {
            if !channels.iter().any(|(name, _)| name == topic) {
                tracing::warn!(topic = %topic, "selected topic is not in the container");
            }
        }
        Some(config)
    }
}

/// Load a container and print the resulting series.
#[derive(Args, Clone, Debug)]
pub struct ExtractCmd {
    /// Input file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    #[command(flatten)]
    load: LoadArgs,

    /// Persisted configuration document (TOML or JSON); overrides the flags
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Renaming rules file (TOML)
    #[arg(short, long, value_name = "FILE")]
    rules: Option<PathBuf>,

    /// Use bare field paths as series names
    #[arg(long)]
    no_channel_prefix: bool,

    /// Dump every series as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonDump<'a> {
    summary: JsonSummary,
    series: Vec<&'a ScalarSeries>,
}

#[derive(Serialize)]
struct JsonSummary {
    records_read: u64,
    records_decoded: u64,
    decode_failures: u64,
    skipped_channels: Vec<String>,
    cancelled: bool,
    elapsed_ms: u64,
}

impl From<&LoadSummary> for JsonSummary {
    fn from(summary: &LoadSummary) -> Self {
        Self {
            records_read: summary.records_read,
            records_decoded: summary.records_decoded,
            decode_failures: summary.decode_failures,
            skipped_channels: summary
                .skipped_channels
                .iter()
                .map(|s| s.channel.clone())
                .collect(),
            cancelled: summary.cancelled,
            elapsed_ms: summary.elapsed.as_millis() as u64,
        }
    }
}

impl ExtractCmd {
    pub fn run(self) -> Result<()> {
        let rules = match &self.rules {
            Some(path) => RenameRules::from_file(path)?,
            None => RenameRules::new(),
        };
        let persisted = self.config.as_ref().map(PersistedConfig::load).transpose()?;

        let loader = Loader::new()
            .with_rules(rules)
            .with_channel_prefix(!self.no_channel_prefix);

        let reader = open_reader(&self.input)?;
        let mut progress = ProgressBar::new("extract");
        let outcome = loader.load(
            reader.as_ref(),
            persisted.as_ref(),
            &mut FlagSelector(&self.load),
            &mut progress,
        )?;
        let report = match outcome {
            LoadOutcome::Loaded(report) => report,
            LoadOutcome::Declined => return Err(anyhow!("No topics selected")),
        };
        progress.finish_with_message(format!("{} series", report.series.len()));

        if self.json {
            let dump = JsonDump {
                summary: JsonSummary::from(&report.summary),
                series: report.series.iter().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&dump)?);
        } else {
            print_report(&report);
        }

        Ok(())
    }
}

fn print_report(report: &LoadReport) {
    let summary = &report.summary;
    println!("=== Series ({}) ===", report.series.len());
    for series in &report.series {
        let last = series
            .points()
            .last()
            .map(|p| p.value.to_string())
            .unwrap_or_default();
        match series.time_range() {
            Some((start, end)) => println!(
                "  {} | {} points | {} .. {} | last = {}",
                series.name(),
                series.len(),
                format_timestamp(start),
                format_timestamp(end),
                last
            ),
            None => println!("  {} | empty", series.name()),
        }
    }

    println!();
    println!("Channels:");
    for raw in &report.raw {
        println!("  {} | {} records", raw.name(), raw.len());
    }

    println!();
    println!(
        "Records: {} read, {} decoded, {} failed",
        summary.records_read, summary.records_decoded, summary.decode_failures
    );
    for skipped in &summary.skipped_channels {
        println!("Skipped: {} ({})", skipped.channel, skipped.error);
    }
    if summary.cancelled {
        println!("Cancelled: results are partial");
    }
    println!("Elapsed: {}", format_duration(summary.elapsed));
}
