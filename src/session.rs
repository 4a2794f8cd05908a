// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! One file load, end to end.
//!
//! A load opens the container, resets the schema registry and registers
//! every channel, resolves the configuration, then streams the selected
//! records through the extractor. Channels with a malformed schema are
//! skipped and reported; records that fail to decode are counted and
//! reported. Only a container failure, or a load in which no record
//! decoded at all, fails the whole load.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::{ChannelSelector, ConfigError, LoaderConfig, PersistedConfig};
use crate::core::{CodecError, SchemaRegistry};
use crate::io::{open_container, ContainerError, ContainerReader};
use crate::series::{
    ExtractOptions, Extractor, ProgressObserver, RawInstanceMap, RawSeries, ScalarSeriesMap,
};
use crate::transform::{ArrayPolicy, RenameRules, TransformError};

/// Errors that abort a load.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The container could not be opened or read
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// Internal codec failure outside a single record
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Renaming rules could not be loaded
    #[error(transparent)]
    Rules(#[from] TransformError),

    /// Configuration document could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Records failed to decode and none succeeded
    #[error("all {records} records failed to decode")]
    AllRecordsFailed {
        /// Number of records read
        records: u64,
        /// Counters of the failed load
        summary: Box<LoadSummary>,
    },
}

/// A channel left out of the load because its schema is malformed.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedChannel {
    /// Channel name
    pub channel: String,
    /// Message type name
    pub type_name: String,
    /// Why the schema was rejected
    pub error: CodecError,
}

/// Counters and conditions of one load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    /// Records the container announced for the selection
    pub records_expected: u64,
    /// Records consumed
    pub records_read: u64,
    /// Records decoded into series
    pub records_decoded: u64,
    /// Records dropped after a decode error
    pub decode_failures: u64,
    /// Records dropped because their channel has no usable schema
    pub records_skipped: u64,
    /// Channels with a malformed schema
    pub skipped_channels: Vec<SkippedChannel>,
    /// The load was cancelled; results are partial
    pub cancelled: bool,
    /// Wall-clock time of the extraction
    pub elapsed: Duration,
}

/// Everything a successful load produced.
#[derive(Debug, Clone)]
pub struct LoadReport {
    /// Configuration the load ran with
    pub config: LoaderConfig,
    /// Flattened series keyed by final field path
    pub series: ScalarSeriesMap,
    /// Undecoded records keyed by channel
    pub raw: RawInstanceMap,
    /// Every retained record in arrival order
    pub timeline: RawSeries,
    /// Counters
    pub summary: LoadSummary,
}

/// Result of a load that did not fail.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Records were extracted (possibly partially, see `summary.cancelled`)
    Loaded(Box<LoadReport>),
    /// Channel selection was declined; nothing was extracted
    Declined,
}

impl LoadOutcome {
    /// The report, if the load ran.
    pub fn report(self) -> Option<LoadReport> {
        match self {
            LoadOutcome::Loaded(report) => Some(*report),
            LoadOutcome::Declined => None,
        }
    }
}

/// Runs loads against one schema registry.
///
/// The registry is reset at the start of every load, so schemas never leak
/// from one file into the next.
pub struct Loader {
    registry: SchemaRegistry,
    rules: RenameRules,
    channel_prefix: bool,
    cancel_check_interval: u64,
    defaults: LoaderConfig,
    cancel: Arc<AtomicBool>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Create a loader with no renaming rules.
    pub fn new() -> Self {
        Self {
            registry: SchemaRegistry::new(),
            rules: RenameRules::new(),
            channel_prefix: false,
            cancel_check_interval: ExtractOptions::default().cancel_check_interval,
            defaults: LoaderConfig::default(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Rules applied when a load enables renaming.
    pub fn with_rules(mut self, rules: RenameRules) -> Self {
        self.rules = rules;
        self
    }

    /// Prefix series keys with `channel/`.
    pub fn with_channel_prefix(mut self, channel_prefix: bool) -> Self {
        self.channel_prefix = channel_prefix;
        self
    }

    /// Settings offered to the selector as the starting point.
    pub fn with_defaults(mut self, defaults: LoaderConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// Records between cancellation checks.
    pub fn with_cancel_check_interval(mut self, interval: u64) -> Self {
        self.cancel_check_interval = interval.max(1);
        self
    }

    /// Flag that cancels the running load when set.
    ///
    /// The flag is cleared at the start of each load.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// The schema registry of the most recent load.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Reset the registry and register every connection of `reader`.
    ///
    /// Returns the channels whose schema was rejected. Each is logged once.
    pub fn register_connections(
        &self,
        reader: &dyn ContainerReader,
    ) -> Result<Vec<SkippedChannel>, LoadError> {
        self.registry.reset()?;

        let mut rejected: BTreeMap<String, SkippedChannel> = BTreeMap::new();
        for conn in reader.connections() {
            if let Err(error) = self.registry.register(
                &conn.channel,
                &conn.checksum,
                &conn.type_name,
                &conn.definition,
            ) {
                rejected
                    .entry(conn.channel.clone())
                    .or_insert_with(|| SkippedChannel {
                        channel: conn.channel.clone(),
                        type_name: conn.type_name.clone(),
                        error,
                    });
            }
        }

        // A channel with one good connection is still decodable.
        let skipped: Vec<SkippedChannel> = rejected
            .into_values()
            .filter(|s| !self.registry.contains(&s.channel))
            .collect();
        for s in &skipped {
            warn!(
                channel = %s.channel,
                type_name = %s.type_name,
                error = %s.error,
                details = ?s.error.log_fields(),
                "skipping channel with malformed schema"
            );
        }
        Ok(skipped)
    }

    /// Pick the configuration: the persisted document if any, else the
    /// selector. `None` means the selector declined.
    pub fn resolve_config(
        &self,
        reader: &dyn ContainerReader,
        persisted: Option<&PersistedConfig>,
        selector: &mut dyn ChannelSelector,
    ) -> Option<LoaderConfig> {
        if let Some(doc) = persisted {
            return Some(doc.to_loader_config());
        }
        selector.select(&channel_list(reader), &self.defaults)
    }

    /// Immutable extraction settings for `config`.
    pub fn extract_options(&self, config: &LoaderConfig) -> ExtractOptions {
        ExtractOptions {
            rules: self.rules.clone().enabled(config.use_renaming_rules),
            policy: ArrayPolicy::new(config.max_array_size, config.discard_large_arrays),
            use_header_stamp: config.use_header_stamp,
            channel_prefix: self.channel_prefix,
            cancel_check_interval: self.cancel_check_interval,
        }
    }

    /// Run a load over an open container.
    pub fn load(
        &self,
        reader: &dyn ContainerReader,
        persisted: Option<&PersistedConfig>,
        selector: &mut dyn ChannelSelector,
        progress: &mut dyn ProgressObserver,
    ) -> Result<LoadOutcome, LoadError> {
        self.cancel.store(false, Ordering::Relaxed);
        let skipped_channels = self.register_connections(reader)?;

        let Some(config) = self.resolve_config(reader, persisted, selector) else {
            info!(path = reader.path(), "channel selection declined");
            return Ok(LoadOutcome::Declined);
        };
        let options = self.extract_options(&config);

        // Snapshot so the record loop never takes the registry lock.
        let schemas = self.registry.snapshot(|channel| config.is_selected(channel));

        let filter = config.topic_filter();
        let expected = reader.record_count(&filter);

        let started = Instant::now();
        let mut extractor = Extractor::new(options);
        let mut container_error = None;
        let records = reader.records(&filter)?.map_while(|r| match r {
            Ok(record) => Some(record),
            Err(e) => {
                container_error = Some(e);
                None
            }
        });
        extractor.run(records, &schemas, &self.cancel, expected, progress);
        if let Some(e) = container_error {
            return Err(e.into());
        }
        let elapsed = started.elapsed();

        let out = extractor.finish();
        let summary = LoadSummary {
            records_expected: expected,
            records_read: out.stats.records_read,
            records_decoded: out.stats.records_decoded,
            decode_failures: out.stats.decode_failures,
            records_skipped: out.stats.records_skipped,
            skipped_channels,
            cancelled: out.stats.cancelled,
            elapsed,
        };
        log_summary(reader.path(), &summary, out.series.len());

        if !summary.cancelled && summary.decode_failures > 0 && summary.records_decoded == 0 {
            return Err(LoadError::AllRecordsFailed {
                records: summary.records_read,
                summary: Box::new(summary),
            });
        }

        Ok(LoadOutcome::Loaded(Box::new(LoadReport {
            config,
            series: out.series,
            raw: out.raw,
            timeline: out.timeline,
            summary,
        })))
    }

    /// Open a container file and load it.
    pub fn load_path(
        &self,
        path: impl AsRef<Path>,
        persisted: Option<&PersistedConfig>,
        selector: &mut dyn ChannelSelector,
        progress: &mut dyn ProgressObserver,
    ) -> Result<LoadOutcome, LoadError> {
        let reader = open_container(path)?;
        self.load(reader.as_ref(), persisted, selector, progress)
    }
}

/// `(channel, type name)` pairs, one per channel, in announcement order.
pub fn channel_list(reader: &dyn ContainerReader) -> Vec<(String, String)> {
    let mut seen = std::collections::HashSet::new();
    reader
        .connections()
        .iter()
        .filter(|c| seen.insert(c.channel.as_str()))
        .map(|c| (c.channel.clone(), c.type_name.clone()))
        .collect()
}

fn log_summary(path: &str, summary: &LoadSummary, series: usize) {
    if summary.decode_failures > 0 {
        warn!(
            path,
            failures = summary.decode_failures,
            records = summary.records_read,
            "records failed to decode and were skipped"
        );
    }
    if !summary.skipped_channels.is_empty() {
        warn!(
            path,
            channels = summary.skipped_channels.len(),
            "channels skipped because of malformed schemas"
        );
    }
    if summary.cancelled {
        info!(path, records = summary.records_read, "load cancelled");
    }
    info!(
        path,
        records = summary.records_read,
        series,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "load finished"
    );
}
