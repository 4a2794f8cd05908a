// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Record flattening.
//!
//! The extractor consumes records in time order. Each record is decoded
//! into field values, each path is renamed, and each value is appended to
//! the series keyed by the final path. Every record is also kept unmodified
//! at its arrival time, once per channel and once in the global timeline.
//!
//! A record that fails to decode contributes no values at all: values are
//! buffered per record and only committed once the whole record decoded.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::core::{CodecError, Scalar, SchemaHandle, SchemaRegistry, SchemaSnapshot};
use crate::encoding::Ros1Decoder;
use crate::io::RawRecord;
use crate::transform::{ArrayPolicy, RenameRules};

use super::{RawInstanceMap, RawSeries, ScalarSeriesMap, TIMELINE_SERIES};

/// Field path of the embedded header timestamp.
const HEADER_STAMP_PATH: &str = "header.stamp";

/// Settings for one extraction. Immutable once extraction starts.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Path renaming rules
    pub rules: RenameRules,
    /// Array expansion policy
    pub policy: ArrayPolicy,
    /// Prefer `header.stamp` over arrival time
    pub use_header_stamp: bool,
    /// Prefix series keys with `channel/`
    pub channel_prefix: bool,
    /// Records between cancellation checks
    pub cancel_check_interval: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            rules: RenameRules::new(),
            policy: ArrayPolicy::default(),
            use_header_stamp: false,
            channel_prefix: false,
            cancel_check_interval: 100,
        }
    }
}

/// Where the extractor finds a record's schema.
pub trait SchemaSource {
    /// Schema for a record on `channel` carried by the connection with
    /// `checksum`, or `None` if the record cannot be decoded.
    fn schema_for(&self, channel: &str, checksum: Option<&str>) -> Option<SchemaHandle>;
}

impl SchemaSource for SchemaRegistry {
    fn schema_for(&self, channel: &str, checksum: Option<&str>) -> Option<SchemaHandle> {
        self.resolve(channel, checksum)
    }
}

impl SchemaSource for SchemaSnapshot {
    fn schema_for(&self, channel: &str, checksum: Option<&str>) -> Option<SchemaHandle> {
        self.resolve(channel, checksum)
    }
}

/// Receives progress while records are consumed.
pub trait ProgressObserver {
    /// `done` records of `total` have been consumed.
    fn on_progress(&mut self, done: u64, total: u64);
}

impl ProgressObserver for () {
    fn on_progress(&mut self, _done: u64, _total: u64) {}
}

/// Counters for one extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Records handed to the extractor
    pub records_read: u64,
    /// Records decoded into series
    pub records_decoded: u64,
    /// Records dropped because decoding failed
    pub decode_failures: u64,
    /// Records dropped because their channel has no usable schema
    pub records_skipped: u64,
    /// Extraction stopped early on request
    pub cancelled: bool,
}

/// Everything an extraction produced.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Flattened series keyed by final field path
    pub series: ScalarSeriesMap,
    /// Undecoded records keyed by channel
    pub raw: RawInstanceMap,
    /// Every retained record in arrival order
    pub timeline: RawSeries,
    /// Counters
    pub stats: ExtractStats,
}

impl Extraction {
    fn new() -> Self {
        Self {
            series: ScalarSeriesMap::new(),
            raw: RawInstanceMap::new(),
            timeline: RawSeries::new(TIMELINE_SERIES),
            stats: ExtractStats::default(),
        }
    }
}

/// Incremental record flattener.
///
/// # Example
///
/// ```
/// use bagseries::core::SchemaRegistry;
/// use bagseries::io::RawRecord;
/// use bagseries::series::{ExtractOptions, Extractor};
///
/// let registry = SchemaRegistry::new();
/// registry.register("/speed", "c0", "demo/Speed", "float64 v").unwrap();
///
/// let mut extractor = Extractor::new(ExtractOptions::default());
/// extractor
///     .push(RawRecord::new("/speed", 0, 2.5f64.to_le_bytes().to_vec()), &registry)
///     .unwrap();
/// let out = extractor.finish();
/// assert_eq!(out.series.get("v").unwrap().len(), 1);
/// ```
pub struct Extractor {
    options: ExtractOptions,
    decoder: Ros1Decoder,
    output: Extraction,
    scratch: Vec<(String, Scalar)>,
    /// Keys written by the current record
    written: HashSet<String>,
}

impl Extractor {
    /// Create an extractor.
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            decoder: Ros1Decoder::new(options.policy),
            options,
            output: Extraction::new(),
            scratch: Vec::new(),
            written: HashSet::new(),
        }
    }

    /// The options in effect.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Counters so far.
    pub fn stats(&self) -> ExtractStats {
        self.output.stats
    }

    /// Consume one record.
    ///
    /// Returns the number of values appended. A decode error is returned
    /// after being counted; the extractor stays usable and the record is
    /// still kept in the raw views. A record whose channel has no schema is
    /// counted as skipped and kept nowhere.
    pub fn push<S>(&mut self, record: RawRecord, schemas: &S) -> Result<usize, CodecError>
    where
        S: SchemaSource + ?Sized,
    {
        self.output.stats.records_read += 1;

        let Some(schema) = schemas.schema_for(&record.channel, record.checksum.as_deref()) else {
            self.output.stats.records_skipped += 1;
            return Ok(0);
        };

        self.scratch.clear();
        let scratch = &mut self.scratch;
        let decoded = self
            .decoder
            .decode_with(&schema.layout, &record.data, |path, value| {
                scratch.push((path.to_string(), value));
            });

        let timestamp = match &decoded {
            Ok(_) if self.options.use_header_stamp => {
                header_stamp(&self.scratch).unwrap_or_else(|| record.timestamp())
            }
            _ => record.timestamp(),
        };

        let appended = match decoded {
            Ok(_) => {
                let appended = self.commit(&record.channel, &schema.type_name, timestamp);
                self.output.stats.records_decoded += 1;
                Ok(appended)
            }
            Err(e) => {
                self.output.stats.decode_failures += 1;
                debug!(
                    channel = %record.channel,
                    log_time = record.log_time,
                    error = %e,
                    details = ?e.log_fields(),
                    "dropping record that failed to decode"
                );
                Err(e)
            }
        };

        // Raw views stay on arrival time.
        let arrival = record.timestamp();
        let record = Arc::new(record);
        self.output
            .raw
            .push(&record.channel, arrival, Arc::clone(&record));
        self.output.timeline.push(arrival, record);

        appended
    }

    /// Append the buffered values.
    ///
    /// Paths renamed onto the same key share one series. Within a single
    /// record such a collision keeps every value, each at the record's
    /// timestamp.
    fn commit(&mut self, channel: &str, type_name: &str, timestamp: f64) -> usize {
        let rules = &self.options.rules;
        let track = rules.is_enabled() && !rules.is_empty();
        self.written.clear();

        let mut key = String::new();
        let mut appended = 0;
        for (path, value) in self.scratch.drain(..) {
            let renamed = rules.apply_for(type_name, &path);
            key.clear();
            if self.options.channel_prefix {
                key.push_str(channel);
                key.push('/');
            }
            key.push_str(&renamed);
            if track && !self.written.insert(key.clone()) {
                debug!(channel, path = %path, key = %key, "record writes one series twice");
            }
            self.output.series.push(&key, timestamp, value);
            appended += 1;
        }
        appended
    }

    /// Consume records until the stream ends or `cancel` is set.
    ///
    /// `cancel` is checked every `cancel_check_interval` records. Decode
    /// failures are counted and do not stop the run.
    pub fn run<I, S>(
        &mut self,
        records: I,
        schemas: &S,
        cancel: &AtomicBool,
        total: u64,
        progress: &mut dyn ProgressObserver,
    ) where
        I: IntoIterator<Item = RawRecord>,
        S: SchemaSource + ?Sized,
    {
        let interval = self.options.cancel_check_interval.max(1);
        let mut done = 0u64;
        for record in records {
            if done % interval == 0 {
                if cancel.load(Ordering::Relaxed) {
                    self.output.stats.cancelled = true;
                    break;
                }
                progress.on_progress(done, total);
            }
            let _ = self.push(record, schemas);
            done += 1;
        }
        if !self.output.stats.cancelled {
            progress.on_progress(done, total);
        }
    }

    /// Finish and hand over the results.
    pub fn finish(self) -> Extraction {
        self.output
    }

    /// Flatten a whole record stream in one call.
    pub fn extract<I, S>(options: ExtractOptions, records: I, schemas: &S) -> Extraction
    where
        I: IntoIterator<Item = RawRecord>,
        S: SchemaSource + ?Sized,
    {
        let mut extractor = Self::new(options);
        let never = AtomicBool::new(false);
        extractor.run(records, schemas, &never, 0, &mut ());
        extractor.finish()
    }
}

/// Embedded `header.stamp` in seconds, if the record has one.
fn header_stamp(values: &[(String, Scalar)]) -> Option<f64> {
    values
        .iter()
        .find(|(path, _)| path == HEADER_STAMP_PATH)
        .and_then(|(_, value)| match value {
            Scalar::Timestamp(_) => value.as_f64(),
            _ => None,
        })
}
