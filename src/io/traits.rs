// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core trait for container readers.
//!
//! A container announces its channels once and then yields undecoded
//! records for a channel selection in non-decreasing time order. Decoding
//! happens downstream, so readers never look inside a payload.

use super::filter::TopicFilter;
use super::metadata::{ConnectionInfo, RawRecord};
use super::ContainerError;

/// Boxed stream of records returned by [`ContainerReader::records`].
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<RawRecord, ContainerError>> + 'a>;

/// Trait for reading records out of a container file.
///
/// # Example
///
/// ```no_run
/// use bagseries::io::{ContainerReader, TopicFilter};
///
/// fn summarize(reader: &dyn ContainerReader) {
///     for conn in reader.connections() {
///         println!("{} ({})", conn.channel, conn.type_name);
///     }
///     println!("records: {}", reader.record_count(&TopicFilter::All));
/// }
/// ```
pub trait ContainerReader {
    /// Path or label of the container.
    fn path(&self) -> &str;

    /// Every channel in the container, in announcement order.
    fn connections(&self) -> &[ConnectionInfo];

    /// First connection announced for `channel`.
    fn connection(&self, channel: &str) -> Option<&ConnectionInfo> {
        self.connections().iter().find(|c| c.channel == channel)
    }

    /// Number of records the selection will yield, for progress reporting.
    fn record_count(&self, filter: &TopicFilter) -> u64;

    /// Stream the selected records in non-decreasing `log_time` order.
    fn records(&self, filter: &TopicFilter) -> Result<RecordIter<'_>, ContainerError>;
}
