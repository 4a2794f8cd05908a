// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Time series built from decoded records.
//!
//! A [`Series`] is an append-only list of timestamped points. A
//! [`SeriesMap`] keys series by name and iterates them in the order they
//! were first created.

pub mod extractor;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::core::Scalar;
use crate::io::RawRecord;

pub use extractor::{
    ExtractOptions, ExtractStats, Extraction, Extractor, ProgressObserver, SchemaSource,
};

/// Name of the series holding every retained record in arrival order.
pub const TIMELINE_SERIES: &str = "__consecutive_message_instances__";

/// One timestamped value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point<T> {
    /// Time in seconds
    pub timestamp: f64,
    /// Value at that time
    pub value: T,
}

/// Time-ordered sequence of points sharing one name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T> {
    name: String,
    points: Vec<Point<T>>,
}

/// Flattened scalar series.
pub type ScalarSeries = Series<Scalar>;

/// Series of undecoded records.
pub type RawSeries = Series<Arc<RawRecord>>;

impl<T> Series<T> {
    /// Create an empty series.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
        }
    }

    /// Series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a point.
    ///
    /// Timestamps stay non-decreasing: a point older than the last one is
    /// inserted after every point with a timestamp not greater than its own.
    pub fn push(&mut self, timestamp: f64, value: T) {
        let point = Point { timestamp, value };
        match self.points.last() {
            Some(last) if last.timestamp > timestamp => {
                let at = self.points.partition_point(|p| p.timestamp <= timestamp);
                self.points.insert(at, point);
            }
            _ => self.points.push(point),
        }
    }

    /// All points.
    pub fn points(&self) -> &[Point<T>] {
        &self.points
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, Point<T>> {
        self.points.iter()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last timestamp.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
            _ => None,
        }
    }
}

impl<'a, T> IntoIterator for &'a Series<T> {
    type Item = &'a Point<T>;
    type IntoIter = std::slice::Iter<'a, Point<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Series keyed by name, in first-seen order.
#[derive(Debug, Clone)]
pub struct SeriesMap<T> {
    index: HashMap<String, usize>,
    series: Vec<Series<T>>,
}

/// Flattened series keyed by final field path.
pub type ScalarSeriesMap = SeriesMap<Scalar>;

/// Undecoded records keyed by channel.
pub type RawInstanceMap = SeriesMap<Arc<RawRecord>>;

impl<T> Default for SeriesMap<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            series: Vec::new(),
        }
    }
}

impl<T> SeriesMap<T> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the series named `name`, creating it on first use.
    pub fn entry(&mut self, name: &str) -> &mut Series<T> {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let idx = self.series.len();
                self.series.push(Series::new(name));
                self.index.insert(name.to_string(), idx);
                idx
            }
        };
        &mut self.series[idx]
    }

    /// Append a point to the series named `name`.
    pub fn push(&mut self, name: &str, timestamp: f64, value: T) {
        self.entry(name).push(timestamp, value);
    }

    /// Look up a series.
    pub fn get(&self, name: &str) -> Option<&Series<T>> {
        self.index.get(name).map(|&idx| &self.series[idx])
    }

    /// Check if a series exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Series names in first-seen order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.name())
    }

    /// Iterate over series in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, Series<T>> {
        self.series.iter()
    }

    /// Number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Check if there are no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of points across every series.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(Series::len).sum()
    }

    /// Consume the map, keeping first-seen order.
    pub fn into_vec(self) -> Vec<Series<T>> {
        self.series
    }
}

impl<'a, T> IntoIterator for &'a SeriesMap<T> {
    type Item = &'a Series<T>;
    type IntoIter = std::slice::Iter<'a, Series<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_map_first_seen_order() {
        let mut map = SeriesMap::new();
        map.push("b", 0.0, 1);
        map.push("a", 1.0, 2);
        map.push("b", 2.0, 3);

        assert_eq!(map.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(map.get("b").unwrap().len(), 2);
        assert_eq!(map.point_count(), 3);
        assert!(map.get("c").is_none());
    }

    #[test]
    fn test_series_push_keeps_time_order() {
        let mut series = Series::new("s");
        series.push(1.0, "a");
        series.push(3.0, "b");
        series.push(2.0, "c");
        series.push(3.0, "d");

        let values: Vec<&str> = series.iter().map(|p| p.value).collect();
        assert_eq!(values, vec!["a", "c", "b", "d"]);
        assert_eq!(series.time_range(), Some((1.0, 3.0)));
    }

    #[test]
    fn test_empty_series() {
        let series: Series<i32> = Series::new("empty");
        assert!(series.is_empty());
        assert_eq!(series.time_range(), None);
        assert_eq!(series.name(), "empty");
    }
}
