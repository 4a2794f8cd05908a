// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Extraction and end-to-end load tests over in-memory containers.

mod common;

use std::sync::atomic::Ordering;

use bagseries::config::{FixedSelector, LoaderConfig, SelectAll};
use bagseries::core::{Scalar, SchemaRegistry};
use bagseries::io::{ConnectionInfo, MemoryContainer, RawRecord};
use bagseries::series::{ExtractOptions, Extractor, TIMELINE_SERIES};
use bagseries::session::{LoadError, Loader};
use bagseries::transform::RenameRules;
use common::{secs, Payload};

fn points(series: &bagseries::Series<Scalar>) -> Vec<(f64, Scalar)> {
    series
        .iter()
        .map(|p| (p.timestamp, p.value.clone()))
        .collect()
}

/// Channels A (`float64 x`), B (`string y`), C (`int32 z`).
fn three_channels() -> MemoryContainer {
    MemoryContainer::new("three")
        .with_connection(ConnectionInfo::new("chanA", "a1", "demo/A", "float64 x"))
        .with_connection(ConnectionInfo::new("chanB", "b1", "demo/B", "string y"))
        .with_connection(ConnectionInfo::new("chanC", "c1", "demo/C", "int32 z"))
        .with_record("chanA", 0, Payload::new().f64(1.0).build())
        .with_record("chanB", secs(1), Payload::new().string("s").build())
        .with_record("chanA", secs(2), Payload::new().f64(2.0).build())
}

fn only(topics: &[&str]) -> FixedSelector {
    FixedSelector(LoaderConfig {
        selected_topics: topics.iter().map(|t| t.to_string()).collect(),
        ..LoaderConfig::default()
    })
}

#[test]
fn test_end_to_end_selected_channel_only() {
    let container = three_channels();
    let loader = Loader::new();

    let report = loader
        .load(&container, None, &mut only(&["chanA"]), &mut ())
        .unwrap()
        .report()
        .unwrap();

    let x = report.series.get("x").unwrap();
    assert_eq!(
        points(x),
        vec![(0.0, Scalar::Float64(1.0)), (2.0, Scalar::Float64(2.0))]
    );
    assert!(!report.series.contains("y"));
    assert_eq!(report.series.len(), 1);

    // Raw retention follows the selection.
    assert_eq!(report.raw.get("chanA").unwrap().len(), 2);
    assert!(!report.raw.contains("chanB"));
    assert_eq!(report.timeline.name(), TIMELINE_SERIES);
    assert_eq!(report.timeline.len(), 2);

    assert_eq!(report.summary.records_read, 2);
    assert_eq!(report.summary.records_decoded, 2);
}

#[test]
fn test_rename_merge_in_time_order() {
    let registry = SchemaRegistry::new();
    registry
        .register("/left", "l", "demo/Left", "Inner a\n================\nMSG: demo/Inner\nint32 b")
        .unwrap();
    registry
        .register("/right", "r", "demo/Right", "Other x\n================\nMSG: demo/Other\nint32 y")
        .unwrap();

    let mut rules = RenameRules::new();
    rules.add_rule("a.b", "merged").unwrap();
    rules.add_rule("x.y", "merged").unwrap();
    let options = ExtractOptions {
        rules,
        ..ExtractOptions::default()
    };

    let records = vec![
        RawRecord::new("/left", secs(1), Payload::new().i32(10).build()),
        RawRecord::new("/right", secs(2), Payload::new().i32(20).build()),
        RawRecord::new("/left", secs(3), Payload::new().i32(30).build()),
        RawRecord::new("/right", secs(4), Payload::new().i32(40).build()),
    ];
    let out = Extractor::extract(options, records, &registry);

    assert_eq!(out.series.len(), 1);
    let merged = out.series.get("merged").unwrap();
    assert_eq!(
        points(merged),
        vec![
            (1.0, Scalar::Int32(10)),
            (2.0, Scalar::Int32(20)),
            (3.0, Scalar::Int32(30)),
            (4.0, Scalar::Int32(40)),
        ]
    );
}

#[test]
fn test_truncated_record_is_skipped() {
    let registry = SchemaRegistry::new();
    registry
        .register("/pair", "p", "demo/Pair", "float64 x\nfloat64 y")
        .unwrap();

    let records = vec![
        RawRecord::new("/pair", secs(1), Payload::new().f64(1.0).f64(2.0).build()),
        RawRecord::new("/pair", secs(2), Payload::new().f64(3.0).build()),
        RawRecord::new("/pair", secs(3), Payload::new().f64(5.0).f64(6.0).build()),
    ];
    let out = Extractor::extract(ExtractOptions::default(), records, &registry);

    assert_eq!(out.stats.decode_failures, 1);
    assert_eq!(out.stats.records_decoded, 2);
    // Nothing from the broken record leaks into any series.
    assert_eq!(
        points(out.series.get("x").unwrap()),
        vec![(1.0, Scalar::Float64(1.0)), (3.0, Scalar::Float64(5.0))]
    );
    assert_eq!(
        points(out.series.get("y").unwrap()),
        vec![(1.0, Scalar::Float64(2.0)), (3.0, Scalar::Float64(6.0))]
    );
    assert_eq!(out.raw.get("/pair").unwrap().len(), 3);
}

#[test]
fn test_channel_prefix_keys() {
    let container = three_channels();
    let loader = Loader::new().with_channel_prefix(true);

    let report = loader
        .load(&container, None, &mut SelectAll, &mut ())
        .unwrap()
        .report()
        .unwrap();

    let names: Vec<&str> = report.series.names().collect();
    assert_eq!(names, vec!["chanA/x", "chanB/y"]);
    assert_eq!(
        points(report.series.get("chanB/y").unwrap()),
        vec![(1.0, Scalar::String("s".to_string()))]
    );
}

#[test]
fn test_rules_scoped_to_type() {
    let container = three_channels();
    let rules = RenameRules::from_toml_str(
        r#"
[[rule]]
type_name = "demo/A"
pattern = "*"
replacement = "a_*"
"#,
    )
    .unwrap();
    let loader = Loader::new().with_rules(rules);

    let report = loader
        .load(&container, None, &mut SelectAll, &mut ())
        .unwrap()
        .report()
        .unwrap();

    assert!(report.series.contains("a_x"));
    assert!(report.series.contains("y"));
}

#[test]
fn test_malformed_channel_does_not_abort() {
    let container = MemoryContainer::new("mixed")
        .with_connection(ConnectionInfo::new("/good", "g", "demo/Good", "float64 v"))
        .with_connection(ConnectionInfo::new("/bad", "b", "demo/Bad", "Unknown u"))
        .with_record("/good", secs(1), Payload::new().f64(4.0).build())
        .with_record("/bad", secs(2), vec![1, 2, 3, 4]);

    let report = Loader::new()
        .load(&container, None, &mut SelectAll, &mut ())
        .unwrap()
        .report()
        .unwrap();

    assert_eq!(report.summary.skipped_channels.len(), 1);
    assert_eq!(report.summary.skipped_channels[0].channel, "/bad");
    assert_eq!(report.summary.records_skipped, 1);
    assert_eq!(report.series.get("v").unwrap().len(), 1);
    assert!(!report.raw.contains("/bad"));
}

#[test]
fn test_all_records_failed() {
    let container = MemoryContainer::new("broken")
        .with_connection(ConnectionInfo::new("/pair", "p", "demo/Pair", "float64 x\nfloat64 y"))
        .with_record("/pair", secs(1), vec![0; 4])
        .with_record("/pair", secs(2), vec![0; 12]);

    let err = Loader::new()
        .load(&container, None, &mut SelectAll, &mut ())
        .unwrap_err();

    match err {
        LoadError::AllRecordsFailed { records, summary } => {
            assert_eq!(records, 2);
            assert_eq!(summary.decode_failures, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_cancelled_load_is_partial() {
    let mut container = MemoryContainer::new("long")
        .with_connection(ConnectionInfo::new("/v", "v", "demo/V", "float64 v"));
    for i in 0..50 {
        container.push(RawRecord::new("/v", secs(i), Payload::new().f64(i as f64).build()));
    }

    let loader = Loader::new().with_cancel_check_interval(10);
    let cancel = loader.cancel_handle();

    struct CancelAt(std::sync::Arc<std::sync::atomic::AtomicBool>);
    impl bagseries::series::ProgressObserver for CancelAt {
        fn on_progress(&mut self, done: u64, _total: u64) {
            if done >= 20 {
                self.0.store(true, Ordering::Relaxed);
            }
        }
    }

    let report = loader
        .load(&container, None, &mut SelectAll, &mut CancelAt(cancel))
        .unwrap()
        .report()
        .unwrap();

    assert!(report.summary.cancelled);
    assert_eq!(report.summary.records_read, 30);
    assert_eq!(report.series.get("v").unwrap().len(), 30);
}
