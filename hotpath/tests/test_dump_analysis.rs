use std::collections::BTreeMap;
use std::fs;

use hotpath::analysis::{BoundaryPredicate, ScanOrder, Threshold, BUILTIN_RULES};
use hotpath::domain::{ParseError, SessionError};
use hotpath::parsing::ParsedDump;
use hotpath::profiling::TextDumpSource;
use hotpath::{AnalysisSession, DumpSpec, SessionConfig};
use hotpath_common::{ProfileKind, Unit};

const MB: i64 = 1024 * 1024;
const SECOND: i64 = 1_000_000_000;

fn load(kind: ProfileKind, fixture: &str) -> ParsedDump {
    let text = fs::read_to_string(format!("tests/fixtures/{fixture}")).expect("fixture should exist");
    ParsedDump::parse(kind, &text).expect("fixture should parse")
}

fn shop() -> BoundaryPredicate {
    BoundaryPredicate::project(["example.com/shop"])
}

fn session(scan: ScanOrder) -> AnalysisSession {
    let specs = vec![
        DumpSpec::new(ProfileKind::Cpu, "tests/fixtures/cpu.txt"),
        DumpSpec::new(ProfileKind::HeapAllocSpace, "tests/fixtures/heap_alloc.txt"),
        DumpSpec::new(ProfileKind::HeapInuseSpace, "tests/fixtures/heap_inuse.txt"),
        DumpSpec::new(ProfileKind::Goroutine, "tests/fixtures/goroutine.txt"),
        DumpSpec::new(ProfileKind::Mutex, "tests/fixtures/mutex.txt"),
    ];
    let config = SessionConfig { jobs: 3, scan, ..SessionConfig::default() };
    AnalysisSession::build(&specs, &TextDumpSource, shop(), &config).expect("session should build")
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}

#[test]
fn test_cpu_dump_header_and_ranking() {
    let dump = load(ProfileKind::Cpu, "cpu.txt");

    assert_eq!(dump.unit(), Unit::Duration);
    assert_eq!(dump.total_samples(), 8 * SECOND);
    assert_eq!(dump.samples().len(), 5);
    assert_eq!(dump.metadata().file.as_deref(), Some("shopd"));

    let ranked: Vec<(&str, i64)> = dump.ranked().map(|e| (e.endpoint.as_str(), e.total)).collect();
    assert_eq!(
        ranked,
        vec![
            ("runtime.memmove", 4_500_000_000),
            ("runtime.mallocgc", 2 * SECOND),
            ("runtime/internal/syscall.Syscall6", SECOND),
            ("runtime.futex", 500_000_000),
        ]
    );
    let memmove = dump.endpoint("runtime.memmove").unwrap();
    assert_close(memmove.percent, 56.25);
    // largest sample of the endpoint first
    assert_eq!(dump.sample(memmove.samples[0]).magnitude, 3 * SECOND);
    // tag lines and inline markers do not split the endpoint
    assert_eq!(memmove.samples.len(), 2);
    assert_eq!(dump.sample(memmove.samples[1]).frames[0], "runtime.growslice");

    let summary = dump.summary();
    assert_eq!(summary.captured_at.as_deref(), Some("2023-11-08 16:53 (CST)"));
    assert_eq!(summary.sampled_percent, Some(26.66));
}

#[test]
fn test_top_threshold_forms_agree() {
    let session = session(ScanOrder::OutermostFirst);
    let cpu = session.dimension(ProfileKind::Cpu).unwrap();

    let by_percent: Vec<&str> = cpu.top(&"20%".into()).unwrap().iter().map(|e| e.endpoint()).collect();
    let by_literal: Vec<&str> = cpu.top(&"1.6s".into()).unwrap().iter().map(|e| e.endpoint()).collect();
    let by_value: Vec<&str> = cpu.top(&Threshold::Value(1_600_000_000)).unwrap().iter().map(|e| e.endpoint()).collect();

    assert_eq!(by_percent, vec!["runtime.memmove", "runtime.mallocgc"]);
    assert_eq!(by_literal, by_percent);
    assert_eq!(by_value, by_percent);

    assert!(cpu.top(&"10MB".into()).is_err());
    assert_eq!(cpu.top_n(1)[0].endpoint(), "runtime.memmove");
}

#[test]
fn test_crossings_follow_scan_order() {
    let outer = session(ScanOrder::OutermostFirst);
    let inner = session(ScanOrder::InnermostFirst);

    let top = outer.dimension(ProfileKind::Cpu).unwrap().top_n(1);
    let crossings: Vec<_> = top[0].crossings().collect();
    assert_eq!(crossings.len(), 2);
    assert_eq!(crossings[0].boundary_func, "example.com/shop/api.(*Server).handleOrder");
    assert_eq!(crossings[0].next_func, "example.com/shop/api.renderOrder");
    assert_eq!(crossings[0].outer_func, "net/http.(*conn).serve");
    assert_eq!(crossings[1].boundary_func, "example.com/shop/api.(*Server).handleList");

    let top = inner.dimension(ProfileKind::Cpu).unwrap().top_n(1);
    let crossings: Vec<_> = top[0].crossings().collect();
    assert_eq!(crossings[0].boundary_func, "example.com/shop/api.renderOrder");
    assert_eq!(crossings[0].next_func, "encoding/json.Marshal");
    assert_eq!(crossings[1].boundary_func, "example.com/shop/store.(*Cache).Snapshot");

    // stacks that never enter project code have no crossing
    let futex = outer.dimension(ProfileKind::Cpu).unwrap().top(&Threshold::Value(1)).unwrap();
    let futex = futex.iter().find(|e| e.endpoint() == "runtime.futex").unwrap();
    assert_eq!(futex.crossings().count(), 0);
    assert!(futex.to_report().crossings.is_empty());
}

#[test]
fn test_vendor_sums_by_scan_order() {
    let outer = session(ScanOrder::OutermostFirst);
    let sums = outer.dimension(ProfileKind::Cpu).unwrap().sum_vendor(&Threshold::default()).unwrap();
    let entries: Vec<(&str, i64)> = sums.entries().iter().map(|e| (e.boundary_func.as_str(), e.total)).collect();
    assert_eq!(
        entries,
        vec![
            ("example.com/shop/api.(*Server).handleOrder", 5 * SECOND),
            ("example.com/shop/api.(*Server).handleList", 1_500_000_000),
        ]
    );
    assert_close(sums.entries()[0].percent, 62.5);

    let inner = session(ScanOrder::InnermostFirst);
    let sums = inner.dimension(ProfileKind::Cpu).unwrap().sum_vendor(&"30%".into()).unwrap();
    let entries: Vec<(&str, i64)> = sums.entries().iter().map(|e| (e.boundary_func.as_str(), e.total)).collect();
    assert_eq!(
        entries,
        vec![
            ("example.com/shop/store.(*Cache).Snapshot", 3_500_000_000),
            ("example.com/shop/api.renderOrder", 3 * SECOND),
        ]
    );
}

#[test]
fn test_short_lived_allocations_by_vendor_diff() {
    let inner = session(ScanOrder::InnermostFirst);
    let alloc = inner.dimension(ProfileKind::HeapAllocSpace).unwrap().sum_vendor(&Threshold::default()).unwrap();
    let inuse = inner.dimension(ProfileKind::HeapInuseSpace).unwrap().sum_vendor(&Threshold::default()).unwrap();

    let diffs = alloc.diff(&inuse);
    assert_eq!(diffs.len(), 2);
    assert_eq!(diffs[0].boundary_func, "example.com/shop/store.(*Cache).Snapshot");
    assert_eq!(diffs[0].raw_total, 100 * MB);
    assert_eq!(diffs[0].subtracted, 40 * MB);
    assert_eq!(diffs[0].diff_total, 60 * MB);
    assert_close(diffs[0].diff_percent, 30.0);
    assert_eq!(diffs[1].boundary_func, "example.com/shop/api.decodeOrder");
    assert_eq!(diffs[1].subtracted, 0);
    assert_eq!(diffs[1].diff_total, 60 * MB);

    let outer = session(ScanOrder::OutermostFirst);
    let alloc = outer.dimension(ProfileKind::HeapAllocSpace).unwrap().sum_vendor(&Threshold::default()).unwrap();
    let inuse = outer.dimension(ProfileKind::HeapInuseSpace).unwrap().sum_vendor(&Threshold::default()).unwrap();
    let diffs = alloc.diff(&inuse);
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].diff_total, 120 * MB);
}

#[test]
fn test_heap_samples_keep_allocation_size() {
    let dump = load(ProfileKind::HeapAllocSpace, "heap_alloc.txt");
    assert_eq!(dump.total_samples(), 200 * MB);
    assert_eq!(dump.samples()[0].allocation_size, Some(4096));
    assert_eq!(dump.samples()[1].allocation_size, Some(512));
    assert_close(dump.endpoint("bytes.growSlice").unwrap().percent, 50.0);
}

#[test]
fn test_cross_dimension_outermost() {
    let session = session(ScanOrder::OutermostFirst);
    let thresholds = BTreeMap::from([
        (ProfileKind::Cpu, Threshold::from("1%")),
        (ProfileKind::HeapAllocSpace, Threshold::from("1%")),
    ]);
    let entries = session.top_multiple(&thresholds).unwrap();

    assert_eq!(entries.len(), 1);
    let entry = &entries[0];
    assert_eq!(entry.shared_func, "example.com/shop/api.(*Server).handleOrder");
    assert_eq!(entry.per_dimension[&ProfileKind::Cpu].magnitude, 5 * SECOND);
    assert_close(entry.per_dimension[&ProfileKind::Cpu].percent, 62.5);
    assert_eq!(entry.per_dimension[&ProfileKind::HeapAllocSpace].magnitude, 160 * MB);
    assert_close(entry.per_dimension[&ProfileKind::HeapAllocSpace].percent, 80.0);
    assert_close(entry.combined_percent, 142.5);
    assert_eq!(entry.paths.len(), 4);
}

#[test]
fn test_cross_dimension_innermost() {
    let session = session(ScanOrder::InnermostFirst);
    let thresholds = BTreeMap::from([
        (ProfileKind::Cpu, Threshold::from("1%")),
        (ProfileKind::HeapAllocSpace, Threshold::from("1%")),
    ]);
    let entries = session.top_multiple(&thresholds).unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].shared_func, "example.com/shop/store.(*Cache).Snapshot");
    assert_eq!(entries[0].per_dimension[&ProfileKind::Cpu].magnitude, 3_500_000_000);
    assert_eq!(entries[0].per_dimension[&ProfileKind::HeapAllocSpace].magnitude, 100 * MB);
    assert_close(entries[0].combined_percent, 93.75);
}

#[test]
fn test_cross_dimension_needs_every_dimension() {
    let session = session(ScanOrder::OutermostFirst);
    // handleOrder is hot in cpu and heap but never waits in a goroutine
    let thresholds = BTreeMap::from([
        (ProfileKind::Cpu, Threshold::from("1%")),
        (ProfileKind::HeapAllocSpace, Threshold::from("1%")),
        (ProfileKind::Goroutine, Threshold::from("1%")),
    ]);
    assert!(session.top_multiple(&thresholds).unwrap().is_empty());
}

#[test]
fn test_builtin_suggestions_for_cpu() {
    let session = session(ScanOrder::OutermostFirst);
    let cpu = session.dimension(ProfileKind::Cpu).unwrap();

    let suggestions = cpu.suggest(BUILTIN_RULES, None).unwrap();
    let patterns: Vec<&str> = suggestions.iter().map(|s| s.pattern.as_str()).collect();
    assert_eq!(patterns, vec!["runtime.memmove", "runtime.mallocgc"]);

    let lowered = Threshold::from("5%");
    let suggestions = cpu.suggest(BUILTIN_RULES, Some(&lowered)).unwrap();
    assert_eq!(suggestions.len(), 4);
    assert_eq!(suggestions[3].endpoint.endpoint, "runtime.futex");
}

#[test]
fn test_entry_funcs() {
    let session = session(ScanOrder::OutermostFirst);
    let cpu = session.dimension(ProfileKind::Cpu).unwrap();
    assert_eq!(cpu.entry_funcs(), vec!["net/http.(*conn).serve", "runtime.mcall"]);

    let goroutine = session.dimension(ProfileKind::Goroutine).unwrap();
    assert_eq!(
        goroutine.entry_funcs(),
        vec![
            "net/http.(*connReader).backgroundRead",
            "example.com/shop/store.(*Cache).refreshLoop",
            "net/http.(*conn).serve",
        ]
    );
}

#[test]
fn test_goroutine_dump_without_totals() {
    let dump = load(ProfileKind::Goroutine, "goroutine.txt");
    assert_eq!(dump.unit(), Unit::Count);
    assert_eq!(dump.total_samples(), 18);
    assert_eq!(dump.summary().duration_nanos, 1);

    let gopark = dump.endpoint("runtime.gopark").unwrap();
    assert_eq!(gopark.total, 17);
    assert_close(gopark.percent, 17.0 / 18.0 * 100.0);
}

#[test]
fn test_mutex_delay_in_hours() {
    let session = session(ScanOrder::OutermostFirst);
    let mutex = session.dimension(ProfileKind::Mutex).unwrap();
    assert_eq!(mutex.dump().unit(), Unit::Duration);

    let top = mutex.top(&"50%".into()).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].endpoint(), "sync.(*Mutex).Unlock");

    let sums = mutex.sum_vendor(&"1h".into()).unwrap();
    assert_eq!(sums.entries()[0].boundary_func, "example.com/shop/api.(*Server).handleOrder");
    assert_eq!(sums.entries().len(), 2);
}

#[test]
fn test_missing_type_fails_the_session() {
    let text = fs::read_to_string("tests/fixtures/no_type.txt").unwrap();
    assert_eq!(ParsedDump::parse(ProfileKind::Cpu, &text).unwrap_err(), ParseError::MissingType);

    let specs = vec![
        DumpSpec::new(ProfileKind::Cpu, "tests/fixtures/no_type.txt"),
        DumpSpec::new(ProfileKind::Goroutine, "tests/fixtures/goroutine.txt"),
    ];
    let err = AnalysisSession::build(&specs, &TextDumpSource, shop(), &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, SessionError::Parse { kind: ProfileKind::Cpu, source: ParseError::MissingType, .. }));
}

#[test]
fn test_missing_file_fails_the_session() {
    let specs = vec![DumpSpec::new(ProfileKind::Cpu, "tests/fixtures/does_not_exist.txt")];
    let err = AnalysisSession::build(&specs, &TextDumpSource, shop(), &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, SessionError::Load { kind: ProfileKind::Cpu, .. }));
}
