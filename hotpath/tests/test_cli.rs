use std::io::Write;
use std::process::{Command as Process, Output};

use clap::Parser;
use hotpath::cli::{build_session, execute, Args, UsageError};
use hotpath_common::{ProfileKind, Report};

const CPU: &str = "cpu=tests/fixtures/cpu.txt";
const ALLOC: &str = "heap-alloc-space=tests/fixtures/heap_alloc.txt";
const INUSE: &str = "heap-inuse-space=tests/fixtures/heap_inuse.txt";

fn run_args(argv: &[&str]) -> anyhow::Result<Report> {
    let mut full = vec!["hotpath", "--text", "-q", "-b", "example.com/shop"];
    full.extend_from_slice(argv);
    let args = Args::try_parse_from(full)?;
    let session = build_session(&args)?;
    execute(&args.command, &session)
}

fn hotpath(argv: &[&str]) -> Output {
    Process::new(env!("CARGO_BIN_EXE_hotpath"))
        .args(argv)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run hotpath")
}

#[test]
fn test_top_report() {
    let report = run_args(&["-p", CPU, "top", "--kind", "cpu", "--min", "20%"]).unwrap();
    let Report::Endpoints { summary, endpoints } = report else { panic!("expected endpoints report") };
    assert_eq!(summary.kind, ProfileKind::Cpu);
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[0].endpoint, "runtime.memmove");
    assert_eq!(endpoints[0].crossings.len(), 2);
}

#[test]
fn test_vendors_minus_report() {
    let report = run_args(&[
        "-p", ALLOC, "-p", INUSE, "--scan", "innermost", "vendors", "--kind", "heap-alloc-space", "--min", "0",
        "--minus", "heap-inuse-space",
    ])
    .unwrap();
    let Report::VendorDiff { subtracted, diffs, .. } = report else { panic!("expected vendor diff report") };
    assert_eq!(subtracted.kind, ProfileKind::HeapInuseSpace);
    assert_eq!(diffs[0].boundary_func, "example.com/shop/store.(*Cache).Snapshot");
    assert_eq!(diffs[0].diff_total, 60 * 1024 * 1024);
}

#[test]
fn test_minus_across_units_is_a_usage_error() {
    let err = run_args(&["-p", CPU, "-p", INUSE, "vendors", "--kind", "cpu", "--minus", "heap-inuse-space"])
        .unwrap_err();
    assert!(err.is::<UsageError>(), "unexpected error: {err:#}");
}

#[test]
fn test_multi_needs_two_thresholds() {
    let err = run_args(&["-p", CPU, "multi", "--min", "cpu=1%"]).unwrap_err();
    assert!(err.is::<UsageError>());

    let report = run_args(&["-p", CPU, "-p", ALLOC, "multi", "--min", "cpu=1%", "--min", "heap-alloc-space=1%"])
        .unwrap();
    let Report::CrossDimension { summaries, entries } = report else { panic!("expected cross-dimension report") };
    assert_eq!(summaries.len(), 2);
    assert_eq!(entries[0].shared_func, "example.com/shop/api.(*Server).handleOrder");
}

#[test]
fn test_suggest_with_rule_file() {
    let mut rules = tempfile::NamedTempFile::new().unwrap();
    write!(
        rules,
        r#"[{{"pattern": "runtime/internal/syscall.", "match_kind": "prefix", "description": "syscalls", "min": "10%"}}]"#
    )
    .unwrap();
    let path = rules.path().to_str().unwrap();

    let report = run_args(&["-p", CPU, "suggest", "--kind", "cpu", "--rules", path]).unwrap();
    let Report::Suggestions { suggestions, .. } = report else { panic!("expected suggestions report") };
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].endpoint.endpoint, "runtime/internal/syscall.Syscall6");
    assert_eq!(suggestions[0].description, "syscalls");
}

#[test]
fn test_entries_report() {
    let report = run_args(&["-p", CPU, "entries", "--kind", "cpu"]).unwrap();
    let Report::EntryFuncs { funcs, .. } = report else { panic!("expected entry funcs report") };
    assert_eq!(funcs, vec!["net/http.(*conn).serve", "runtime.mcall"]);
}

#[test]
fn test_binary_prints_json_report() {
    let output = hotpath(&["--text", "-q", "-p", CPU, "--format", "json", "top-n", "--kind", "cpu", "-n", "2"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["report"], "endpoints");
    assert_eq!(json["endpoints"].as_array().unwrap().len(), 2);
    assert_eq!(json["endpoints"][1]["endpoint"], "runtime.mallocgc");
}

#[test]
fn test_binary_prints_text_report() {
    let output = hotpath(&["--text", "-p", CPU, "-b", "example.com/shop", "vendors", "--kind", "cpu"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1. example.com/shop/api.(*Server).handleOrder, 5s 62.50%"), "stdout: {stdout}");
    // session summary goes to stderr unless --quiet
    assert!(String::from_utf8_lossy(&output.stderr).contains("cpu: cpu total 8s"));
}

#[test]
fn test_binary_exit_codes() {
    // dimension that was never loaded
    let output = hotpath(&["--text", "-p", CPU, "top", "--kind", "mutex"]);
    assert_eq!(output.status.code(), Some(2));

    // unreadable dump
    let output = hotpath(&["--text", "-p", "cpu=tests/fixtures/does_not_exist.txt", "top", "--kind", "cpu"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("error:"));

    // malformed dump
    let output = hotpath(&["--text", "-p", "cpu=tests/fixtures/no_type.txt", "top", "--kind", "cpu"]);
    assert_eq!(output.status.code(), Some(1));

    // bad arguments
    let output = hotpath(&["top", "--kind", "cpu"]);
    assert_eq!(output.status.code(), Some(2));
}
