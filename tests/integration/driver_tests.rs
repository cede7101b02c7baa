//! Multi-file driver and report integration tests.
//!
//! Covers directory expansion, per-file failure isolation, snippets, and
//! both report renderers over the fixture directory.

use std::path::PathBuf;

use shipscan::{render_json, render_text, scan_file, scan_paths, Category, ScanOptions, ScanResult};

/// Get the path to test fixtures.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn scan_fixture_dir() -> Vec<ScanResult> {
    scan_paths(&[fixtures_path()], &ScanOptions::default())
}

// =============================================================================
// Directory Expansion
// =============================================================================

#[test]
fn test_directory_scan_visits_php_files_in_sorted_order() {
    let results = scan_fixture_dir();
    let names: Vec<&str> = results
        .iter()
        .map(|result| {
            result
                .file_path
                .rsplit('/')
                .next()
                .expect("file name component")
        })
        .collect();
    assert_eq!(
        names,
        vec![
            "broken.php",
            "checkout_rules.php",
            "clean.php",
            "custom_rates.php",
            "rate_rules.php",
        ]
    );
}

#[test]
fn test_missing_path_is_reported_not_dropped() {
    let missing = fixtures_path().join("gone.php");
    let results = scan_paths(&[missing], &ScanOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].parse_error.as_deref(), Some("file not found"));
    assert!(results[0].findings.is_empty());
}

// =============================================================================
// Failure Isolation
// =============================================================================

#[test]
fn test_broken_fixture_records_the_error_and_keeps_findings() {
    let path = fixtures_path().join("broken.php");
    let result = scan_file(&path, &ScanOptions::default()).expect("fixture should be readable");

    let message = result.parse_error.expect("parse error should be recorded");
    assert!(
        message.starts_with("syntax error near line"),
        "unexpected parse error message: {message}"
    );

    assert_eq!(result.findings.len(), 1);
    assert_eq!(result.findings[0].category, Category::FilterHook);
    assert_eq!(result.findings[0].line, 3);
}

#[test]
fn test_broken_fixture_does_not_abort_the_directory_scan() {
    let results = scan_fixture_dir();
    assert_eq!(results.len(), 5);
    let with_findings = results
        .iter()
        .filter(|result| !result.findings.is_empty())
        .count();
    assert_eq!(with_findings, 4, "only clean.php should come back empty");
}

// =============================================================================
// Snippets
// =============================================================================

#[test]
fn test_snippets_mark_the_match_line() {
    let options = ScanOptions {
        snippets: true,
        context_lines: 1,
    };
    let path = fixtures_path().join("rate_rules.php");
    let result = scan_file(&path, &options).expect("fixture should be readable");

    let snippet = result.findings[0]
        .snippet
        .as_deref()
        .expect("snippet attached");
    assert!(snippet.contains(">   12 | "), "snippet was: {snippet}");
    assert!(snippet.contains("add_filter"));
    assert_eq!(snippet.lines().count(), 3);
}

#[test]
fn test_snippets_are_absent_by_default() {
    let path = fixtures_path().join("rate_rules.php");
    let result = scan_file(&path, &ScanOptions::default()).expect("fixture should be readable");
    assert!(result.findings.iter().all(|f| f.snippet.is_none()));
}

// =============================================================================
// Report Rendering
// =============================================================================

#[test]
fn test_text_report_totals_the_fixture_directory() {
    let report = render_text(&scan_fixture_dir());

    assert!(report.contains("Scanning"));
    assert!(report.contains("Package Rate Filters"));
    assert!(report.contains("unset($rates[])"));
    assert!(report.contains("No shipping-related hooks or methods found."));
    assert!(report.contains("(!) syntax error near line"));
    assert!(
        report.ends_with("9 finding(s) across 5 file(s).\n"),
        "report ended with: {:?}",
        report.lines().last()
    );
}

#[test]
fn test_json_report_round_trips() {
    let results = scan_fixture_dir();
    let json = render_json(&results).expect("serialization should succeed");
    let parsed: Vec<ScanResult> = serde_json::from_str(&json).expect("report should parse back");

    assert_eq!(parsed.len(), results.len());
    for (before, after) in results.iter().zip(&parsed) {
        assert_eq!(before.file_path, after.file_path);
        assert_eq!(before.findings.len(), after.findings.len());
    }
}
