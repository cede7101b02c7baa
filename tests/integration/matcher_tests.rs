//! Pattern matching integration tests.
//!
//! Scans the PHP fixtures and checks which patterns surface, on which lines,
//! and in what order.

use std::path::PathBuf;

use shipscan::{scan_file, Category, ScanOptions};

/// Get the path to test fixtures.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn categories_and_lines(fixture: &str) -> Vec<(Category, u32)> {
    let path = fixtures_path().join(fixture);
    let result = scan_file(&path, &ScanOptions::default()).expect("fixture should be readable");
    assert!(
        result.parse_error.is_none(),
        "unexpected parse error in {fixture}: {:?}",
        result.parse_error
    );
    result
        .findings
        .iter()
        .map(|finding| (finding.category, finding.line))
        .collect()
}

// =============================================================================
// Hook Registration and Method Detection
// =============================================================================

#[test]
fn test_rate_rules_fixture_matches_all_four_patterns() {
    assert_eq!(
        categories_and_lines("rate_rules.php"),
        vec![
            (Category::FilterHook, 12),
            (Category::FeeHook, 13),
            (Category::UnsetRate, 23),
            (Category::AddFee, 33),
        ]
    );
}

#[test]
fn test_custom_rates_fixture_matches_rate_creation() {
    assert_eq!(
        categories_and_lines("custom_rates.php"),
        vec![
            (Category::FilterHook, 6),
            (Category::NewRateObject, 10),
            (Category::AddRateCall, 19),
        ]
    );
}

#[test]
fn test_checkout_fixture_matches_only_the_error_call() {
    assert_eq!(
        categories_and_lines("checkout_rules.php"),
        vec![(Category::ErrorAdd, 12)]
    );
}

// =============================================================================
// Non-Matches
// =============================================================================

#[test]
fn test_clean_fixture_matches_nothing() {
    assert!(
        categories_and_lines("clean.php").is_empty(),
        "unrelated hooks must not match"
    );
}
