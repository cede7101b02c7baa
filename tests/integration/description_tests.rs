//! Description rendering integration tests.
//!
//! Every finding carries a description written for a store owner; these
//! tests pin the full sentences produced for the fixture files, including
//! resolved strings, money formatting, and guard-condition chains.

use std::path::PathBuf;

use shipscan::{scan_file, Category, ScanOptions};

/// Get the path to test fixtures.
fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn description_of(fixture: &str, category: Category) -> String {
    let path = fixtures_path().join(fixture);
    let result = scan_file(&path, &ScanOptions::default()).expect("fixture should be readable");
    result
        .findings
        .into_iter()
        .find(|finding| finding.category == category)
        .unwrap_or_else(|| panic!("no {category} finding in {fixture}"))
        .description
}

// =============================================================================
// Hook Registrations
// =============================================================================

#[test]
fn test_filter_hook_names_a_plain_function_callback() {
    assert_eq!(
        description_of("custom_rates.php", Category::FilterHook),
        "Theme code hooks into WooCommerce package rates (dsr_add_local_delivery) to change which shipping options appear."
    );
}

#[test]
fn test_filter_hook_names_an_instance_method_callback() {
    assert_eq!(
        description_of("rate_rules.php", Category::FilterHook),
        "Theme code hooks into WooCommerce package rates (::filter_rates) to change which shipping options appear."
    );
}

#[test]
fn test_fee_hook_names_its_callback() {
    assert_eq!(
        description_of("rate_rules.php", Category::FeeHook),
        "Runs during cart fee calculation (::apply_drink_fee). This can add discounts/surcharges and affect totals."
    );
}

// =============================================================================
// Rate Changes
// =============================================================================

#[test]
fn test_unset_reads_the_whole_guard_chain() {
    assert_eq!(
        description_of("rate_rules.php", Category::UnsetRate),
        "Removes the free shipping rate when the rate is a Free Shipping method and the cart contains drinks and the non-drink subtotal is under $20"
    );
}

#[test]
fn test_new_rate_lists_details_and_membership_guard() {
    assert_eq!(
        description_of("custom_rates.php", Category::NewRateObject),
        "Instantiates WC_Shipping_Rate directly, creating a shipping option in code. Details: id “dsr_local”, label “Local Delivery”, cost 7. Runs when package['destination']['state'] is one of “NY”, “NJ”."
    );
}

#[test]
fn test_add_rate_description_is_static() {
    assert_eq!(
        description_of("custom_rates.php", Category::AddRateCall),
        "Calls add_rate() to insert a custom shipping option programmatically."
    );
}

// =============================================================================
// Fees and Checkout Errors
// =============================================================================

#[test]
fn test_add_fee_resolves_its_translated_label() {
    assert_eq!(
        description_of("rate_rules.php", Category::AddFee),
        "Calls add_fee() to adjust cart totals. Details: label “Drink Handling”, amount 4.5."
    );
}

#[test]
fn test_checkout_error_quotes_the_resolved_message() {
    assert_eq!(
        description_of("checkout_rules.php", Category::ErrorAdd),
        "Adds a checkout error message: “Shipping blocked: {reason}”. Customers will be blocked until they resolve it."
    );
}
