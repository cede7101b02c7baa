//! Report rendering.
//!
//! The text form groups each file's findings into fixed sections so related
//! patterns sit together no matter where they appear in the file; the JSON
//! form is the serialized [`ScanResult`] list for tooling.

use crate::error::Result;
use crate::scan::{Category, Finding, ScanResult};

struct CategoryInfo {
    category: Category,
    title: &'static str,
    label: &'static str,
}

/// Section order of the text report.
const CATEGORY_INFO: &[CategoryInfo] = &[
    CategoryInfo {
        category: Category::FilterHook,
        title: "Package Rate Filters",
        label: "Modifies shipping rates",
    },
    CategoryInfo {
        category: Category::FeeHook,
        title: "Cart Fee Hooks",
        label: "Adjusts cart fees/totals",
    },
    CategoryInfo {
        category: Category::AddRateCall,
        title: "add_rate() Calls",
        label: "Adds a custom rate",
    },
    CategoryInfo {
        category: Category::NewRateObject,
        title: "new WC_Shipping_Rate",
        label: "Creates a rate object",
    },
    CategoryInfo {
        category: Category::UnsetRate,
        title: "unset($rates[])",
        label: "Removes a rate",
    },
    CategoryInfo {
        category: Category::AddFee,
        title: "add_fee() Calls",
        label: "Adds a cart fee",
    },
    CategoryInfo {
        category: Category::ErrorAdd,
        title: "Checkout validation ($errors->add)",
        label: "Checkout rule",
    },
];

const EMPTY_STATE: &str = "No shipping-related hooks or methods found.";

/// Render results as a human-readable report.
pub fn render_text(results: &[ScanResult]) -> String {
    let mut out = String::new();
    let mut total = 0usize;

    for result in results {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("Scanning {}\n", result.file_path));
        if let Some(error) = &result.parse_error {
            out.push_str(&format!("  (!) {error}\n"));
        }
        if result.findings.is_empty() {
            if result.parse_error.is_none() {
                out.push_str(&format!("  {EMPTY_STATE}\n"));
            }
            continue;
        }
        total += result.findings.len();
        for info in CATEGORY_INFO {
            let findings: Vec<&Finding> = result
                .findings
                .iter()
                .filter(|finding| finding.category == info.category)
                .collect();
            if findings.is_empty() {
                continue;
            }
            out.push_str(&format!("  {}\n", info.title));
            for finding in findings {
                out.push_str(&format!(
                    "  - {} — {} (line {})\n",
                    info.label, finding.description, finding.line
                ));
                if let Some(snippet) = &finding.snippet {
                    for row in snippet.lines() {
                        out.push_str(&format!("      {row}\n"));
                    }
                }
            }
        }
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(&format!(
        "{total} finding(s) across {} file(s).\n",
        results.len()
    ));
    out
}

/// Render results as pretty-printed JSON.
pub fn render_json(results: &[ScanResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}
