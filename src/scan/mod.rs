//! Scan drivers and finding types.
//!
//! [`scan_source`] runs the pattern rules over one lowered file and produces
//! a [`ScanResult`]; [`scan_file`] and [`scan_paths`] wrap it with IO,
//! directory expansion, and a parallel driver. A file that fails to parse
//! never aborts a multi-file scan: the failure lands on that file's result
//! and the remaining files are still scanned.
//!
//! # Example
//!
//! ```
//! use shipscan::{scan_source, Category, ScanOptions};
//!
//! let source = "<?php\nunset($rates['flat_rate']);\n";
//! let result = scan_source(source, "functions.php", &ScanOptions::default());
//! assert_eq!(result.findings.len(), 1);
//! assert_eq!(result.findings[0].category, Category::UnsetRate);
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::ast::{lower, php};
use crate::error::{Result, ScanError};

pub mod arrays;
mod describe;
mod matcher;

use arrays::DeclaredArrays;

/// Description used when a matched node has none of the expected shape.
pub(crate) const FALLBACK_DESCRIPTION: &str = "Matched code pattern.";

// =============================================================================
// Finding types
// =============================================================================

/// What a finding is. Serialized with snake_case names in JSON reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// `add_filter('woocommerce_package_rates', ...)` registration.
    FilterHook,
    /// `add_action('woocommerce_cart_calculate_fees', ...)` registration.
    FeeHook,
    /// `->add_rate(...)` on a shipping method.
    AddRateCall,
    /// `new WC_Shipping_Rate(...)`.
    NewRateObject,
    /// `unset($rates[...])`.
    UnsetRate,
    /// `->add_fee(...)` on the cart.
    AddFee,
    /// `$errors->add(...)` during checkout validation.
    ErrorAdd,
}

impl Category {
    pub fn key(self) -> &'static str {
        match self {
            Category::FilterHook => "filter_hook",
            Category::FeeHook => "fee_hook",
            Category::AddRateCall => "add_rate_call",
            Category::NewRateObject => "new_rate_object",
            Category::UnsetRate => "unset_rate",
            Category::AddFee => "add_fee",
            Category::ErrorAdd => "error_add",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One matched pattern in one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    /// 1-based line of the matched node.
    pub line: u32,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub snippet: Option<String>,
}

/// All findings for one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub file_path: String,
    pub findings: Vec<Finding>,
    /// Present when the file could not be read or parsed cleanly. Findings
    /// may still be reported from the recovered part of the tree.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parse_error: Option<String>,
}

impl ScanResult {
    fn failed(file_path: String, message: String) -> Self {
        ScanResult {
            file_path,
            findings: Vec::new(),
            parse_error: Some(message),
        }
    }
}

/// Knobs for the scan drivers.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Attach a source snippet to each finding.
    pub snippets: bool,
    /// Context lines above and below the match line in snippets.
    pub context_lines: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            snippets: false,
            context_lines: 2,
        }
    }
}

// =============================================================================
// Drivers
// =============================================================================

/// Scan one file's source text. `file_label` is only used for reporting.
pub fn scan_source(source: &str, file_label: &str, options: &ScanOptions) -> ScanResult {
    let start = Instant::now();
    let tree = match php::parse(source, file_label) {
        Ok(tree) => tree,
        Err(err) => return ScanResult::failed(file_label.to_string(), err.to_string()),
    };
    let lowered = lower(&tree, source);
    let ast = &lowered.ast;
    if let Some(line) = lowered.error_line {
        warn!(file = %file_label, line, "syntax error; scanning recovered tree");
    }

    let arrays = DeclaredArrays::collect(ast);
    let findings: Vec<Finding> = matcher::matches(ast)
        .into_iter()
        .map(|(node, category)| {
            let line = ast.line(node);
            Finding {
                category,
                line,
                description: describe::describe(ast, node, category, &arrays)
                    .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
                snippet: options
                    .snippets
                    .then(|| snippet(source, line, options.context_lines)),
            }
        })
        .collect();
    debug!(
        file = %file_label,
        findings = findings.len(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "scanned"
    );

    ScanResult {
        file_path: file_label.to_string(),
        findings,
        parse_error: lowered
            .error_line
            .map(|line| format!("syntax error near line {line}")),
    }
}

/// Read and scan one file. Errors only on IO; parse problems are recorded
/// on the result.
pub fn scan_file(path: &Path, options: &ScanOptions) -> Result<ScanResult> {
    let bytes = fs::read(path).map_err(|err| ScanError::io_with_path(err, path))?;
    let source = String::from_utf8_lossy(&bytes);
    Ok(scan_source(&source, &path.display().to_string(), options))
}

/// Scan files and directories in parallel. Directories expand to their
/// `.php` files in sorted order; results come back in the same order as the
/// expanded targets, one per file, with per-file failures recorded inline.
pub fn scan_paths(paths: &[PathBuf], options: &ScanOptions) -> Vec<ScanResult> {
    let targets = expand_targets(paths);
    targets
        .par_iter()
        .map(|target| match target {
            Target::File(path) => scan_file(path, options).unwrap_or_else(|err| {
                ScanResult::failed(path.display().to_string(), err.to_string())
            }),
            Target::Missing(path) => {
                ScanResult::failed(path.display().to_string(), "file not found".to_string())
            }
        })
        .collect()
}

enum Target {
    File(PathBuf),
    Missing(PathBuf),
}

/// Expand each path to scannable files, keeping missing paths so they show
/// up in the report instead of vanishing.
fn expand_targets(paths: &[PathBuf]) -> Vec<Target> {
    let mut targets = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut files: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_php(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            files.sort();
            targets.extend(files.into_iter().map(Target::File));
        } else if path.is_file() {
            targets.push(Target::File(path.clone()));
        } else {
            targets.push(Target::Missing(path.clone()));
        }
    }
    targets
}

fn is_php(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("php"))
}

/// Render the match line with `context` lines around it and a `>` marker.
fn snippet(source: &str, line: u32, context: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let target = line.saturating_sub(1) as usize;
    if target >= lines.len() {
        return String::new();
    }
    let start = target.saturating_sub(context);
    let end = (target + context + 1).min(lines.len());
    let mut rows = Vec::with_capacity(end - start);
    for (offset, text) in lines[start..end].iter().enumerate() {
        let number = start + offset + 1;
        let marker = if number == target + 1 { ">" } else { " " };
        rows.push(format!("{marker} {number:4} | {text}"));
    }
    rows.join("\n")
}
