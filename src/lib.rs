//! shipscan - Static scanner for WooCommerce shipping-rule snippets.
//!
//! Theme and plugin code that tampers with shipping (filtering package
//! rates, adding fees, removing rates, blocking checkout) boils down to a
//! handful of recognizable PHP patterns. This library parses PHP with
//! tree-sitter, lowers it to a typed node arena, and reports each pattern
//! with a plain-English description of what it does and when it runs. The
//! analysis is purely static: nothing is executed, and anything too dynamic
//! to pin down degrades to a readable `{placeholder}`.
//!
//! # Architecture
//!
//! - **AST layer** ([`ast`]): tree-sitter parsing and lowering into a typed
//!   node arena with parent links and line numbers
//! - **Resolvers** ([`resolve`]): best-effort folding of expressions,
//!   variable assignments, and guard conditions into display text
//! - **Scanner** ([`scan`]): the pattern rules plus the file and directory
//!   drivers
//! - **Reports** ([`report`]): text and JSON rendering
//!
//! # Quick Start
//!
//! ```
//! use shipscan::{scan_source, Category, ScanOptions};
//!
//! let source = "<?php\nadd_filter('woocommerce_package_rates', 'reorder_rates', 10, 2);\n";
//! let result = scan_source(source, "functions.php", &ScanOptions::default());
//! assert_eq!(result.findings.len(), 1);
//! assert_eq!(result.findings[0].category, Category::FilterHook);
//! assert_eq!(result.findings[0].line, 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod ast;
pub mod error;
pub mod report;
pub mod resolve;
pub mod scan;

// =============================================================================
// Public Type Re-exports
// =============================================================================

// Error types - most important for users
pub use error::{Result, ScanError};

// Scan drivers and finding types
pub use scan::{scan_file, scan_paths, scan_source, Category, Finding, ScanOptions, ScanResult};

// Report rendering
pub use report::{render_json, render_text};
