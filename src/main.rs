//! shipscan CLI - WooCommerce shipping-rule scanner for PHP source.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use shipscan::{render_json, render_text, scan_paths, ScanOptions};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Static scanner for WooCommerce shipping rules in PHP themes and plugins.
#[derive(Parser)]
#[command(
    name = "shipscan",
    version,
    about = "Find code that changes WooCommerce shipping options",
    long_about = r#"
Find code that changes WooCommerce shipping options.

Scans PHP source for the hooks, rate objects, unset() calls, cart fees, and
checkout errors that alter which shipping methods customers see, and reports
each one with a plain-English description of the conditions guarding it.

Examples:
    shipscan wp-content/themes/storefront    # Scan a theme directory
    shipscan functions.php --snippets        # Show source context per finding
    shipscan . --format json                 # Machine-readable output
    shipscan . --strict                      # Fail the run on parse errors
"#
)]
struct Cli {
    /// Files or directories to scan (directories are walked for .php files)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Attach a source snippet to each finding
    #[arg(long)]
    snippets: bool,

    /// Context lines above and below the match in each snippet
    #[arg(long, default_value_t = 2)]
    context: usize,

    /// Exit non-zero when any file failed to read or parse
    #[arg(long)]
    strict: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity; RUST_LOG takes precedence.
    let default_directive = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = ScanOptions {
        snippets: cli.snippets,
        context_lines: cli.context,
    };

    let results = scan_paths(&cli.paths, &options);

    match cli.format {
        OutputFormat::Text => print!("{}", render_text(&results)),
        OutputFormat::Json => println!(
            "{}",
            render_json(&results).context("Failed to serialize output")?
        ),
    }

    if cli.strict {
        let failed = results
            .iter()
            .filter(|result| result.parse_error.is_some())
            .count();
        if failed > 0 {
            anyhow::bail!("{failed} file(s) failed to read or parse");
        }
    }

    Ok(())
}
