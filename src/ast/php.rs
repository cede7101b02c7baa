//! PHP parser construction.
//!
//! The grammar is the external collaborator here: tree-sitter with the full
//! `php` variant of tree-sitter-php, which accepts whole files including the
//! `<?php` tag and inline HTML.

use tree_sitter::{Parser, Tree};

use crate::error::{Result, ScanError};

/// Create a tree-sitter parser configured for PHP.
///
/// # Errors
///
/// Returns [`ScanError::TreeSitter`] if the grammar version is incompatible
/// with the linked tree-sitter runtime.
pub fn parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_php::LANGUAGE_PHP.into())
        .map_err(|e| ScanError::TreeSitter(e.to_string()))?;
    Ok(parser)
}

/// Parse PHP source into a concrete syntax tree.
///
/// Syntax errors inside the source do not fail the parse; tree-sitter
/// recovers and marks error regions in the tree. Callers that care check
/// the lowered result's error line.
///
/// # Errors
///
/// Returns [`ScanError::Parse`] when tree-sitter produces no tree at all.
pub fn parse(source: &str, file: &str) -> Result<Tree> {
    let mut parser = parser()?;
    parser.parse(source, None).ok_or_else(|| ScanError::Parse {
        file: file.to_string(),
        message: "parser produced no tree".to_string(),
    })
}
