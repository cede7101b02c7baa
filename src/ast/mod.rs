//! PHP parsing and the typed syntax arena.
//!
//! [`php`] wraps the tree-sitter grammar, [`lower`] converts the concrete
//! syntax tree into the [`Ast`] arena defined in [`node`]. The arena keeps
//! parent links and 1-based line numbers so scan rules can walk upward from
//! a match to the conditionals that guard it.
//!
//! # Example
//!
//! ```
//! use shipscan::ast::{lower, php, NodeKind};
//!
//! let source = "<?php\nadd_filter('woocommerce_package_rates', 'cb');\n";
//! let tree = php::parse(source, "snippet.php")?;
//! let lowered = lower(&tree, source);
//! let calls = lowered
//!     .ast
//!     .ids()
//!     .filter(|&id| matches!(lowered.ast.kind(id), NodeKind::FuncCall { .. }))
//!     .count();
//! assert_eq!(calls, 1);
//! # Ok::<(), shipscan::ScanError>(())
//! ```

pub mod lower;
pub mod node;
pub mod php;

pub use lower::{lower, Lowered};
pub use node::{Ast, BinaryOp, Node, NodeId, NodeKind, StringPart};
