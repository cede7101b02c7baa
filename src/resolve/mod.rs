//! Static resolution of PHP expressions into human-readable text.
//!
//! Three layers build on each other:
//!
//! - [`expr`] - fold literals, concatenation, i18n wrappers, and `sprintf`
//!   into strings, with `{placeholder}` rendering for unknown parts
//! - [`scope`] - resolve a variable use to its most recent assignment
//!   within the enclosing function
//! - [`cond`] - render guard conditions as prose, including the idioms
//!   shipping-rule snippets lean on
//!
//! All of it is best effort. A value the resolver cannot pin down comes back
//! as a placeholder, never an error; scans must not fail because an
//! expression was too dynamic.

pub mod cond;
pub mod expr;
pub mod scope;

pub use cond::{condition_chain_text, condition_text, guarded_by_free_shipping_probe};
pub use expr::{placeholder, resolve_or_placeholder, resolve_text};
pub use scope::resolve_variable;

use crate::ast::{Ast, NodeId, NodeKind};

/// Resolve a variable through its assignments when possible, otherwise fall
/// back to literal text or a placeholder. This is the form most finding
/// details want: `unset($rates[$key])` should name the key that was assigned
/// a few lines up.
pub fn resolve_expr_text(ast: &Ast, id: NodeId) -> String {
    if matches!(ast.kind(id), NodeKind::Variable { .. }) {
        if let Some(value) = scope::resolve_variable(ast, id) {
            return value;
        }
    }
    expr::resolve_or_placeholder(ast, id)
}
