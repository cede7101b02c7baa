//! Variable resolution within an enclosing function body.

use crate::ast::{Ast, NodeId, NodeKind};

use super::expr::resolve_text;

/// Resolve a variable use to the text of its most recent assignment.
///
/// The scope is the nearest enclosing function-like ancestor; a use outside
/// any function resolves to nothing. Among assignments to the same name that
/// appear on earlier lines, the latest one whose right-hand side folds to a
/// non-empty string wins. Branches are not modeled, so a conditional
/// reassignment above the use shadows the original value.
pub fn resolve_variable(ast: &Ast, var: NodeId) -> Option<String> {
    let name = ast.variable_name(var)?;
    let scope = ast
        .ancestors(var)
        .find(|&ancestor| ast.kind(ancestor).is_function_like())?;
    let use_line = ast.line(var);

    let mut best: Option<String> = None;
    let mut best_line = 0u32;
    let mut stack = vec![scope];
    while let Some(id) = stack.pop() {
        if let NodeKind::Assignment { target, value } = ast.kind(id) {
            if ast.variable_name(*target) == Some(name) {
                let line = ast.line(id);
                if line < use_line && line > best_line {
                    let text = resolve_text(ast, *value);
                    if !text.is_empty() {
                        best = Some(text);
                        best_line = line;
                    }
                }
            }
        }
        let mut children = ast.kind(id).children();
        children.reverse();
        stack.extend(children);
    }
    best
}
