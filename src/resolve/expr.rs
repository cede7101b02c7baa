//! Best-effort folding of PHP expressions into display strings.
//!
//! [`resolve_text`] follows the shapes WooCommerce snippets actually use for
//! user-facing strings (literals, interpolation, concatenation, i18n
//! wrappers, `sprintf`). Everything else degrades to a `{placeholder}`
//! naming the expression, never an error, so descriptions always render.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{Ast, BinaryOp, NodeId, NodeKind, StringPart};

/// Translation wrappers whose first argument is the source text.
static I18N_FUNCTIONS: phf::Set<&'static str> = phf::phf_set! {
    "__",
    "esc_html__",
    "esc_attr__",
    "_x",
    "_nx",
    "_ex",
};

/// Conversion specifiers `sprintf` substitutes, including `%%`.
static SPRINTF_SPECIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[%bcdeEufFgGosxX]").expect("Invalid regex"));

/// Fold an expression into the string it would produce at runtime, as far as
/// that is knowable statically. The result is empty only when the expression
/// is an (effectively) empty literal.
pub fn resolve_text(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::StringLiteral { value } => value.clone(),
        NodeKind::InterpolatedString { parts } => parts
            .iter()
            .map(|part| match part {
                StringPart::Literal(text) => text.clone(),
                StringPart::Expr(expr) => placeholder(ast, *expr),
            })
            .collect(),
        NodeKind::BinaryOp {
            op: BinaryOp::Concat,
            left,
            right,
        } => {
            let mut text = resolve_text(ast, *left);
            text.push_str(&resolve_text(ast, *right));
            text
        }
        NodeKind::FuncCall { name, args } => {
            let callee = name.to_ascii_lowercase();
            if I18N_FUNCTIONS.contains(callee.as_str()) {
                if let Some(&message) = args.first() {
                    return resolve_text(ast, message);
                }
            }
            if callee == "sprintf" && !args.is_empty() {
                return resolve_sprintf(ast, args);
            }
            placeholder(ast, id)
        }
        _ => placeholder(ast, id),
    }
}

/// Resolved text when it is meaningful on its own, placeholder otherwise.
pub fn resolve_or_placeholder(ast: &Ast, id: NodeId) -> String {
    let text = resolve_text(ast, id);
    if !text.is_empty() && !text.starts_with('{') {
        text
    } else {
        placeholder(ast, id)
    }
}

/// Render an expression as a `{...}` placeholder naming its shape, so a
/// reader can tell which runtime value would appear there.
pub fn placeholder(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::Variable { name } => format!("{{{name}}}"),
        NodeKind::ArrayDimFetch { base, index } => {
            let dim = match index {
                Some(index) => {
                    let text = resolve_text(ast, *index);
                    if text.is_empty() {
                        placeholder(ast, *index)
                    } else {
                        text
                    }
                }
                None => String::new(),
            };
            let base = placeholder(ast, *base);
            let base = base.trim_matches(|c| c == '{' || c == '}');
            if base.is_empty() {
                format!("{{array[{dim}]}}")
            } else {
                format!("{{{base}[{dim}]}}")
            }
        }
        NodeKind::PropertyFetch { object, property } => {
            let object = placeholder(ast, *object);
            let object = object.trim_matches(|c| c == '{' || c == '}');
            format!("{{{object}->{property}}}")
        }
        NodeKind::MethodCall {
            receiver, method, ..
        } => {
            let receiver = placeholder(ast, *receiver);
            let receiver = receiver.trim_matches(|c| c == '{' || c == '}');
            format!("{{{receiver}->{method}()}}")
        }
        NodeKind::StaticCall { class, method, .. } => format!("{{{class}::{method}()}}"),
        NodeKind::StringLiteral { value } => value.clone(),
        NodeKind::NumberLiteral { value } => number_text(*value),
        NodeKind::ConstFetch { name } => format!("{{{name}}}"),
        NodeKind::FuncCall { name, .. } => format!("{{{name}()}}"),
        NodeKind::BinaryOp {
            op: BinaryOp::Concat,
            ..
        } => resolve_text(ast, id),
        _ => "{?}".to_string(),
    }
}

/// PHP-style number rendering: integral floats print without a decimal part.
pub(crate) fn number_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

fn resolve_sprintf(ast: &Ast, args: &[NodeId]) -> String {
    let format = resolve_text(ast, args[0]);
    let mut next = 1;
    SPRINTF_SPECIFIER
        .replace_all(&format, |caps: &regex::Captures<'_>| {
            if &caps[0] == "%%" {
                return "%".to_string();
            }
            match args.get(next) {
                Some(&arg) => {
                    next += 1;
                    placeholder(ast, arg)
                }
                None => "{?}".to_string(),
            }
        })
        .into_owned()
}
