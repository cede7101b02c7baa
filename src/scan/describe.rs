//! Plain-English descriptions for matched patterns.
//!
//! The audience is a store owner reading a report, not the developer who
//! wrote the snippet, so every template leads with the effect on the store.
//! Dynamic values surface through the resolvers and keep their
//! `{placeholder}` form when they cannot be pinned down.

use crate::ast::{Ast, NodeId, NodeKind};
use crate::resolve::{
    condition_chain_text, guarded_by_free_shipping_probe, placeholder, resolve_expr_text,
    resolve_or_placeholder, resolve_text, resolve_variable,
};

use super::arrays::DeclaredArrays;
use super::Category;

/// Build the description for one finding. `None` means the node did not
/// have the shape the category implies; the caller falls back to a generic
/// description.
pub(crate) fn describe(
    ast: &Ast,
    id: NodeId,
    category: Category,
    arrays: &DeclaredArrays,
) -> Option<String> {
    match category {
        Category::FilterHook => hook_callback(ast, id).map(|cb| {
            if cb.is_empty() {
                "Theme code hooks into WooCommerce package rates to change which shipping options appear."
                    .to_string()
            } else {
                format!(
                    "Theme code hooks into WooCommerce package rates ({cb}) to change which shipping options appear."
                )
            }
        }),
        Category::FeeHook => hook_callback(ast, id).map(|cb| {
            if cb.is_empty() {
                "Runs during cart fee calculation. This can add discounts/surcharges and affect totals."
                    .to_string()
            } else {
                format!(
                    "Runs during cart fee calculation ({cb}). This can add discounts/surcharges and affect totals."
                )
            }
        }),
        Category::AddRateCall => Some(
            "Calls add_rate() to insert a custom shipping option programmatically.".to_string(),
        ),
        Category::NewRateObject => new_rate_description(ast, id, arrays),
        Category::UnsetRate => unset_rate_description(ast, id, arrays),
        Category::AddFee => add_fee_description(ast, id),
        Category::ErrorAdd => error_add_description(ast, id),
    }
}

fn hook_callback(ast: &Ast, id: NodeId) -> Option<String> {
    let NodeKind::FuncCall { args, .. } = ast.kind(id) else {
        return None;
    };
    Some(
        args.get(1)
            .map_or_else(String::new, |&cb| callback_text(ast, cb)),
    )
}

/// Render a hook callback argument: a function name or a
/// `[Class_Or_Object, 'method']` pair. Closures and anything dynamic come
/// back empty.
fn callback_text(ast: &Ast, cb: NodeId) -> String {
    if let Some(name) = ast.string_value(cb) {
        return name.to_string();
    }
    let NodeKind::ArrayLiteral { items } = ast.kind(cb) else {
        return String::new();
    };
    let Some(&method) = items.get(1) else {
        return String::new();
    };
    let Some(method) = ast.string_value(method) else {
        return String::new();
    };
    let class = items
        .first()
        .and_then(|&item| ast.string_value(item))
        .unwrap_or("");
    format!("{class}::{method}")
}

fn new_rate_description(ast: &Ast, id: NodeId, arrays: &DeclaredArrays) -> Option<String> {
    let NodeKind::NewObject { args, .. } = ast.kind(id) else {
        return None;
    };
    // new WC_Shipping_Rate(id, label, cost, taxes, method_id)
    let mut parts = Vec::new();
    let rate_id = args
        .first()
        .map_or_else(String::new, |&arg| resolve_expr_text(ast, arg));
    if !rate_id.is_empty() {
        parts.push(format!("id “{rate_id}”"));
    }
    if let Some(&label) = args.get(1) {
        let label = resolve_or_placeholder(ast, label);
        if !label.is_empty() {
            parts.push(format!("label “{label}”"));
        }
    }
    if let Some(&cost) = args.get(2) {
        let cost = resolve_or_placeholder(ast, cost);
        if !cost.is_empty() {
            parts.push(format!("cost {cost}"));
        }
    }
    let mut message =
        "Instantiates WC_Shipping_Rate directly, creating a shipping option in code.".to_string();
    if !parts.is_empty() {
        message.push_str(&format!(" Details: {}.", parts.join(", ")));
    }
    let when = condition_chain_text(ast, id, arrays);
    if !when.is_empty() {
        message.push_str(&format!(" Runs when {when}."));
    }
    Some(message)
}

fn unset_rate_description(ast: &Ast, id: NodeId, arrays: &DeclaredArrays) -> Option<String> {
    let mut message = if guarded_by_free_shipping_probe(ast, id) {
        "Removes the free shipping rate".to_string()
    } else {
        let key = unset_rate_key(ast, id);
        if key.is_empty() {
            "Removes one or more shipping rates from the available options".to_string()
        } else {
            format!("Removes a shipping rate by key ({key})")
        }
    };
    let when = condition_chain_text(ast, id, arrays);
    if !when.is_empty() {
        message.push_str(&format!(" when {when}"));
    }
    Some(message)
}

/// Key of `unset($rates[...])`: a literal when present, the resolved value
/// of a local variable, or a readable placeholder for dynamic keys.
fn unset_rate_key(ast: &Ast, unset: NodeId) -> String {
    let NodeKind::Unset { targets } = ast.kind(unset) else {
        return String::new();
    };
    let Some(&target) = targets.first() else {
        return String::new();
    };
    let NodeKind::ArrayDimFetch {
        index: Some(index), ..
    } = ast.kind(target)
    else {
        return String::new();
    };
    let index = *index;
    if let Some(value) = ast.string_value(index) {
        return value.to_string();
    }
    if matches!(ast.kind(index), NodeKind::Variable { .. }) {
        if let Some(resolved) = resolve_variable(ast, index) {
            return resolved;
        }
    }
    let text = resolve_text(ast, index);
    if text.is_empty() {
        placeholder(ast, index)
    } else {
        text
    }
}

fn add_fee_description(ast: &Ast, id: NodeId) -> Option<String> {
    let NodeKind::MethodCall { args, .. } = ast.kind(id) else {
        return None;
    };
    // add_fee(name, amount, taxable, tax_class)
    let mut parts = Vec::new();
    if let Some(&label) = args.first() {
        let label = resolve_or_placeholder(ast, label);
        if !label.is_empty() {
            parts.push(format!("label “{label}”"));
        }
    }
    if let Some(&amount) = args.get(1) {
        let amount = resolve_or_placeholder(ast, amount);
        if !amount.is_empty() {
            parts.push(format!("amount {amount}"));
        }
    }
    let mut message = "Calls add_fee() to adjust cart totals.".to_string();
    if !parts.is_empty() {
        message.push_str(&format!(" Details: {}.", parts.join(", ")));
    }
    Some(message)
}

fn error_add_description(ast: &Ast, id: NodeId) -> Option<String> {
    let NodeKind::MethodCall { args, .. } = ast.kind(id) else {
        return None;
    };
    let message = args
        .get(1)
        .map_or_else(String::new, |&msg| resolve_text(ast, msg));
    Some(if message.is_empty() {
        "Adds a checkout error message.".to_string()
    } else {
        format!(
            "Adds a checkout error message: “{message}”. Customers will be blocked until they resolve it."
        )
    })
}
