//! Reconstruction of guard conditions as plain English.
//!
//! Findings are far more useful when they say *when* the code runs, so the
//! scanner walks from a match up through its enclosing `if` statements and
//! renders each condition. The renderer knows the idioms rule snippets lean
//! on (the `strpos(..., 'free_shipping')` probe, subtotal comparisons,
//! `in_array` membership) and falls back to a literal rendering for the
//! rest. An unrenderable condition contributes nothing rather than failing
//! the scan.

use crate::ast::{Ast, BinaryOp, NodeId, NodeKind};
use crate::scan::arrays::DeclaredArrays;

use super::expr::{number_text, placeholder, resolve_text};

/// Upper bound on enclosing conditionals examined per match.
const MAX_CONDITIONS: usize = 4;

/// Ancestor steps searched for the free-shipping probe around an `unset`.
const FREE_SHIPPING_STEPS: usize = 2;

/// Substring-search functions accepted as rate-id probes.
const STRING_SEARCH_FUNCTIONS: &[&str] = &["strpos", "stripos"];

const FREE_SHIPPING_NEEDLE: &str = "free_shipping";
const FREE_SHIPPING_PHRASE: &str = "the rate is a Free Shipping method";

/// Variables the rule snippets use as flags, with positive and negated
/// phrasings.
const DOMAIN_VARIABLES: &[(&str, &str, &str)] = &[(
    "has_drinks",
    "the cart contains drinks",
    "the cart does not contain drinks",
)];

/// Variables holding money amounts, phrased as the quantity they measure.
const AMOUNT_VARIABLES: &[(&str, &str)] = &[("adjusted_total", "the non-drink subtotal")];

// =============================================================================
// Public entry points
// =============================================================================

/// Describe the conditionals guarding `from`, nearest first, joined with
/// " and ". At most [`MAX_CONDITIONS`] enclosing `if`s are examined and
/// duplicate phrasings collapse to one.
pub fn condition_chain_text(ast: &Ast, from: NodeId, arrays: &DeclaredArrays) -> String {
    let mut texts: Vec<String> = Vec::new();
    let mut visited = 0;
    for ancestor in ast.ancestors(from) {
        if visited == MAX_CONDITIONS {
            break;
        }
        if let NodeKind::If { condition, .. } = ast.kind(ancestor) {
            visited += 1;
            let text = condition_text(ast, *condition, arrays);
            if !text.is_empty() && !texts.contains(&text) {
                texts.push(text);
            }
        }
    }
    texts.join(" and ")
}

/// Render one condition expression as prose.
pub fn condition_text(ast: &Ast, cond: NodeId, arrays: &DeclaredArrays) -> String {
    match ast.kind(cond) {
        NodeKind::BinaryOp {
            op: op @ (BinaryOp::BooleanAnd | BinaryOp::BooleanOr),
            left,
            right,
        } => {
            let glue = if *op == BinaryOp::BooleanAnd {
                " and "
            } else {
                " or "
            };
            let left = condition_text(ast, *left, arrays);
            let right = condition_text(ast, *right, arrays);
            join_clauses(left, right, glue)
        }
        NodeKind::BinaryOp {
            op: BinaryOp::NotEqual | BinaryOp::NotIdentical,
            left,
            right,
        } if is_free_shipping_inequality(ast, *left, *right) => FREE_SHIPPING_PHRASE.to_string(),
        NodeKind::BinaryOp { op, left, right } if op.is_comparison() => {
            comparison_text(ast, *op, *left, *right)
        }
        NodeKind::BooleanNot { operand } => negation_text(ast, *operand, arrays),
        NodeKind::Variable { name } => subject_phrase(name)
            .map(str::to_string)
            .unwrap_or_else(|| simple_expr_text(ast, cond)),
        NodeKind::FuncCall { name, args }
            if name.eq_ignore_ascii_case("in_array") && args.len() >= 2 =>
        {
            membership_text(ast, args, arrays, false)
        }
        _ => simple_expr_text(ast, cond),
    }
}

/// True when `from` sits within [`FREE_SHIPPING_STEPS`] ancestors of an `if`
/// whose whole condition is the free-shipping rate-id probe. The probe must
/// be the entire condition; a probe buried in a conjunction does not count.
pub fn guarded_by_free_shipping_probe(ast: &Ast, from: NodeId) -> bool {
    ast.ancestors(from)
        .take(FREE_SHIPPING_STEPS)
        .any(|ancestor| match ast.kind(ancestor) {
            NodeKind::If { condition, .. } => is_free_shipping_check(ast, *condition),
            _ => false,
        })
}

// =============================================================================
// Ladder rungs
// =============================================================================

fn comparison_text(ast: &Ast, op: BinaryOp, left: NodeId, right: NodeId) -> String {
    if let (Some(name), NodeKind::NumberLiteral { value }) =
        (ast.variable_name(left), ast.kind(right))
    {
        if let Some(subject) = amount_phrase(name) {
            let money = money_text(*value);
            return match op {
                BinaryOp::Less => format!("{subject} is under {money}"),
                BinaryOp::LessEqual => format!("{subject} is at most {money}"),
                BinaryOp::Greater => format!("{subject} is over {money}"),
                BinaryOp::GreaterEqual => format!("{subject} is at least {money}"),
                _ => format!("{name} {} {money}", op.token()),
            };
        }
    }
    format!(
        "{} {} {}",
        simple_expr_text(ast, left),
        op.token(),
        simple_expr_text(ast, right)
    )
}

fn negation_text(ast: &Ast, operand: NodeId, arrays: &DeclaredArrays) -> String {
    match ast.kind(operand) {
        NodeKind::Variable { name } => match negated_phrase(name) {
            Some(phrase) => phrase.to_string(),
            None => format!("not {}", simple_expr_text(ast, operand)),
        },
        NodeKind::FuncCall { name, args }
            if name.eq_ignore_ascii_case("in_array") && args.len() >= 2 =>
        {
            membership_text(ast, args, arrays, true)
        }
        _ => format!("not {}", simple_expr_text(ast, operand)),
    }
}

fn membership_text(ast: &Ast, args: &[NodeId], arrays: &DeclaredArrays, negated: bool) -> String {
    let needle = simple_expr_text(ast, args[0]);
    let haystack = args[1];
    let list = match ast.kind(haystack) {
        NodeKind::Variable { name } => arrays
            .get(name)
            .filter(|values| !values.is_empty())
            .map(|values| quoted_list(values.iter().map(String::as_str))),
        NodeKind::ArrayLiteral { items } => {
            let values: Vec<&str> = items
                .iter()
                .filter_map(|&item| ast.string_value(item))
                .collect();
            (!values.is_empty()).then(|| quoted_list(values.into_iter()))
        }
        _ => None,
    };
    match (list, negated) {
        (Some(list), false) => format!("{needle} is one of {list}"),
        (Some(list), true) => format!("{needle} is not one of {list}"),
        (None, false) => format!("{needle} is in {}", simple_expr_text(ast, haystack)),
        (None, true) => format!("{needle} is not in {}", simple_expr_text(ast, haystack)),
    }
}

/// Literal rendering used where no idiom applies.
fn simple_expr_text(ast: &Ast, id: NodeId) -> String {
    match ast.kind(id) {
        NodeKind::Variable { name } => subject_phrase(name)
            .or_else(|| amount_phrase(name))
            .map(str::to_string)
            .unwrap_or_else(|| name.clone()),
        NodeKind::StringLiteral { value } => format!("'{value}'"),
        NodeKind::NumberLiteral { value } => number_text(*value),
        NodeKind::PropertyFetch { object, property } => {
            format!("{}->{property}", simple_expr_text(ast, *object))
        }
        NodeKind::ArrayDimFetch { base, index } => {
            let dim = index.map_or_else(String::new, |index| simple_expr_text(ast, index));
            format!("{}[{dim}]", simple_expr_text(ast, *base))
        }
        NodeKind::FuncCall { name, .. } => format!("{name}()"),
        NodeKind::ConstFetch { name } => name.clone(),
        _ => placeholder(ast, id),
    }
}

// =============================================================================
// Predicates and formatting helpers
// =============================================================================

fn is_free_shipping_inequality(ast: &Ast, left: NodeId, right: NodeId) -> bool {
    (is_free_shipping_probe(ast, left) && is_false_const(ast, right))
        || (is_free_shipping_probe(ast, right) && is_false_const(ast, left))
}

/// `strpos($x, 'free_shipping')` or `stripos`, with the needle resolved.
fn is_free_shipping_probe(ast: &Ast, id: NodeId) -> bool {
    let NodeKind::FuncCall { name, args } = ast.kind(id) else {
        return false;
    };
    if !STRING_SEARCH_FUNCTIONS
        .iter()
        .any(|probe| name.eq_ignore_ascii_case(probe))
    {
        return false;
    }
    let Some(&needle) = args.get(1) else {
        return false;
    };
    resolve_text(ast, needle).eq_ignore_ascii_case(FREE_SHIPPING_NEEDLE)
}

fn is_false_const(ast: &Ast, id: NodeId) -> bool {
    matches!(ast.kind(id), NodeKind::ConstFetch { name } if name.eq_ignore_ascii_case("false"))
}

fn is_free_shipping_check(ast: &Ast, cond: NodeId) -> bool {
    match ast.kind(cond) {
        NodeKind::BinaryOp {
            op: BinaryOp::NotEqual | BinaryOp::NotIdentical,
            left,
            right,
        } => is_free_shipping_inequality(ast, *left, *right),
        _ => false,
    }
}

fn join_clauses(left: String, right: String, glue: &str) -> String {
    match (left.is_empty(), right.is_empty()) {
        (false, false) => format!("{left}{glue}{right}"),
        (true, _) => right,
        (_, true) => left,
    }
}

fn quoted_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values
        .map(|value| format!("“{value}”"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Money rendering: whole amounts drop the cents.
fn money_text(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("${}", value as i64)
    } else {
        format!("${value:.2}")
    }
}

fn subject_phrase(name: &str) -> Option<&'static str> {
    DOMAIN_VARIABLES
        .iter()
        .find(|(var, _, _)| *var == name)
        .map(|(_, phrase, _)| *phrase)
}

fn negated_phrase(name: &str) -> Option<&'static str> {
    DOMAIN_VARIABLES
        .iter()
        .find(|(var, _, _)| *var == name)
        .map(|(_, _, phrase)| *phrase)
}

fn amount_phrase(name: &str) -> Option<&'static str> {
    AMOUNT_VARIABLES
        .iter()
        .find(|(var, _)| *var == name)
        .map(|(_, phrase)| *phrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{lower, php};

    fn parse(source: &str) -> Ast {
        let tree = php::parse(source, "cond.php").unwrap();
        lower(&tree, source).ast
    }

    fn first_condition_text(body: &str) -> String {
        let source = format!("<?php\n{body}\n");
        let ast = parse(&source);
        let arrays = DeclaredArrays::collect(&ast);
        let cond = ast
            .ids()
            .find_map(|id| match ast.kind(id) {
                NodeKind::If { condition, .. } => Some(*condition),
                _ => None,
            })
            .expect("if statement");
        condition_text(&ast, cond, &arrays)
    }

    fn first_unset(ast: &Ast) -> NodeId {
        ast.ids()
            .find(|&id| matches!(ast.kind(id), NodeKind::Unset { .. }))
            .expect("unset statement")
    }

    #[test]
    fn domain_flags_read_as_phrases() {
        assert_eq!(
            first_condition_text("if ($has_drinks) { echo 1; }"),
            "the cart contains drinks"
        );
        assert_eq!(
            first_condition_text("if (!$has_drinks) { echo 1; }"),
            "the cart does not contain drinks"
        );
    }

    #[test]
    fn subtotal_comparisons_read_as_money() {
        assert_eq!(
            first_condition_text("if ($adjusted_total < 20) { echo 1; }"),
            "the non-drink subtotal is under $20"
        );
        assert_eq!(
            first_condition_text("if ($adjusted_total >= 19.99) { echo 1; }"),
            "the non-drink subtotal is at least $19.99"
        );
        assert_eq!(
            first_condition_text("if ($adjusted_total <= 50) { echo 1; }"),
            "the non-drink subtotal is at most $50"
        );
        assert_eq!(
            first_condition_text("if ($adjusted_total > 100) { echo 1; }"),
            "the non-drink subtotal is over $100"
        );
    }

    #[test]
    fn equality_on_amounts_keeps_the_operator() {
        assert_eq!(
            first_condition_text("if ($adjusted_total == 20) { echo 1; }"),
            "adjusted_total == $20"
        );
    }

    #[test]
    fn conjunctions_join_with_and() {
        assert_eq!(
            first_condition_text("if ($has_drinks && $adjusted_total < 20) { echo 1; }"),
            "the cart contains drinks and the non-drink subtotal is under $20"
        );
        assert_eq!(
            first_condition_text("if ($has_drinks || $adjusted_total < 20) { echo 1; }"),
            "the cart contains drinks or the non-drink subtotal is under $20"
        );
    }

    #[test]
    fn free_shipping_probe_reads_as_phrase_in_either_order() {
        assert_eq!(
            first_condition_text(
                "if (strpos($rate->method_id, 'free_shipping') !== false) { echo 1; }"
            ),
            "the rate is a Free Shipping method"
        );
        assert_eq!(
            first_condition_text(
                "if (false !== stripos($rate->method_id, 'Free_Shipping')) { echo 1; }"
            ),
            "the rate is a Free Shipping method"
        );
    }

    #[test]
    fn ordinary_comparisons_render_literally() {
        assert_eq!(first_condition_text("if ($x != 5) { echo 1; }"), "x != 5");
        assert_eq!(
            first_condition_text("if ($method == 'flat_rate') { echo 1; }"),
            "method == 'flat_rate'"
        );
        assert_eq!(
            first_condition_text("if ($package['destination']['state'] == 'AL') { echo 1; }"),
            "package['destination']['state'] == 'AL'"
        );
    }

    #[test]
    fn membership_expands_declared_arrays() {
        assert_eq!(
            first_condition_text(
                "$no_ship = ['AL', 'MS'];\nif (in_array($state, $no_ship)) { echo 1; }"
            ),
            "state is one of “AL”, “MS”"
        );
        assert_eq!(
            first_condition_text("if (!in_array($method, ['local_pickup'])) { echo 1; }"),
            "method is not one of “local_pickup”"
        );
        assert_eq!(
            first_condition_text("if (in_array($state, wc_states())) { echo 1; }"),
            "state is in wc_states()"
        );
    }

    #[test]
    fn unknown_conditions_fall_back_to_literal_or_placeholder() {
        assert_eq!(first_condition_text("if (is_checkout()) { echo 1; }"), "is_checkout()");
        assert_eq!(first_condition_text("if ($a + $b) { echo 1; }"), "{?}");
    }

    #[test]
    fn chain_reads_nearest_condition_first() {
        let source = "<?php\nfunction filter_rates($rates) {\n    if ($adjusted_total < 20) {\n        if ($has_drinks) {\n            unset($rates['free_shipping:1']);\n        }\n    }\n    return $rates;\n}\n";
        let ast = parse(source);
        let arrays = DeclaredArrays::collect(&ast);
        assert_eq!(
            condition_chain_text(&ast, first_unset(&ast), &arrays),
            "the cart contains drinks and the non-drink subtotal is under $20"
        );
    }

    #[test]
    fn chain_deduplicates_repeated_phrasings() {
        let source =
            "<?php\nif ($has_drinks) {\n    if ($has_drinks) {\n        unset($rates['x']);\n    }\n}\n";
        let ast = parse(source);
        let arrays = DeclaredArrays::collect(&ast);
        assert_eq!(
            condition_chain_text(&ast, first_unset(&ast), &arrays),
            "the cart contains drinks"
        );
    }

    #[test]
    fn chain_stops_after_four_conditionals() {
        let source = "<?php\nif ($a) { if ($b) { if ($c) { if ($d) { if ($e) {\n    unset($rates['x']);\n} } } } }\n";
        let ast = parse(source);
        let arrays = DeclaredArrays::collect(&ast);
        assert_eq!(
            condition_chain_text(&ast, first_unset(&ast), &arrays),
            "e and d and c and b"
        );
    }

    #[test]
    fn probe_guard_is_found_within_two_steps() {
        let direct = parse(
            "<?php\nif (strpos($rate->method_id, 'free_shipping') !== false) {\n    unset($rates[$id]);\n}\n",
        );
        assert!(guarded_by_free_shipping_probe(&direct, first_unset(&direct)));

        let one_between = parse(
            "<?php\nif (strpos($rate->method_id, 'free_shipping') !== false) {\n    if ($x) {\n        unset($rates[$id]);\n    }\n}\n",
        );
        assert!(guarded_by_free_shipping_probe(&one_between, first_unset(&one_between)));
    }

    #[test]
    fn probe_guard_ignores_distant_or_compound_conditions() {
        let too_far = parse(
            "<?php\nif (strpos($rate->method_id, 'free_shipping') !== false) {\n    if ($x) {\n        if ($y) {\n            unset($rates[$id]);\n        }\n    }\n}\n",
        );
        assert!(!guarded_by_free_shipping_probe(&too_far, first_unset(&too_far)));

        let compound = parse(
            "<?php\nif ($a && strpos($rate->method_id, 'free_shipping') !== false) {\n    unset($rates[$id]);\n}\n",
        );
        assert!(!guarded_by_free_shipping_probe(&compound, first_unset(&compound)));
    }
}
