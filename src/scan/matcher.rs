//! Pattern rules for shipping-related constructs.
//!
//! Each rule inspects a single node; the driver walks the whole arena in
//! source order. Function, method, and class names match case-insensitively
//! the way PHP resolves them; variable names stay case-sensitive.

use crate::ast::{Ast, NodeId, NodeKind};

use super::Category;

/// Filter through which WooCommerce exposes the package's shipping rates.
pub(crate) const PACKAGE_RATES_HOOK: &str = "woocommerce_package_rates";

/// Action fired while cart fees are being calculated.
pub(crate) const CART_FEES_HOOK: &str = "woocommerce_cart_calculate_fees";

/// Conventional name of the rates array in rate-filter callbacks.
pub(crate) const RATES_VARIABLE: &str = "rates";

/// Conventional name of the `WP_Error` bag in checkout validation hooks.
pub(crate) const ERRORS_VARIABLE: &str = "errors";

pub(crate) const RATE_CLASS: &str = "WC_Shipping_Rate";

/// Both registration functions are accepted for both hooks; themes mix
/// them up and WordPress treats filters and actions interchangeably.
pub(crate) const HOOK_REGISTRATION_FUNCTIONS: &[&str] = &["add_filter", "add_action"];

/// Walk the arena in source order and collect every match.
pub(crate) fn matches(ast: &Ast) -> Vec<(NodeId, Category)> {
    let mut out = Vec::new();
    if ast.is_empty() {
        return out;
    }
    let mut stack = vec![ast.root()];
    while let Some(id) = stack.pop() {
        if let Some(category) = classify(ast, id) {
            out.push((id, category));
        }
        let mut children = ast.kind(id).children();
        children.reverse();
        stack.extend(children);
    }
    out
}

/// Categorize a single node, if it matches any rule.
pub(crate) fn classify(ast: &Ast, id: NodeId) -> Option<Category> {
    match ast.kind(id) {
        NodeKind::FuncCall { name, args } => {
            if !HOOK_REGISTRATION_FUNCTIONS
                .iter()
                .any(|func| name.eq_ignore_ascii_case(func))
            {
                return None;
            }
            let &hook = args.first()?;
            match ast.string_value(hook)? {
                PACKAGE_RATES_HOOK => Some(Category::FilterHook),
                CART_FEES_HOOK => Some(Category::FeeHook),
                _ => None,
            }
        }
        NodeKind::MethodCall {
            receiver, method, ..
        } => {
            if method.eq_ignore_ascii_case("add_rate") {
                Some(Category::AddRateCall)
            } else if method.eq_ignore_ascii_case("add_fee") {
                Some(Category::AddFee)
            } else if method.eq_ignore_ascii_case("add")
                && ast.variable_name(*receiver) == Some(ERRORS_VARIABLE)
            {
                Some(Category::ErrorAdd)
            } else {
                None
            }
        }
        NodeKind::NewObject { class, .. } => class
            .eq_ignore_ascii_case(RATE_CLASS)
            .then_some(Category::NewRateObject),
        NodeKind::Unset { targets } => {
            let &target = targets.first()?;
            let NodeKind::ArrayDimFetch { base, .. } = ast.kind(target) else {
                return None;
            };
            (ast.variable_name(*base) == Some(RATES_VARIABLE)).then_some(Category::UnsetRate)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{lower, php};

    fn categories(source: &str) -> Vec<Category> {
        let tree = php::parse(source, "matcher.php").unwrap();
        let ast = lower(&tree, source).ast;
        matches(&ast)
            .into_iter()
            .map(|(_, category)| category)
            .collect()
    }

    #[test]
    fn hook_registrations_match_on_the_hook_name() {
        assert_eq!(
            categories("<?php\nadd_filter('woocommerce_package_rates', 'cb', 10, 2);\n"),
            vec![Category::FilterHook]
        );
        assert_eq!(
            categories("<?php\nadd_action('woocommerce_cart_calculate_fees', 'cb');\n"),
            vec![Category::FeeHook]
        );
        // Mixed-up registration functions still register the hook.
        assert_eq!(
            categories("<?php\nadd_action('woocommerce_package_rates', 'cb');\n"),
            vec![Category::FilterHook]
        );
        assert_eq!(
            categories("<?php\nadd_filter('woocommerce_cart_calculate_fees', 'cb');\n"),
            vec![Category::FeeHook]
        );
    }

    #[test]
    fn unrelated_hooks_and_dynamic_names_do_not_match() {
        assert!(categories("<?php\nadd_filter('the_content', 'cb');\n").is_empty());
        assert!(categories("<?php\nadd_filter($hook, 'cb');\n").is_empty());
        assert!(categories("<?php\nremove_filter('woocommerce_package_rates', 'cb');\n").is_empty());
    }

    #[test]
    fn rate_and_fee_method_calls_match_any_receiver() {
        assert_eq!(
            categories("<?php\n$this->add_rate($args);\n"),
            vec![Category::AddRateCall]
        );
        assert_eq!(
            categories("<?php\nWC()->cart->ADD_FEE('Handling', 5);\n"),
            vec![Category::AddFee]
        );
    }

    #[test]
    fn rate_object_instantiation_matches_case_insensitively() {
        assert_eq!(
            categories("<?php\n$rate = new WC_Shipping_Rate('id1', 'Label', 10);\n"),
            vec![Category::NewRateObject]
        );
        assert_eq!(
            categories("<?php\n$rate = new wc_shipping_rate('id1');\n"),
            vec![Category::NewRateObject]
        );
        assert!(categories("<?php\n$x = new WC_Order();\n").is_empty());
    }

    #[test]
    fn unset_matches_only_the_rates_array() {
        assert_eq!(
            categories("<?php\nunset($rates['flat_rate:1']);\n"),
            vec![Category::UnsetRate]
        );
        assert_eq!(
            categories("<?php\nunset($rates[$key]);\n"),
            vec![Category::UnsetRate]
        );
        assert!(categories("<?php\nunset($fees['x']);\n").is_empty());
        assert!(categories("<?php\nunset($rates);\n").is_empty());
    }

    #[test]
    fn error_adds_require_the_errors_bag() {
        assert_eq!(
            categories("<?php\n$errors->add('shipping', 'Blocked');\n"),
            vec![Category::ErrorAdd]
        );
        assert!(categories("<?php\n$list->add('shipping', 'Blocked');\n").is_empty());
    }

    #[test]
    fn matches_come_back_in_source_order() {
        let source = "<?php\nadd_filter('woocommerce_package_rates', 'cb');\nfunction cb($rates) {\n    unset($rates['a']);\n    $rate = new WC_Shipping_Rate('id1');\n    return $rates;\n}\n";
        let tree = php::parse(source, "order.php").unwrap();
        let ast = lower(&tree, source).ast;
        let lines: Vec<u32> = matches(&ast).iter().map(|&(id, _)| ast.line(id)).collect();
        assert_eq!(lines, vec![2, 4, 5]);
    }

    #[test]
    fn matches_inside_closures_and_methods_are_found() {
        let source = "<?php\nclass Rate_Rules {\n    public function hooks() {\n        add_filter('woocommerce_package_rates', [$this, 'filter'], 10, 2);\n    }\n    public function filter($rates, $package) {\n        unset($rates['free_shipping:2']);\n        return $rates;\n    }\n}\n";
        assert_eq!(
            categories(source),
            vec![Category::FilterHook, Category::UnsetRate]
        );
    }
}
