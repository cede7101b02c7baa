//! Lowering from the tree-sitter concrete syntax tree to the typed arena.
//!
//! The lowering classifies grammar nodes into [`NodeKind`] variants, unwraps
//! argument and parenthesis wrappers, decodes string escapes, and flattens
//! statement blocks so that a statement's parent is the construct that
//! governs it (the way a statement-level AST reads). Unclassified constructs
//! become [`NodeKind::Other`] with their children intact, keeping every walk
//! total. Parent links are rebuilt from the ownership structure at the end.

use tree_sitter::{Node as TsNode, Tree};

use crate::ast::node::{Ast, BinaryOp, Node, NodeId, NodeKind, StringPart};

/// Result of lowering one file.
pub struct Lowered {
    pub ast: Ast,
    /// 1-based line of the first syntax error, when the tree contains any.
    pub error_line: Option<u32>,
}

/// Lower a parsed tree into the typed arena.
pub fn lower(tree: &Tree, source: &str) -> Lowered {
    let mut lowerer = Lowerer {
        src: source.as_bytes(),
        ast: Ast::default(),
    };
    let root = tree.root_node();
    lowerer.lower_node(root);
    lowerer.ast.link_parents();
    Lowered {
        ast: lowerer.ast,
        error_line: first_error_line(root),
    }
}

struct Lowerer<'a> {
    src: &'a [u8],
    ast: Ast,
}

impl<'a> Lowerer<'a> {
    fn text(&self, node: TsNode) -> &'a str {
        node.utf8_text(self.src).unwrap_or("")
    }

    fn alloc(&mut self, line: u32) -> NodeId {
        self.ast.push(Node {
            kind: NodeKind::Other { children: Vec::new() },
            line,
        })
    }

    // =========================================================================
    // Node classification
    // =========================================================================

    fn lower_node(&mut self, node: TsNode<'a>) -> NodeId {
        let node = deparenthesize(node);
        let line = node.start_position().row as u32 + 1;
        // Reserve the slot first so ids come out in pre-order.
        let id = self.alloc(line);

        let kind = match node.kind() {
            "program" => NodeKind::Program {
                body: self.lower_named_children(node),
            },

            "function_definition" | "method_declaration" => NodeKind::Function {
                name: node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string()),
                body: self.lower_body_field(node),
            },
            "anonymous_function"
            | "anonymous_function_creation_expression"
            | "arrow_function" => NodeKind::Function {
                name: None,
                body: self.lower_body_field(node),
            },

            "if_statement" | "else_if_clause" => self.lower_if(node),
            "else_clause" => NodeKind::Other {
                children: self.lower_body_field(node),
            },

            "assignment_expression" => {
                match (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("right"),
                ) {
                    (Some(left), Some(right)) => {
                        let target = self.lower_node(left);
                        let value = self.lower_node(right);
                        NodeKind::Assignment { target, value }
                    }
                    _ => NodeKind::Other {
                        children: self.lower_named_children(node),
                    },
                }
            }

            "function_call_expression" => self.lower_func_call(node),
            "member_call_expression" | "nullsafe_member_call_expression" => {
                self.lower_method_call(node)
            }
            "scoped_call_expression" => self.lower_scoped_call(node),
            "object_creation_expression" => self.lower_new(node),

            "unset_statement" => {
                let mut targets = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() != "comment" {
                        targets.push(child);
                    }
                }
                let targets = targets
                    .into_iter()
                    .map(|target| self.lower_node(target))
                    .collect();
                NodeKind::Unset { targets }
            }

            "variable_name" => NodeKind::Variable {
                name: self.text(node).trim_start_matches('$').to_string(),
            },

            "subscript_expression" => {
                let mut exprs = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() != "comment" {
                        exprs.push(child);
                    }
                }
                match exprs.split_first() {
                    Some((&base, rest)) => {
                        let base = self.lower_node(base);
                        let index = rest.first().map(|&index| self.lower_node(index));
                        NodeKind::ArrayDimFetch { base, index }
                    }
                    None => NodeKind::Other { children: Vec::new() },
                }
            }

            "member_access_expression" | "nullsafe_member_access_expression" => {
                match (
                    node.child_by_field_name("object"),
                    node.child_by_field_name("name"),
                ) {
                    (Some(object), Some(name)) if name.kind() == "name" => {
                        let property = self.text(name).to_string();
                        NodeKind::PropertyFetch {
                            object: self.lower_node(object),
                            property,
                        }
                    }
                    _ => NodeKind::Other {
                        children: self.lower_named_children(node),
                    },
                }
            }

            "name" | "qualified_name" | "relative_scope" => NodeKind::ConstFetch {
                name: normalize_name(self.text(node)),
            },
            "boolean" | "null" => NodeKind::ConstFetch {
                name: self.text(node).to_string(),
            },
            // `Foo::class` is a compile-time string in PHP; fold it here so
            // callback descriptions can use the class name directly.
            "class_constant_access_expression" => {
                let text = normalize_name(self.text(node));
                match text.strip_suffix("::class") {
                    Some(class) => NodeKind::StringLiteral {
                        value: class.trim().to_string(),
                    },
                    None => NodeKind::ConstFetch { name: text },
                }
            }

            "string" => self.lower_single_quoted(node),
            "encapsed_string" | "heredoc" | "nowdoc" => self.lower_interpolated(node),

            "integer" => NodeKind::NumberLiteral {
                value: parse_int_literal(self.text(node)),
            },
            "float" => NodeKind::NumberLiteral {
                value: self
                    .text(node)
                    .replace('_', "")
                    .parse()
                    .unwrap_or(0.0),
            },

            "array_creation_expression" => {
                let mut items = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() != "array_element_initializer" {
                        continue;
                    }
                    if let Some(value) = last_named_value(child, None) {
                        items.push(self.lower_node(value));
                    }
                }
                NodeKind::ArrayLiteral { items }
            }

            "binary_expression" => {
                match (
                    node.child_by_field_name("left"),
                    node.child_by_field_name("operator"),
                    node.child_by_field_name("right"),
                ) {
                    (Some(left), Some(op), Some(right)) => {
                        let op = binary_op(op.kind());
                        let left = self.lower_node(left);
                        let right = self.lower_node(right);
                        NodeKind::BinaryOp { op, left, right }
                    }
                    _ => NodeKind::Other {
                        children: self.lower_named_children(node),
                    },
                }
            }

            "unary_op_expression" => {
                let operator = node.child(0).map(|c| c.kind());
                match (operator, last_named_value(node, None)) {
                    (Some("!"), Some(operand)) => NodeKind::BooleanNot {
                        operand: self.lower_node(operand),
                    },
                    (_, Some(operand)) => NodeKind::Other {
                        children: vec![self.lower_node(operand)],
                    },
                    _ => NodeKind::Other { children: Vec::new() },
                }
            }

            _ => NodeKind::Other {
                children: self.lower_named_children(node),
            },
        };

        self.ast.node_mut(id).kind = kind;
        id
    }

    fn lower_if(&mut self, node: TsNode<'a>) -> NodeKind {
        let condition = node
            .child_by_field_name("condition")
            .map(|cond| self.lower_node(cond));
        let mut body = Vec::new();
        if let Some(block) = node.child_by_field_name("body") {
            self.collect_child(block, &mut body);
        }
        let mut alternatives = Vec::new();
        {
            let mut cursor = node.walk();
            for alt in node.children_by_field_name("alternative", &mut cursor) {
                alternatives.push(alt);
            }
        }
        for alt in alternatives {
            self.collect_child(alt, &mut body);
        }
        match condition {
            Some(condition) => NodeKind::If { condition, body },
            None => NodeKind::Other { children: body },
        }
    }

    fn lower_func_call(&mut self, node: TsNode<'a>) -> NodeKind {
        let name = node
            .child_by_field_name("function")
            .filter(|callee| matches!(callee.kind(), "name" | "qualified_name"))
            .map(|callee| normalize_name(self.text(callee)));
        match name {
            Some(name) => NodeKind::FuncCall {
                name,
                args: self.lower_args(node.child_by_field_name("arguments")),
            },
            // Dynamic callee: `$fn(...)`. Keep arguments walkable.
            None => NodeKind::Other {
                children: self.lower_named_children(node),
            },
        }
    }

    fn lower_method_call(&mut self, node: TsNode<'a>) -> NodeKind {
        match (
            node.child_by_field_name("object"),
            node.child_by_field_name("name"),
        ) {
            (Some(object), Some(name)) if name.kind() == "name" => {
                let method = self.text(name).to_string();
                NodeKind::MethodCall {
                    receiver: self.lower_node(object),
                    method,
                    args: self.lower_args(node.child_by_field_name("arguments")),
                }
            }
            _ => NodeKind::Other {
                children: self.lower_named_children(node),
            },
        }
    }

    fn lower_scoped_call(&mut self, node: TsNode<'a>) -> NodeKind {
        match (
            node.child_by_field_name("scope"),
            node.child_by_field_name("name"),
        ) {
            (Some(scope), Some(name))
                if matches!(scope.kind(), "name" | "qualified_name" | "relative_scope")
                    && name.kind() == "name" =>
            {
                NodeKind::StaticCall {
                    class: normalize_name(self.text(scope)),
                    method: self.text(name).to_string(),
                    args: self.lower_args(node.child_by_field_name("arguments")),
                }
            }
            _ => NodeKind::Other {
                children: self.lower_named_children(node),
            },
        }
    }

    fn lower_new(&mut self, node: TsNode<'a>) -> NodeKind {
        let mut class = None;
        let mut arguments = None;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "name" | "qualified_name" if class.is_none() => {
                    class = Some(normalize_name(self.text(child)));
                }
                "arguments" => arguments = Some(child),
                _ => {}
            }
        }
        match class {
            Some(class) => NodeKind::NewObject {
                class,
                args: self.lower_args(arguments),
            },
            // `new $class(...)` stays generic.
            None => NodeKind::Other {
                children: self.lower_named_children(node),
            },
        }
    }

    // =========================================================================
    // Strings
    // =========================================================================

    fn lower_single_quoted(&mut self, node: TsNode<'a>) -> NodeKind {
        let mut value = String::new();
        let mut has_children = false;
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            has_children = true;
            match child.kind() {
                "string_content" => value.push_str(self.text(child)),
                "escape_sequence" => value.push_str(&unescape_sequence(self.text(child))),
                _ => {}
            }
        }
        if !has_children {
            value = strip_quotes(self.text(node)).to_string();
        }
        NodeKind::StringLiteral { value }
    }

    fn lower_interpolated(&mut self, node: TsNode<'a>) -> NodeKind {
        let mut parts = Vec::new();
        self.collect_string_parts(node, &mut parts);
        if parts
            .iter()
            .all(|part| matches!(part, StringPart::Literal(_)))
        {
            // No interpolation: collapse to a plain literal.
            let value = parts
                .iter()
                .map(|part| match part {
                    StringPart::Literal(text) => text.as_str(),
                    StringPart::Expr(_) => "",
                })
                .collect();
            NodeKind::StringLiteral { value }
        } else {
            NodeKind::InterpolatedString { parts }
        }
    }

    fn collect_string_parts(&mut self, node: TsNode<'a>, parts: &mut Vec<StringPart>) {
        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            children.push(child);
        }
        for child in children {
            match child.kind() {
                "string_content" => {
                    parts.push(StringPart::Literal(self.text(child).to_string()));
                }
                "escape_sequence" => {
                    parts.push(StringPart::Literal(unescape_sequence(self.text(child))));
                }
                "heredoc_body" | "nowdoc_body" => self.collect_string_parts(child, parts),
                "heredoc_start" | "heredoc_end" | "comment" => {}
                _ => {
                    let id = self.lower_node(child);
                    parts.push(StringPart::Expr(id));
                }
            }
        }
    }

    // =========================================================================
    // Structure helpers
    // =========================================================================

    /// Lower the `body` field, flattening any statement block.
    fn lower_body_field(&mut self, node: TsNode<'a>) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            self.collect_child(body, &mut out);
        }
        out
    }

    fn lower_named_children(&mut self, node: TsNode<'a>) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            children.push(child);
        }
        for child in children {
            self.collect_child(child, &mut out);
        }
        out
    }

    /// Append `node` to `out`, hoisting the contents of wrapper constructs
    /// (blocks, expression statements, class bodies) so that statements hang
    /// directly off the construct that governs them.
    fn collect_child(&mut self, node: TsNode<'a>, out: &mut Vec<NodeId>) {
        match node.kind() {
            "comment" | "php_tag" | "text" | "text_interpolation" => {}
            "compound_statement" | "colon_block" | "expression_statement" | "declaration_list" => {
                let mut children = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    children.push(child);
                }
                for child in children {
                    self.collect_child(child, out);
                }
            }
            _ => out.push(self.lower_node(node)),
        }
    }

    fn lower_args(&mut self, arguments: Option<TsNode<'a>>) -> Vec<NodeId> {
        let Some(arguments) = arguments else {
            return Vec::new();
        };
        let mut children = Vec::new();
        let mut cursor = arguments.walk();
        for child in arguments.named_children(&mut cursor) {
            children.push(child);
        }
        let mut out = Vec::new();
        for child in children {
            match child.kind() {
                "argument" => {
                    let label = child.child_by_field_name("name");
                    if let Some(expr) = last_named_value(child, label) {
                        out.push(self.lower_node(expr));
                    }
                }
                "comment" => {}
                _ => out.push(self.lower_node(child)),
            }
        }
        out
    }
}

// =============================================================================
// Free helpers
// =============================================================================

fn deparenthesize(mut node: TsNode) -> TsNode {
    while node.kind() == "parenthesized_expression" {
        match first_named_value(node) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn first_named_value(node: TsNode) -> Option<TsNode> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");
    found
}

/// Last named child that is not a comment and not `skip` (used to pick the
/// value out of `key => value` initializers and labeled arguments).
fn last_named_value<'t>(node: TsNode<'t>, skip: Option<TsNode<'t>>) -> Option<TsNode<'t>> {
    let mut cursor = node.walk();
    let mut value = None;
    for child in node.named_children(&mut cursor) {
        if child.kind() == "comment" {
            continue;
        }
        if let Some(skip) = skip {
            if child.id() == skip.id() {
                continue;
            }
        }
        value = Some(child);
    }
    value
}

/// `\add_filter` refers to the global function; drop the leading backslash
/// but keep interior namespace separators so `Foo\add_filter` stays distinct.
fn normalize_name(text: &str) -> String {
    text.trim_start_matches('\\').to_string()
}

fn binary_op(token: &str) -> BinaryOp {
    match token {
        "." => BinaryOp::Concat,
        "&&" => BinaryOp::BooleanAnd,
        "||" => BinaryOp::BooleanOr,
        "==" => BinaryOp::Equal,
        "!=" | "<>" => BinaryOp::NotEqual,
        "===" => BinaryOp::Identical,
        "!==" => BinaryOp::NotIdentical,
        "<" => BinaryOp::Less,
        "<=" => BinaryOp::LessEqual,
        ">" => BinaryOp::Greater,
        ">=" => BinaryOp::GreaterEqual,
        _ if token.eq_ignore_ascii_case("and") => BinaryOp::BooleanAnd,
        _ if token.eq_ignore_ascii_case("or") => BinaryOp::BooleanOr,
        _ => BinaryOp::Other,
    }
}

fn strip_quotes(raw: &str) -> &str {
    let raw = raw
        .strip_prefix('b')
        .or_else(|| raw.strip_prefix('B'))
        .unwrap_or(raw);
    let raw = raw
        .strip_prefix('\'')
        .or_else(|| raw.strip_prefix('"'))
        .unwrap_or(raw);
    raw.strip_suffix('\'')
        .or_else(|| raw.strip_suffix('"'))
        .unwrap_or(raw)
}

/// Decode one escape sequence. Unknown forms (octal, hex, unicode) are kept
/// verbatim; they do not matter for pattern descriptions.
fn unescape_sequence(raw: &str) -> String {
    let Some(rest) = raw.strip_prefix('\\') else {
        return raw.to_string();
    };
    match rest {
        "n" => "\n".to_string(),
        "t" => "\t".to_string(),
        "r" => "\r".to_string(),
        "v" => "\u{000B}".to_string(),
        "f" => "\u{000C}".to_string(),
        "e" => "\u{001B}".to_string(),
        "\\" => "\\".to_string(),
        "$" => "$".to_string(),
        "\"" => "\"".to_string(),
        "'" => "'".to_string(),
        "`" => "`".to_string(),
        _ => raw.to_string(),
    }
}

/// PHP integer literals: decimal, hex, octal (legacy and `0o`), binary,
/// with optional digit separators.
fn parse_int_literal(raw: &str) -> f64 {
    let digits = raw.replace('_', "");
    let parsed = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        i64::from_str_radix(hex, 16)
    } else if let Some(bin) = digits
        .strip_prefix("0b")
        .or_else(|| digits.strip_prefix("0B"))
    {
        i64::from_str_radix(bin, 2)
    } else if let Some(oct) = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
    {
        i64::from_str_radix(oct, 8)
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8)
    } else {
        digits.parse::<i64>()
    };
    parsed.map(|v| v as f64).unwrap_or(0.0)
}

/// Line of the first ERROR or MISSING node, if the tree has any.
fn first_error_line(root: TsNode) -> Option<u32> {
    if !root.has_error() {
        return None;
    }
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node.start_position().row as u32 + 1);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return Some(root.start_position().row as u32 + 1);
            }
        }
    }
}
