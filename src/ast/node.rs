//! Typed AST consumed by the scanner.
//!
//! The external parser produces a concrete syntax tree; [`crate::ast::lower`]
//! converts it into this arena so the matcher and resolvers work over a
//! closed set of node kinds instead of raw grammar nodes. Nodes own their
//! children by id; parent links live in a tree-wide side table filled during
//! lowering, not in the nodes themselves.

// =============================================================================
// Ids and operators
// =============================================================================

/// Index of a node in its [`Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators the scanner distinguishes.
///
/// Everything else (arithmetic, null coalescing, ...) lowers to [`BinaryOp::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Concat,
    BooleanAnd,
    BooleanOr,
    Equal,
    NotEqual,
    Identical,
    NotIdentical,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Other,
}

impl BinaryOp {
    /// Source sigil used when a comparison is rendered verbatim.
    pub fn token(self) -> &'static str {
        match self {
            BinaryOp::Concat => ".",
            BinaryOp::BooleanAnd => "&&",
            BinaryOp::BooleanOr => "||",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Identical => "===",
            BinaryOp::NotIdentical => "!==",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::Other => "?",
        }
    }

    /// True for the eight comparison operators.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Identical
                | BinaryOp::NotIdentical
                | BinaryOp::Less
                | BinaryOp::LessEqual
                | BinaryOp::Greater
                | BinaryOp::GreaterEqual
        )
    }
}

// =============================================================================
// Node kinds
// =============================================================================

/// One piece of an interpolated string: a literal fragment or an embedded
/// expression.
#[derive(Debug, Clone, PartialEq)]
pub enum StringPart {
    Literal(String),
    Expr(NodeId),
}

/// Closed set of node kinds the scanner matches on.
///
/// Constructs the grammar produces that have no entry here lower to
/// [`NodeKind::Other`] with their children intact, so walks stay total.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Translation unit root.
    Program { body: Vec<NodeId> },
    /// Named function, method, closure or arrow function. Blocks are
    /// flattened at lowering, so `body` holds the statements directly.
    Function {
        name: Option<String>,
        body: Vec<NodeId>,
    },
    /// `if` or `elseif` clause. `body` holds the governed statements plus
    /// any lowered `elseif`/`else` alternatives.
    If { condition: NodeId, body: Vec<NodeId> },
    /// `$x = expr`. Compound assignments (`.=`, `+=`) stay [`NodeKind::Other`].
    Assignment { target: NodeId, value: NodeId },
    /// Free function call with a statically known name.
    FuncCall { name: String, args: Vec<NodeId> },
    /// Method call on an object expression, e.g. `$cart->add_fee(...)`.
    MethodCall {
        receiver: NodeId,
        method: String,
        args: Vec<NodeId>,
    },
    /// Static method call, e.g. `WC_Tax::get_rates(...)`.
    StaticCall {
        class: String,
        method: String,
        args: Vec<NodeId>,
    },
    /// `new WC_Shipping_Rate(...)`.
    NewObject { class: String, args: Vec<NodeId> },
    /// `unset($rates['flat_rate'], ...)`.
    Unset { targets: Vec<NodeId> },
    /// `$name` (without the `$`).
    Variable { name: String },
    /// `$base[$index]` / `$base[]`.
    ArrayDimFetch {
        base: NodeId,
        index: Option<NodeId>,
    },
    /// `$obj->prop` with a statically known property name.
    PropertyFetch { object: NodeId, property: String },
    /// Bare constant: `MY_CONST`, `true`, `false`, `null`, `Foo::BAR`.
    ConstFetch { name: String },
    /// `'literal'` or a double-quoted string with no interpolation.
    StringLiteral { value: String },
    /// `"text $var text"`: fragments and embedded expressions in order.
    InterpolatedString { parts: Vec<StringPart> },
    /// Integer or float literal.
    NumberLiteral { value: f64 },
    /// `array(...)` / `[...]` element values (keys dropped).
    ArrayLiteral { items: Vec<NodeId> },
    BinaryOp {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
    /// `!expr`.
    BooleanNot { operand: NodeId },
    /// Construct the scanner does not classify; children keep walks total.
    Other { children: Vec<NodeId> },
}

impl NodeKind {
    /// True for function-like scopes (functions, methods, closures,
    /// arrow functions). Scope-aware variable resolution stops here.
    pub fn is_function_like(&self) -> bool {
        matches!(self, NodeKind::Function { .. })
    }

    /// Child ids in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Program { body } | NodeKind::Function { body, .. } => body.clone(),
            NodeKind::If { condition, body } => {
                let mut out = Vec::with_capacity(body.len() + 1);
                out.push(*condition);
                out.extend_from_slice(body);
                out
            }
            NodeKind::Assignment { target, value } => vec![*target, *value],
            NodeKind::FuncCall { args, .. }
            | NodeKind::StaticCall { args, .. }
            | NodeKind::NewObject { args, .. } => args.clone(),
            NodeKind::MethodCall { receiver, args, .. } => {
                let mut out = Vec::with_capacity(args.len() + 1);
                out.push(*receiver);
                out.extend_from_slice(args);
                out
            }
            NodeKind::Unset { targets } => targets.clone(),
            NodeKind::ArrayDimFetch { base, index } => match index {
                Some(index) => vec![*base, *index],
                None => vec![*base],
            },
            NodeKind::PropertyFetch { object, .. } => vec![*object],
            NodeKind::InterpolatedString { parts } => parts
                .iter()
                .filter_map(|part| match part {
                    StringPart::Expr(id) => Some(*id),
                    StringPart::Literal(_) => None,
                })
                .collect(),
            NodeKind::ArrayLiteral { items } => items.clone(),
            NodeKind::BinaryOp { left, right, .. } => vec![*left, *right],
            NodeKind::BooleanNot { operand } => vec![*operand],
            NodeKind::Variable { .. }
            | NodeKind::ConstFetch { .. }
            | NodeKind::StringLiteral { .. }
            | NodeKind::NumberLiteral { .. } => Vec::new(),
            NodeKind::Other { children } => children.clone(),
        }
    }
}

/// A node: kind tag plus 1-based source line.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub line: u32,
}

// =============================================================================
// Arena
// =============================================================================

/// Owned, parent-linked AST for one file.
///
/// Nodes are stored in depth-first pre-order, so id order is source order;
/// id 0 is the root. The arena lives for the duration of one file scan and
/// is dropped before the next file.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
}

impl Ast {
    /// Root node id. Valid for any non-empty arena.
    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All ids in source (pre-order) order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn line(&self, id: NodeId) -> u32 {
        self.nodes[id.index()].line
    }

    /// Parent id, or `None` for the root.
    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// Child ids of `id` in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).children()
    }

    /// Ancestors of `id`, nearest first. Does not yield `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { ast: self, cur: Some(id) }
    }

    /// Variable name if `id` is a [`NodeKind::Variable`].
    pub fn variable_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Variable { name } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Literal value if `id` is a [`NodeKind::StringLiteral`].
    pub fn string_value(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::StringLiteral { value } => Some(value.as_str()),
            _ => None,
        }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Rebuild the parent side table from the ownership structure.
    pub(crate) fn link_parents(&mut self) {
        self.parents = vec![None; self.nodes.len()];
        for index in 0..self.nodes.len() {
            let id = NodeId(index as u32);
            for child in self.children(id) {
                self.parents[child.index()] = Some(id);
            }
        }
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'a> {
    ast: &'a Ast,
    cur: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.cur.and_then(|id| self.ast.parent(id));
        self.cur = next;
        next
    }
}
