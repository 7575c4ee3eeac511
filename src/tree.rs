//! Arena syntax tree
//!
//! Every node lives in a single `Vec<Node>` owned by the [`SyntaxTree`]. Children are
//! referenced by [`NodeId`] handles, and the parent/namespace back-links are plain
//! indices, so the annotated tree has no reference cycles and is freed as one unit.

use num_bigint::BigInt;
use rustc_hash::FxHashSet;

use crate::binding::Binding;

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Byte range of a node in the source text it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// OPERATORS & MARKERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprContext {
    Load,
    Store,
    Del,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mult,
    MatMult,
    Div,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
    FloorDiv,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mult => "*",
            Operator::MatMult => "@",
            Operator::Div => "/",
            Operator::Mod => "%",
            Operator::Pow => "**",
            Operator::LShift => "<<",
            Operator::RShift => ">>",
            Operator::BitOr => "|",
            Operator::BitXor => "^",
            Operator::BitAnd => "&",
            Operator::FloorDiv => "//",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Invert => "~",
            UnaryOperator::Not => "not",
            UnaryOperator::UAdd => "+",
            UnaryOperator::USub => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    Is,
    IsNot,
    In,
    NotIn,
}

impl CmpOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            CmpOperator::Eq => "==",
            CmpOperator::NotEq => "!=",
            CmpOperator::Lt => "<",
            CmpOperator::LtE => "<=",
            CmpOperator::Gt => ">",
            CmpOperator::GtE => ">=",
            CmpOperator::Is => "is",
            CmpOperator::IsNot => "is not",
            CmpOperator::In => "in",
            CmpOperator::NotIn => "not in",
        }
    }
}

/// `!s`, `!r`, `!a` on an interpolated expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    Str,
    Repr,
    Ascii,
}

impl Conversion {
    pub fn suffix(self) -> &'static str {
        match self {
            Conversion::None => "",
            Conversion::Str => "!s",
            Conversion::Repr => "!r",
            Conversion::Ascii => "!a",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LITERALS
// ═══════════════════════════════════════════════════════════════════════════════

/// A literal leaf, tagged by its runtime type.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    /// Imaginary part of an imaginary literal such as `2j`.
    Complex(f64),
    Str(String),
    Bytes(Vec<u8>),
    Ellipsis,
}

impl Literal {
    pub fn same_value(&self, other: &Literal) -> bool {
        match (self, other) {
            (Literal::None, Literal::None) | (Literal::Ellipsis, Literal::Ellipsis) => true,
            (Literal::Bool(a), Literal::Bool(b)) => a == b,
            (Literal::Int(a), Literal::Int(b)) => a == b,
            (Literal::Float(a), Literal::Float(b)) => a.to_bits() == b.to_bits(),
            (Literal::Complex(a), Literal::Complex(b)) => a.to_bits() == b.to_bits(),
            (Literal::Str(a), Literal::Str(b)) => a == b,
            (Literal::Bytes(a), Literal::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODE KINDS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // Roots
    Module {
        body: Vec<NodeId>,
    },
    /// Eval-mode root produced when parsing a single expression.
    Expression {
        body: NodeId,
    },

    // Statements
    FunctionDef {
        name: String,
        is_async: bool,
        args: NodeId,
        body: Vec<NodeId>,
        decorators: Vec<NodeId>,
        returns: Option<NodeId>,
        type_params: Vec<NodeId>,
    },
    ClassDef {
        name: String,
        bases: Vec<NodeId>,
        keywords: Vec<NodeId>,
        body: Vec<NodeId>,
        decorators: Vec<NodeId>,
        type_params: Vec<NodeId>,
    },
    Return {
        value: Option<NodeId>,
    },
    Delete {
        targets: Vec<NodeId>,
    },
    Assign {
        targets: Vec<NodeId>,
        value: NodeId,
    },
    TypeAlias {
        name: NodeId,
        type_params: Vec<NodeId>,
        value: NodeId,
    },
    AugAssign {
        target: NodeId,
        op: Operator,
        value: NodeId,
    },
    AnnAssign {
        target: NodeId,
        annotation: NodeId,
        value: Option<NodeId>,
        simple: bool,
    },
    For {
        is_async: bool,
        target: NodeId,
        iter: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
    },
    While {
        test: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
    },
    If {
        test: NodeId,
        body: Vec<NodeId>,
        orelse: Vec<NodeId>,
    },
    With {
        is_async: bool,
        items: Vec<NodeId>,
        body: Vec<NodeId>,
    },
    Match {
        subject: NodeId,
        cases: Vec<NodeId>,
    },
    Raise {
        exc: Option<NodeId>,
        cause: Option<NodeId>,
    },
    Try {
        is_star: bool,
        body: Vec<NodeId>,
        handlers: Vec<NodeId>,
        orelse: Vec<NodeId>,
        finalbody: Vec<NodeId>,
    },
    Assert {
        test: NodeId,
        msg: Option<NodeId>,
    },
    Import {
        names: Vec<NodeId>,
    },
    ImportFrom {
        module: Option<String>,
        names: Vec<NodeId>,
        level: u32,
    },
    Global {
        names: Vec<String>,
    },
    Nonlocal {
        names: Vec<String>,
    },
    Expr {
        value: NodeId,
    },
    Pass,
    Break,
    Continue,

    // Expressions
    BoolOp {
        op: BoolOperator,
        values: Vec<NodeId>,
    },
    NamedExpr {
        target: NodeId,
        value: NodeId,
    },
    BinOp {
        left: NodeId,
        op: Operator,
        right: NodeId,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: NodeId,
    },
    Lambda {
        args: NodeId,
        body: NodeId,
    },
    IfExp {
        test: NodeId,
        body: NodeId,
        orelse: NodeId,
    },
    Dict {
        keys: Vec<Option<NodeId>>,
        values: Vec<NodeId>,
    },
    Set {
        elts: Vec<NodeId>,
    },
    ListComp {
        elt: NodeId,
        generators: Vec<NodeId>,
    },
    SetComp {
        elt: NodeId,
        generators: Vec<NodeId>,
    },
    DictComp {
        key: NodeId,
        value: NodeId,
        generators: Vec<NodeId>,
    },
    GeneratorExp {
        elt: NodeId,
        generators: Vec<NodeId>,
    },
    Await {
        value: NodeId,
    },
    Yield {
        value: Option<NodeId>,
    },
    YieldFrom {
        value: NodeId,
    },
    Compare {
        left: NodeId,
        ops: Vec<CmpOperator>,
        comparators: Vec<NodeId>,
    },
    Call {
        func: NodeId,
        args: Vec<NodeId>,
        keywords: Vec<NodeId>,
    },
    FormattedValue {
        value: NodeId,
        conversion: Conversion,
        format_spec: Option<NodeId>,
    },
    JoinedStr {
        values: Vec<NodeId>,
    },
    /// `t"..."` template string; parts share the [`NodeKind::FormattedValue`] shape.
    TemplateStr {
        values: Vec<NodeId>,
    },
    Constant {
        value: Literal,
    },
    Attribute {
        value: NodeId,
        attr: String,
        ctx: ExprContext,
    },
    Subscript {
        value: NodeId,
        slice: NodeId,
        ctx: ExprContext,
    },
    Starred {
        value: NodeId,
        ctx: ExprContext,
    },
    Name {
        id: String,
        ctx: ExprContext,
    },
    List {
        elts: Vec<NodeId>,
        ctx: ExprContext,
    },
    Tuple {
        elts: Vec<NodeId>,
        ctx: ExprContext,
    },
    Slice {
        lower: Option<NodeId>,
        upper: Option<NodeId>,
        step: Option<NodeId>,
    },

    // Auxiliary
    Comprehension {
        target: NodeId,
        iter: NodeId,
        ifs: Vec<NodeId>,
        is_async: bool,
    },
    ExceptHandler {
        type_: Option<NodeId>,
        name: Option<String>,
        body: Vec<NodeId>,
    },
    Arguments {
        posonlyargs: Vec<NodeId>,
        args: Vec<NodeId>,
        vararg: Option<NodeId>,
        kwonlyargs: Vec<NodeId>,
        kw_defaults: Vec<Option<NodeId>>,
        kwarg: Option<NodeId>,
        /// Defaults for the trailing positional parameters (posonly then regular).
        defaults: Vec<NodeId>,
    },
    Arg {
        arg: String,
        annotation: Option<NodeId>,
    },
    Keyword {
        arg: Option<String>,
        value: NodeId,
    },
    Alias {
        name: String,
        asname: Option<String>,
    },
    WithItem {
        context_expr: NodeId,
        optional_vars: Option<NodeId>,
    },
    MatchCase {
        pattern: NodeId,
        guard: Option<NodeId>,
        body: Vec<NodeId>,
    },

    // Patterns
    MatchValue {
        value: NodeId,
    },
    MatchSingleton {
        value: Literal,
    },
    MatchSequence {
        patterns: Vec<NodeId>,
    },
    MatchMapping {
        keys: Vec<NodeId>,
        patterns: Vec<NodeId>,
        rest: Option<String>,
    },
    MatchClass {
        cls: NodeId,
        patterns: Vec<NodeId>,
        kwd_attrs: Vec<String>,
        kwd_patterns: Vec<NodeId>,
    },
    MatchStar {
        name: Option<String>,
    },
    MatchAs {
        pattern: Option<NodeId>,
        name: Option<String>,
    },
    MatchOr {
        patterns: Vec<NodeId>,
    },

    // Type parameters
    TypeVar {
        name: String,
        bound: Option<NodeId>,
    },
    ParamSpec {
        name: String,
    },
    TypeVarTuple {
        name: String,
    },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Module { .. } => "Module",
            NodeKind::Expression { .. } => "Expression",
            NodeKind::FunctionDef { is_async: false, .. } => "FunctionDef",
            NodeKind::FunctionDef { is_async: true, .. } => "AsyncFunctionDef",
            NodeKind::ClassDef { .. } => "ClassDef",
            NodeKind::Return { .. } => "Return",
            NodeKind::Delete { .. } => "Delete",
            NodeKind::Assign { .. } => "Assign",
            NodeKind::TypeAlias { .. } => "TypeAlias",
            NodeKind::AugAssign { .. } => "AugAssign",
            NodeKind::AnnAssign { .. } => "AnnAssign",
            NodeKind::For { is_async: false, .. } => "For",
            NodeKind::For { is_async: true, .. } => "AsyncFor",
            NodeKind::While { .. } => "While",
            NodeKind::If { .. } => "If",
            NodeKind::With { is_async: false, .. } => "With",
            NodeKind::With { is_async: true, .. } => "AsyncWith",
            NodeKind::Match { .. } => "Match",
            NodeKind::Raise { .. } => "Raise",
            NodeKind::Try { is_star: false, .. } => "Try",
            NodeKind::Try { is_star: true, .. } => "TryStar",
            NodeKind::Assert { .. } => "Assert",
            NodeKind::Import { .. } => "Import",
            NodeKind::ImportFrom { .. } => "ImportFrom",
            NodeKind::Global { .. } => "Global",
            NodeKind::Nonlocal { .. } => "Nonlocal",
            NodeKind::Expr { .. } => "Expr",
            NodeKind::Pass => "Pass",
            NodeKind::Break => "Break",
            NodeKind::Continue => "Continue",
            NodeKind::BoolOp { .. } => "BoolOp",
            NodeKind::NamedExpr { .. } => "NamedExpr",
            NodeKind::BinOp { .. } => "BinOp",
            NodeKind::UnaryOp { .. } => "UnaryOp",
            NodeKind::Lambda { .. } => "Lambda",
            NodeKind::IfExp { .. } => "IfExp",
            NodeKind::Dict { .. } => "Dict",
            NodeKind::Set { .. } => "Set",
            NodeKind::ListComp { .. } => "ListComp",
            NodeKind::SetComp { .. } => "SetComp",
            NodeKind::DictComp { .. } => "DictComp",
            NodeKind::GeneratorExp { .. } => "GeneratorExp",
            NodeKind::Await { .. } => "Await",
            NodeKind::Yield { .. } => "Yield",
            NodeKind::YieldFrom { .. } => "YieldFrom",
            NodeKind::Compare { .. } => "Compare",
            NodeKind::Call { .. } => "Call",
            NodeKind::FormattedValue { .. } => "FormattedValue",
            NodeKind::JoinedStr { .. } => "JoinedStr",
            NodeKind::TemplateStr { .. } => "TemplateStr",
            NodeKind::Constant { .. } => "Constant",
            NodeKind::Attribute { .. } => "Attribute",
            NodeKind::Subscript { .. } => "Subscript",
            NodeKind::Starred { .. } => "Starred",
            NodeKind::Name { .. } => "Name",
            NodeKind::List { .. } => "List",
            NodeKind::Tuple { .. } => "Tuple",
            NodeKind::Slice { .. } => "Slice",
            NodeKind::Comprehension { .. } => "comprehension",
            NodeKind::ExceptHandler { .. } => "ExceptHandler",
            NodeKind::Arguments { .. } => "arguments",
            NodeKind::Arg { .. } => "arg",
            NodeKind::Keyword { .. } => "keyword",
            NodeKind::Alias { .. } => "alias",
            NodeKind::WithItem { .. } => "withitem",
            NodeKind::MatchCase { .. } => "match_case",
            NodeKind::MatchValue { .. } => "MatchValue",
            NodeKind::MatchSingleton { .. } => "MatchSingleton",
            NodeKind::MatchSequence { .. } => "MatchSequence",
            NodeKind::MatchMapping { .. } => "MatchMapping",
            NodeKind::MatchClass { .. } => "MatchClass",
            NodeKind::MatchStar { .. } => "MatchStar",
            NodeKind::MatchAs { .. } => "MatchAs",
            NodeKind::MatchOr { .. } => "MatchOr",
            NodeKind::TypeVar { .. } => "TypeVar",
            NodeKind::ParamSpec { .. } => "ParamSpec",
            NodeKind::TypeVarTuple { .. } => "TypeVarTuple",
        }
    }

    /// Module, function, lambda, class and comprehension nodes open a new namespace.
    pub fn is_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::Module { .. }
                | NodeKind::Expression { .. }
                | NodeKind::FunctionDef { .. }
                | NodeKind::Lambda { .. }
                | NodeKind::ClassDef { .. }
                | NodeKind::ListComp { .. }
                | NodeKind::SetComp { .. }
                | NodeKind::DictComp { .. }
                | NodeKind::GeneratorExp { .. }
        )
    }

    pub fn is_comprehension_scope(&self) -> bool {
        matches!(
            self,
            NodeKind::ListComp { .. }
                | NodeKind::SetComp { .. }
                | NodeKind::DictComp { .. }
                | NodeKind::GeneratorExp { .. }
        )
    }

    /// Statements that own an indented suite.
    pub fn is_compound(&self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDef { .. }
                | NodeKind::ClassDef { .. }
                | NodeKind::For { .. }
                | NodeKind::While { .. }
                | NodeKind::If { .. }
                | NodeKind::With { .. }
                | NodeKind::Match { .. }
                | NodeKind::Try { .. }
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCOPE EXTENSION
// ═══════════════════════════════════════════════════════════════════════════════

/// Side tables attached to every namespace node by the mapper.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub bindings: Vec<Binding>,
    /// Names declared `global` in this namespace.
    pub global_names: FxHashSet<String>,
    /// Names declared `nonlocal`, plus names a class body reads.
    pub nonlocal_names: FxHashSet<String>,
    /// Names claimed during renaming.
    pub assigned_names: FxHashSet<String>,
    /// Set on the module when a dynamic-introspection builtin is referenced.
    pub tainted: bool,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub namespace: Option<NodeId>,
    pub scope: Option<Box<Scope>>,
    pub span: Option<Span>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    source: Option<String>,
}

impl SyntaxTree {
    pub fn new(source: Option<String>) -> Self {
        SyntaxTree {
            nodes: Vec::new(),
            root: None,
            source,
        }
    }

    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        self.add_spanned(kind, None)
    }

    pub fn add_spanned(&mut self, kind: NodeKind, span: Option<Span>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            namespace: None,
            scope: None,
            span,
        });
        id
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn root(&self) -> NodeId {
        match self.root {
            Some(root) => root,
            None => panic!("syntax tree has no root node"),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn span_text(&self, id: NodeId) -> Option<&str> {
        let span = self.node(id).span?;
        self.source
            .as_deref()?
            .get(span.start as usize..span.end as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn namespace(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].namespace
    }

    pub fn scope(&self, id: NodeId) -> &Scope {
        match &self.nodes[id.index()].scope {
            Some(scope) => scope,
            None => panic!("{} node is not an annotated namespace", self.kind(id).name()),
        }
    }

    pub fn scope_mut(&mut self, id: NodeId) -> &mut Scope {
        let name = self.kind(id).name();
        match &mut self.nodes[id.index()].scope {
            Some(scope) => scope,
            None => panic!("{} node is not an annotated namespace", name),
        }
    }

    /// The module (or eval root) at the top of the tree.
    pub fn module(&self) -> NodeId {
        self.root()
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Builders
    // ───────────────────────────────────────────────────────────────────────────

    pub fn name(&mut self, id: &str, ctx: ExprContext) -> NodeId {
        self.add(NodeKind::Name {
            id: id.to_string(),
            ctx,
        })
    }

    pub fn constant(&mut self, value: Literal) -> NodeId {
        self.add(NodeKind::Constant { value })
    }

    /// `target = value` as a single-target assignment statement.
    pub fn assign(&mut self, target: &str, value: NodeId) -> NodeId {
        let target = self.name(target, ExprContext::Store);
        self.add(NodeKind::Assign {
            targets: vec![target],
            value,
        })
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Edits
    // ───────────────────────────────────────────────────────────────────────────

    /// Replace a node's kind in place. The parent's field keeps pointing at `id`, and the
    /// new kind's children are linked back to it.
    pub fn replace_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
        self.relink(id);
    }

    /// Point the children of `id` back at it and at its namespace. Used after splicing
    /// non-scope nodes into an annotated tree.
    pub fn relink(&mut self, id: NodeId) {
        let namespace = if self.nodes[id.index()].scope.is_some() {
            Some(id)
        } else {
            self.nodes[id.index()].namespace
        };
        for child in crate::visitor::children(self.kind(id)) {
            self.nodes[child.index()].parent = Some(id);
            self.nodes[child.index()].namespace = namespace;
            self.relink(child);
        }
    }

    pub fn body(&self, id: NodeId) -> Option<&Vec<NodeId>> {
        match self.kind(id) {
            NodeKind::Module { body } | NodeKind::FunctionDef { body, .. } => Some(body),
            NodeKind::ClassDef { body, .. } => Some(body),
            _ => None,
        }
    }

    fn body_mut(&mut self, id: NodeId) -> Option<&mut Vec<NodeId>> {
        match self.kind_mut(id) {
            NodeKind::Module { body } | NodeKind::FunctionDef { body, .. } => Some(body),
            NodeKind::ClassDef { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Index in `owner`'s body after a leading docstring and any `from __future__` imports.
    pub fn insertion_point(&self, owner: NodeId) -> usize {
        let Some(body) = self.body(owner) else {
            return 0;
        };
        let mut index = 0;
        if let Some(&first) = body.first() {
            if self.is_docstring_statement(first) {
                index = 1;
            }
        }
        if matches!(self.kind(owner), NodeKind::Module { .. }) {
            while let Some(&stmt) = body.get(index) {
                match self.kind(stmt) {
                    NodeKind::ImportFrom {
                        module: Some(module),
                        ..
                    } if module == "__future__" => index += 1,
                    _ => break,
                }
            }
        }
        index
    }

    /// Inject statements into the body of a module or function, after its docstring and
    /// future imports.
    pub fn insert_statements(&mut self, owner: NodeId, statements: Vec<NodeId>) {
        let at = self.insertion_point(owner);
        let namespace = if self.nodes[owner.index()].scope.is_some() {
            Some(owner)
        } else {
            self.nodes[owner.index()].namespace
        };
        for &stmt in &statements {
            self.nodes[stmt.index()].parent = Some(owner);
            self.nodes[stmt.index()].namespace = namespace;
            self.relink(stmt);
        }
        let body = match self.body_mut(owner) {
            Some(body) => body,
            None => panic!("cannot inject statements into a node without a body"),
        };
        body.splice(at..at, statements);
    }

    pub fn is_docstring_statement(&self, stmt: NodeId) -> bool {
        match self.kind(stmt) {
            NodeKind::Expr { value } => matches!(
                self.kind(*value),
                NodeKind::Constant {
                    value: Literal::Str(_)
                }
            ),
            _ => false,
        }
    }

    /// Nearest enclosing function or module, the scopes that can take injected statements.
    pub fn statement_scope(&self, id: NodeId) -> NodeId {
        let mut current = if self.nodes[id.index()].scope.is_some() {
            Some(id)
        } else {
            self.namespace(id)
        };
        while let Some(scope) = current {
            match self.kind(scope) {
                NodeKind::Module { .. } | NodeKind::FunctionDef { .. } => return scope,
                _ => current = self.namespace(scope),
            }
        }
        self.root()
    }

    /// Whether `id` sits inside a value pattern, where only literals (including signed
    /// and complex forms) are accepted.
    pub fn in_pattern(&self, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            match self.kind(node) {
                NodeKind::MatchValue { .. } | NodeKind::MatchMapping { .. } => return true,
                NodeKind::UnaryOp { .. } | NodeKind::BinOp { .. } => current = self.parent(node),
                _ => return false,
            }
        }
        false
    }
}
