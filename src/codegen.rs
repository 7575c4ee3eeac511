//! Minimal source generator
//!
//! Prints an arena tree back to the shortest text this module knows how to produce:
//! parentheses only where precedence demands them, suites collapsed onto one line where
//! the grammar allows it, one-space indentation and minimal literal spellings.

use crate::fstring::{self, Nesting};
use crate::literal;
use crate::options::TargetVersions;
use crate::parse::Frontend;
use crate::printer::Printer;
use crate::tree::{
    BoolOperator, CmpOperator, Literal, NodeId, NodeKind, Operator, SyntaxTree, UnaryOperator,
};

// ═══════════════════════════════════════════════════════════════════════════════
// PRECEDENCE
// ═══════════════════════════════════════════════════════════════════════════════
//
// Lowest to highest. A child is parenthesized when its own level is below the minimum
// its position requires. Walrus and yield expressions sit below everything and are only
// printed bare by the few positions that accept them.

pub const TUPLE: u8 = 1;
/// `lambda` and conditional expressions.
pub const TEST: u8 = 2;
pub const OR: u8 = 3;
pub const AND: u8 = 4;
pub const NOT: u8 = 5;
pub const CMP: u8 = 6;
pub const BOR: u8 = 7;
pub const BXOR: u8 = 8;
pub const BAND: u8 = 9;
pub const SHIFT: u8 = 10;
pub const ARITH: u8 = 11;
pub const TERM: u8 = 12;
/// Unary `+`, `-` and `~`.
pub const FACTOR: u8 = 13;
pub const POWER: u8 = 14;
pub const AWAIT: u8 = 15;
/// Calls, subscripts, attributes, names, literals and displays.
pub const ATOM: u8 = 16;

fn operator_precedence(op: Operator) -> u8 {
    match op {
        Operator::BitOr => BOR,
        Operator::BitXor => BXOR,
        Operator::BitAnd => BAND,
        Operator::LShift | Operator::RShift => SHIFT,
        Operator::Add | Operator::Sub => ARITH,
        Operator::Mult | Operator::MatMult | Operator::Div | Operator::Mod | Operator::FloorDiv => {
            TERM
        }
        Operator::Pow => POWER,
    }
}

pub fn precedence(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::NamedExpr { .. } | NodeKind::Yield { .. } | NodeKind::YieldFrom { .. } => 0,
        NodeKind::Tuple { elts, .. } if !elts.is_empty() => TUPLE,
        NodeKind::Lambda { .. } | NodeKind::IfExp { .. } => TEST,
        NodeKind::BoolOp {
            op: BoolOperator::Or,
            ..
        } => OR,
        NodeKind::BoolOp {
            op: BoolOperator::And,
            ..
        } => AND,
        NodeKind::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => NOT,
        NodeKind::UnaryOp { .. } => FACTOR,
        NodeKind::Compare { .. } => CMP,
        NodeKind::BinOp { op, .. } => operator_precedence(*op),
        NodeKind::Await { .. } => AWAIT,
        _ => ATOM,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Print a whole module (or eval-mode root).
pub fn unparse(tree: &SyntaxTree, frontend: &dyn Frontend, targets: TargetVersions) -> String {
    let mut gen = Codegen::new(tree, frontend, targets);
    match tree.kind(tree.root()) {
        NodeKind::Module { body } => gen.block(body, 0),
        NodeKind::Expression { body } => gen.expr(*body, TUPLE),
        other => panic!("cannot print a {} root", other.name()),
    }
    gen.printer.finish()
}

/// Text of a single expression as it would be printed in a statement position.
pub fn expression_text(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    targets: TargetVersions,
) -> String {
    let mut gen = Codegen::new(tree, frontend, targets);
    gen.expr(id, TUPLE);
    gen.printer.finish()
}

/// Text of an expression inside a legacy interpolated string, with every nested string
/// literal forced onto the quote of its level. `None` when some literal cannot be spelled
/// under that assignment.
pub(crate) fn nested_expression_text(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    targets: TargetVersions,
    nesting: Nesting,
) -> Option<String> {
    let mut gen = Codegen::new(tree, frontend, targets);
    gen.nesting = Some(nesting);
    gen.interpolated_expr(id);
    if gen.failed {
        None
    } else {
        Some(gen.printer.finish())
    }
}

/// Text of an expression inside a modern interpolated string.
pub(crate) fn interpolated_expression_text(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    targets: TargetVersions,
) -> String {
    let mut gen = Codegen::new(tree, frontend, targets);
    gen.interpolated_expr(id);
    gen.printer.finish()
}

// ═══════════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Codegen<'a> {
    tree: &'a SyntaxTree,
    frontend: &'a dyn Frontend,
    targets: TargetVersions,
    printer: Printer,
    /// Set while printing inside a legacy interpolated string.
    nesting: Option<Nesting>,
    failed: bool,
}

impl<'a> Codegen<'a> {
    pub fn new(tree: &'a SyntaxTree, frontend: &'a dyn Frontend, targets: TargetVersions) -> Self {
        Codegen {
            tree,
            frontend,
            targets,
            printer: Printer::new(),
            nesting: None,
            failed: false,
        }
    }

    fn kind(&self, id: NodeId) -> &'a NodeKind {
        self.tree.kind(id)
    }

    fn comma_separated(&mut self, items: &[NodeId], min: u8) {
        for (i, &item) in items.iter().enumerate() {
            if i > 0 {
                self.printer.delimiter(",");
            }
            self.expr(item, min);
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Suites
    // ───────────────────────────────────────────────────────────────────────────

    /// Statements at indentation `depth`, consecutive simple statements sharing a line.
    fn block(&mut self, body: &[NodeId], depth: usize) {
        let mut line_open = false;
        for &stmt in body {
            if self.kind(stmt).is_compound() {
                if line_open {
                    self.printer.newline();
                    line_open = false;
                }
                self.printer.indent(depth);
                self.compound_statement(stmt, depth);
            } else {
                if line_open {
                    self.printer.end_statement();
                } else {
                    self.printer.indent(depth);
                    line_open = true;
                }
                self.simple_statement(stmt);
            }
        }
        if line_open {
            self.printer.newline();
        }
    }

    /// The suite after a compound header's `:`. Runs on the header line when it holds only
    /// simple statements.
    fn suite(&mut self, body: &[NodeId], depth: usize) {
        if body.is_empty() {
            panic!("empty suite reached the printer");
        }
        self.printer.delimiter(":");
        if body.iter().all(|&stmt| !self.kind(stmt).is_compound()) {
            for (i, &stmt) in body.iter().enumerate() {
                if i > 0 {
                    self.printer.end_statement();
                }
                self.simple_statement(stmt);
            }
            self.printer.newline();
        } else {
            self.printer.newline();
            self.block(body, depth + 1);
        }
    }

    fn clause(&mut self, keyword: &str, body: &[NodeId], depth: usize) {
        if body.is_empty() {
            return;
        }
        self.printer.indent(depth);
        self.printer.keyword(keyword);
        self.suite(body, depth);
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Statements
    // ───────────────────────────────────────────────────────────────────────────

    /// Right-hand side of an expression statement or assignment: yield is bare here.
    fn statement_value(&mut self, id: NodeId) {
        match self.kind(id) {
            NodeKind::Yield { .. } | NodeKind::YieldFrom { .. } => self.expr_inner(id),
            _ => self.expr(id, TUPLE),
        }
    }

    /// Positions that accept an unparenthesized walrus.
    fn named_or(&mut self, id: NodeId, min: u8) {
        match self.kind(id) {
            NodeKind::NamedExpr { .. } => self.expr_inner(id),
            _ => self.expr(id, min),
        }
    }

    /// Value of `return`, `yield` or a `for` iterable. A tuple holding a starred element
    /// needs brackets there unless every target accepts it bare.
    fn unpacking_value(&mut self, id: NodeId, bare_allowed: bool) {
        let starred = match self.kind(id) {
            NodeKind::Tuple { elts, .. } => elts
                .iter()
                .any(|&elt| matches!(self.kind(elt), NodeKind::Starred { .. })),
            _ => false,
        };
        if starred && !bare_allowed {
            self.expr(id, TEST);
        } else {
            self.expr(id, TUPLE);
        }
    }

    fn simple_statement(&mut self, id: NodeId) {
        match self.kind(id) {
            NodeKind::Expr { value } => self.statement_value(*value),
            NodeKind::Assign { targets, value } => {
                for &target in targets {
                    self.expr(target, TUPLE);
                    self.printer.operator("=");
                }
                self.statement_value(*value);
            }
            NodeKind::AugAssign { target, op, value } => {
                self.expr(*target, ATOM);
                self.printer.operator(&format!("{}=", op.symbol()));
                self.statement_value(*value);
            }
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
                simple,
            } => {
                let bare_name = matches!(self.kind(*target), NodeKind::Name { .. });
                if bare_name && !simple {
                    self.printer.delimiter("(");
                    self.expr(*target, ATOM);
                    self.printer.delimiter(")");
                } else {
                    self.expr(*target, ATOM);
                }
                self.printer.delimiter(":");
                self.expr(*annotation, TEST);
                if let Some(value) = value {
                    self.printer.operator("=");
                    self.statement_value(*value);
                }
            }
            NodeKind::TypeAlias {
                name,
                type_params,
                value,
            } => {
                self.printer.soft_keyword("type");
                self.expr(*name, ATOM);
                self.type_params(type_params);
                self.printer.operator("=");
                self.expr(*value, TEST);
            }
            NodeKind::Return { value } => {
                self.printer.keyword("return");
                if let Some(value) = value {
                    self.unpacking_value(*value, self.targets.bare_return_unpacking());
                }
            }
            NodeKind::Delete { targets } => {
                self.printer.keyword("del");
                self.comma_separated(targets, TEST);
            }
            NodeKind::Raise { exc, cause } => {
                self.printer.keyword("raise");
                if let Some(exc) = exc {
                    self.expr(*exc, TEST);
                    if let Some(cause) = cause {
                        self.printer.keyword("from");
                        self.expr(*cause, TEST);
                    }
                }
            }
            NodeKind::Assert { test, msg } => {
                self.printer.keyword("assert");
                self.expr(*test, TEST);
                if let Some(msg) = msg {
                    self.printer.delimiter(",");
                    self.expr(*msg, TEST);
                }
            }
            NodeKind::Import { names } => {
                self.printer.keyword("import");
                self.aliases(names);
            }
            NodeKind::ImportFrom {
                module,
                names,
                level,
            } => {
                self.printer.keyword("from");
                if *level > 0 {
                    self.printer.delimiter(&".".repeat(*level as usize));
                }
                if let Some(module) = module {
                    self.printer.identifier(module);
                }
                self.printer.keyword("import");
                self.aliases(names);
            }
            NodeKind::Global { names } => self.name_list("global", names),
            NodeKind::Nonlocal { names } => self.name_list("nonlocal", names),
            NodeKind::Pass => self.printer.keyword("pass"),
            NodeKind::Break => self.printer.keyword("break"),
            NodeKind::Continue => self.printer.keyword("continue"),
            other => panic!("{} is not a simple statement", other.name()),
        }
    }

    fn name_list(&mut self, keyword: &str, names: &[String]) {
        self.printer.keyword(keyword);
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                self.printer.delimiter(",");
            }
            self.printer.identifier(name);
        }
    }

    fn aliases(&mut self, names: &[NodeId]) {
        for (i, &alias) in names.iter().enumerate() {
            if i > 0 {
                self.printer.delimiter(",");
            }
            let NodeKind::Alias { name, asname } = self.kind(alias) else {
                panic!("import name is not an alias");
            };
            if name == "*" {
                self.printer.operator("*");
            } else {
                self.printer.identifier(name);
            }
            if let Some(asname) = asname {
                self.printer.keyword("as");
                self.printer.identifier(asname);
            }
        }
    }

    fn compound_statement(&mut self, id: NodeId, depth: usize) {
        match self.kind(id) {
            NodeKind::FunctionDef {
                name,
                is_async,
                args,
                body,
                decorators,
                returns,
                type_params,
            } => {
                self.decorators(decorators, depth);
                if *is_async {
                    self.printer.keyword("async");
                }
                self.printer.keyword("def");
                self.printer.identifier(name);
                self.type_params(type_params);
                self.printer.delimiter("(");
                self.arguments(*args, false);
                self.printer.delimiter(")");
                if let Some(returns) = returns {
                    self.printer.operator("->");
                    self.expr(*returns, TEST);
                }
                self.suite(body, depth);
            }
            NodeKind::ClassDef {
                name,
                bases,
                keywords,
                body,
                decorators,
                type_params,
            } => {
                self.decorators(decorators, depth);
                self.printer.keyword("class");
                self.printer.identifier(name);
                self.type_params(type_params);
                if !bases.is_empty() || !keywords.is_empty() {
                    self.printer.delimiter("(");
                    self.call_arguments(bases, keywords);
                    self.printer.delimiter(")");
                }
                self.suite(body, depth);
            }
            NodeKind::For {
                is_async,
                target,
                iter,
                body,
                orelse,
            } => {
                if *is_async {
                    self.printer.keyword("async");
                }
                self.printer.keyword("for");
                self.expr(*target, TUPLE);
                self.printer.keyword("in");
                self.unpacking_value(*iter, self.targets.bare_iterable_unpacking());
                self.suite(body, depth);
                self.clause("else", orelse, depth);
            }
            NodeKind::While { test, body, orelse } => {
                self.printer.keyword("while");
                self.named_or(*test, TEST);
                self.suite(body, depth);
                self.clause("else", orelse, depth);
            }
            NodeKind::If { test, body, orelse } => self.if_chain("if", *test, body, orelse, depth),
            NodeKind::With {
                is_async,
                items,
                body,
            } => {
                if *is_async {
                    self.printer.keyword("async");
                }
                self.printer.keyword("with");
                for (i, &item) in items.iter().enumerate() {
                    if i > 0 {
                        self.printer.delimiter(",");
                    }
                    let NodeKind::WithItem {
                        context_expr,
                        optional_vars,
                    } = self.kind(item)
                    else {
                        panic!("with item expected");
                    };
                    self.expr(*context_expr, TEST);
                    if let Some(vars) = optional_vars {
                        self.printer.keyword("as");
                        self.expr(*vars, TEST);
                    }
                }
                self.suite(body, depth);
            }
            NodeKind::Match { subject, cases } => {
                self.printer.soft_keyword("match");
                self.named_or(*subject, TUPLE);
                self.printer.delimiter(":");
                self.printer.newline();
                for &case in cases {
                    let NodeKind::MatchCase {
                        pattern,
                        guard,
                        body,
                    } = self.kind(case)
                    else {
                        panic!("match case expected");
                    };
                    self.printer.indent(depth + 1);
                    self.printer.soft_keyword("case");
                    self.pattern(*pattern);
                    if let Some(guard) = guard {
                        self.printer.keyword("if");
                        self.named_or(*guard, TEST);
                    }
                    self.suite(body, depth + 1);
                }
            }
            NodeKind::Try {
                is_star,
                body,
                handlers,
                orelse,
                finalbody,
            } => {
                self.printer.keyword("try");
                self.suite(body, depth);
                for &handler in handlers {
                    let NodeKind::ExceptHandler { type_, name, body } = self.kind(handler) else {
                        panic!("except handler expected");
                    };
                    self.printer.indent(depth);
                    self.printer.keyword("except");
                    if *is_star {
                        self.printer.operator("*");
                    }
                    if let Some(type_) = type_ {
                        self.expr(*type_, TEST);
                        if let Some(name) = name {
                            self.printer.keyword("as");
                            self.printer.identifier(name);
                        }
                    }
                    self.suite(body, depth);
                }
                self.clause("else", orelse, depth);
                self.clause("finally", finalbody, depth);
            }
            other => panic!("{} is not a compound statement", other.name()),
        }
    }

    fn if_chain(&mut self, keyword: &str, test: NodeId, body: &[NodeId], orelse: &[NodeId], depth: usize) {
        self.printer.keyword(keyword);
        self.named_or(test, TEST);
        self.suite(body, depth);
        if let [only] = orelse {
            if let NodeKind::If { test, body, orelse } = self.kind(*only) {
                self.printer.indent(depth);
                self.if_chain("elif", *test, body, orelse, depth);
                return;
            }
        }
        self.clause("else", orelse, depth);
    }

    fn decorators(&mut self, decorators: &[NodeId], depth: usize) {
        for &decorator in decorators {
            self.printer.delimiter("@");
            self.named_or(decorator, TEST);
            self.printer.newline();
            self.printer.indent(depth);
        }
    }

    fn type_params(&mut self, params: &[NodeId]) {
        if params.is_empty() {
            return;
        }
        self.printer.delimiter("[");
        for (i, &param) in params.iter().enumerate() {
            if i > 0 {
                self.printer.delimiter(",");
            }
            match self.kind(param) {
                NodeKind::TypeVar { name, bound } => {
                    self.printer.identifier(name);
                    if let Some(bound) = bound {
                        self.printer.delimiter(":");
                        self.expr(*bound, TEST);
                    }
                }
                NodeKind::ParamSpec { name } => {
                    self.printer.operator("**");
                    self.printer.identifier(name);
                }
                NodeKind::TypeVarTuple { name } => {
                    self.printer.operator("*");
                    self.printer.identifier(name);
                }
                other => panic!("{} is not a type parameter", other.name()),
            }
        }
        self.printer.delimiter("]");
    }

    fn parameter(&mut self, arg: NodeId, lambda: bool) {
        let NodeKind::Arg { arg, annotation } = self.kind(arg) else {
            panic!("parameter expected");
        };
        self.printer.identifier(arg);
        if let (false, Some(annotation)) = (lambda, annotation) {
            self.printer.delimiter(":");
            self.expr(*annotation, TEST);
        }
    }

    fn arguments(&mut self, id: NodeId, lambda: bool) {
        let NodeKind::Arguments {
            posonlyargs,
            args,
            vararg,
            kwonlyargs,
            kw_defaults,
            kwarg,
            defaults,
        } = self.kind(id)
        else {
            panic!("arguments expected");
        };

        let mut first = true;
        let mut separate = |printer: &mut Printer| {
            if !first {
                printer.delimiter(",");
            }
            first = false;
        };

        let positional: Vec<NodeId> = posonlyargs.iter().chain(args.iter()).copied().collect();
        let offset = positional.len() - defaults.len();
        for (i, &param) in positional.iter().enumerate() {
            separate(&mut self.printer);
            self.parameter(param, lambda);
            if i >= offset {
                self.printer.operator("=");
                self.expr(defaults[i - offset], TEST);
            }
            if i + 1 == posonlyargs.len() {
                separate(&mut self.printer);
                self.printer.operator("/");
            }
        }

        if let Some(vararg) = vararg {
            separate(&mut self.printer);
            self.printer.operator("*");
            self.parameter(*vararg, lambda);
        } else if !kwonlyargs.is_empty() {
            separate(&mut self.printer);
            self.printer.operator("*");
        }

        for (&param, default) in kwonlyargs.iter().zip(kw_defaults.iter()) {
            separate(&mut self.printer);
            self.parameter(param, lambda);
            if let Some(default) = default {
                self.printer.operator("=");
                self.expr(*default, TEST);
            }
        }

        if let Some(kwarg) = kwarg {
            separate(&mut self.printer);
            self.printer.operator("**");
            self.parameter(*kwarg, lambda);
        }
    }

    fn call_arguments(&mut self, args: &[NodeId], keywords: &[NodeId]) {
        let mut first = true;
        for &arg in args {
            if !first {
                self.printer.delimiter(",");
            }
            first = false;
            self.named_or(arg, TEST);
        }
        for &keyword in keywords {
            if !first {
                self.printer.delimiter(",");
            }
            first = false;
            let NodeKind::Keyword { arg, value } = self.kind(keyword) else {
                panic!("keyword argument expected");
            };
            match arg {
                Some(name) => {
                    self.printer.identifier(name);
                    self.printer.operator("=");
                    self.expr(*value, TEST);
                }
                None => {
                    self.printer.operator("**");
                    self.expr(*value, BOR);
                }
            }
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Patterns
    // ───────────────────────────────────────────────────────────────────────────

    /// Alternatives of an or-pattern and the inner pattern of a capture need parentheses
    /// around a capture with a sub-pattern.
    fn closed_pattern(&mut self, id: NodeId) {
        match self.kind(id) {
            NodeKind::MatchAs {
                pattern: Some(_), ..
            }
            | NodeKind::MatchOr { .. } => {
                self.printer.delimiter("(");
                self.pattern(id);
                self.printer.delimiter(")");
            }
            _ => self.pattern(id),
        }
    }

    fn patterns(&mut self, patterns: &[NodeId]) {
        for (i, &pattern) in patterns.iter().enumerate() {
            if i > 0 {
                self.printer.delimiter(",");
            }
            self.pattern(pattern);
        }
    }

    fn pattern(&mut self, id: NodeId) {
        match self.kind(id) {
            NodeKind::MatchValue { value } => self.expr(*value, BOR),
            NodeKind::MatchSingleton { value } => self.constant(value),
            NodeKind::MatchSequence { patterns } => {
                self.printer.delimiter("[");
                self.patterns(patterns);
                self.printer.delimiter("]");
            }
            NodeKind::MatchMapping {
                keys,
                patterns,
                rest,
            } => {
                self.printer.delimiter("{");
                for (i, (&key, &pattern)) in keys.iter().zip(patterns.iter()).enumerate() {
                    if i > 0 {
                        self.printer.delimiter(",");
                    }
                    self.expr(key, BOR);
                    self.printer.delimiter(":");
                    self.pattern(pattern);
                }
                if let Some(rest) = rest {
                    if !keys.is_empty() {
                        self.printer.delimiter(",");
                    }
                    self.printer.operator("**");
                    self.printer.identifier(rest);
                }
                self.printer.delimiter("}");
            }
            NodeKind::MatchClass {
                cls,
                patterns,
                kwd_attrs,
                kwd_patterns,
            } => {
                self.expr(*cls, ATOM);
                self.printer.delimiter("(");
                self.patterns(patterns);
                for (i, (attr, &pattern)) in kwd_attrs.iter().zip(kwd_patterns.iter()).enumerate() {
                    if i > 0 || !patterns.is_empty() {
                        self.printer.delimiter(",");
                    }
                    self.printer.identifier(attr);
                    self.printer.operator("=");
                    self.pattern(pattern);
                }
                self.printer.delimiter(")");
            }
            NodeKind::MatchStar { name } => {
                self.printer.operator("*");
                self.printer.identifier(name.as_deref().unwrap_or("_"));
            }
            NodeKind::MatchAs { pattern, name } => match (pattern, name) {
                (Some(pattern), Some(name)) => {
                    self.closed_pattern(*pattern);
                    self.printer.keyword("as");
                    self.printer.identifier(name);
                }
                (None, Some(name)) => self.printer.identifier(name),
                (None, None) => self.printer.soft_keyword("_"),
                (Some(_), None) => panic!("capture pattern without a name"),
            },
            NodeKind::MatchOr { patterns } => {
                for (i, &pattern) in patterns.iter().enumerate() {
                    if i > 0 {
                        self.printer.operator("|");
                    }
                    self.closed_pattern(pattern);
                }
            }
            other => panic!("{} is not a pattern", other.name()),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Expressions
    // ───────────────────────────────────────────────────────────────────────────

    pub fn expr(&mut self, id: NodeId, min: u8) {
        let parens = precedence(self.kind(id)) < min;
        if parens {
            self.printer.delimiter("(");
        }
        self.expr_inner(id);
        if parens {
            self.printer.delimiter(")");
        }
    }

    /// The expression between the braces of an interpolated string.
    fn interpolated_expr(&mut self, id: NodeId) {
        match self.kind(id) {
            NodeKind::Lambda { .. } => {
                self.printer.delimiter("(");
                self.expr_inner(id);
                self.printer.delimiter(")");
            }
            NodeKind::Yield { .. } | NodeKind::YieldFrom { .. } => self.expr_inner(id),
            _ => self.expr(id, TUPLE),
        }
    }

    fn constant(&mut self, value: &Literal) {
        match value {
            Literal::None => self.printer.keyword("None"),
            Literal::Bool(true) => self.printer.keyword("True"),
            Literal::Bool(false) => self.printer.keyword("False"),
            Literal::Ellipsis => self.printer.delimiter("..."),
            Literal::Int(_) | Literal::Float(_) | Literal::Complex(_) => {
                self.printer.number(&literal::literal_text(value));
            }
            Literal::Str(text) => match self.nesting.clone() {
                Some(nesting) => self.nested_string("", text, &nesting),
                None => self.printer.literal(&literal::str_text(text)),
            },
            Literal::Bytes(bytes) => match self.nesting.clone() {
                Some(nesting) => {
                    if bytes.iter().any(|b| !b.is_ascii()) {
                        self.failed = true;
                        return;
                    }
                    let text: String = bytes.iter().map(|&b| b as char).collect();
                    self.nested_string("b", &text, &nesting);
                }
                None => self.printer.literal(&literal::bytes_text(bytes)),
            },
        }
    }

    fn nested_string(&mut self, prefix: &str, text: &str, nesting: &Nesting) {
        let spelled = nesting
            .quote()
            .and_then(|quote| fstring::nested_body(text, quote).map(|body| (quote, body)));
        match spelled {
            Some((quote, body)) => {
                self.printer
                    .literal(&format!("{}{}{}{}", prefix, quote.as_str(), body, quote.as_str()));
            }
            None => self.failed = true,
        }
    }

    fn interpolated(&mut self, id: NodeId) {
        let text = fstring::interpolated_text(
            self.tree,
            id,
            self.frontend,
            self.targets,
            self.nesting.as_ref(),
        );
        match text {
            Some(text) => self.printer.literal(&text),
            None => self.failed = true,
        }
    }

    fn comprehension(&mut self, generators: &[NodeId]) {
        for &generator in generators {
            let NodeKind::Comprehension {
                target,
                iter,
                ifs,
                is_async,
            } = self.kind(generator)
            else {
                panic!("comprehension clause expected");
            };
            if *is_async {
                self.printer.keyword("async");
            }
            self.printer.keyword("for");
            self.expr(*target, TUPLE);
            self.printer.keyword("in");
            self.expr(*iter, OR);
            for &condition in ifs {
                self.printer.keyword("if");
                self.expr(condition, OR);
            }
        }
    }

    fn subscript_slice(&mut self, slice: NodeId) {
        match self.kind(slice) {
            NodeKind::Tuple { elts, .. } if !elts.is_empty() => {
                self.comma_separated(elts, TEST);
                if elts.len() == 1 {
                    self.printer.delimiter(",");
                }
            }
            _ => self.expr(slice, TEST),
        }
    }

    fn expr_inner(&mut self, id: NodeId) {
        match self.kind(id) {
            NodeKind::BoolOp { op, values } => {
                let (keyword, level) = match op {
                    BoolOperator::And => ("and", AND),
                    BoolOperator::Or => ("or", OR),
                };
                for (i, &value) in values.iter().enumerate() {
                    if i > 0 {
                        self.printer.keyword(keyword);
                    }
                    self.expr(value, level + 1);
                }
            }
            NodeKind::NamedExpr { target, value } => {
                self.expr(*target, ATOM);
                self.printer.operator(":=");
                self.expr(*value, TEST);
            }
            NodeKind::BinOp { left, op, right } => {
                let level = operator_precedence(*op);
                let (left_min, right_min) = if *op == Operator::Pow {
                    // `a**-b` is unambiguous; the operand is a factor
                    (AWAIT, FACTOR)
                } else {
                    (level, level + 1)
                };
                self.expr(*left, left_min);
                self.printer.operator(op.symbol());
                self.expr(*right, right_min);
            }
            NodeKind::UnaryOp { op, operand } => match op {
                UnaryOperator::Not => {
                    self.printer.keyword("not");
                    self.expr(*operand, NOT);
                }
                _ => {
                    self.printer.operator(op.symbol());
                    self.expr(*operand, FACTOR);
                }
            },
            NodeKind::Lambda { args, body } => {
                self.printer.keyword("lambda");
                self.arguments(*args, true);
                self.printer.delimiter(":");
                self.expr(*body, TEST);
            }
            NodeKind::IfExp { test, body, orelse } => {
                self.expr(*body, OR);
                self.printer.keyword("if");
                self.expr(*test, OR);
                self.printer.keyword("else");
                self.expr(*orelse, TEST);
            }
            NodeKind::Dict { keys, values } => {
                self.printer.delimiter("{");
                for (i, (key, &value)) in keys.iter().zip(values.iter()).enumerate() {
                    if i > 0 {
                        self.printer.delimiter(",");
                    }
                    match key {
                        Some(key) => {
                            self.expr(*key, TEST);
                            self.printer.delimiter(":");
                            self.expr(value, TEST);
                        }
                        None => {
                            self.printer.operator("**");
                            self.expr(value, BOR);
                        }
                    }
                }
                self.printer.delimiter("}");
            }
            NodeKind::Set { elts } => {
                self.printer.delimiter("{");
                self.display_items(elts, self.targets.bare_walrus_in_set());
                self.printer.delimiter("}");
            }
            NodeKind::List { elts, .. } => {
                self.printer.delimiter("[");
                self.display_items(elts, true);
                self.printer.delimiter("]");
            }
            NodeKind::Tuple { elts, .. } => {
                if elts.is_empty() {
                    self.printer.delimiter("(");
                    self.printer.delimiter(")");
                } else {
                    self.comma_separated(elts, TEST);
                    if elts.len() == 1 {
                        self.printer.delimiter(",");
                    }
                }
            }
            NodeKind::ListComp { elt, generators } => {
                self.printer.delimiter("[");
                self.expr(*elt, TEST);
                self.comprehension(generators);
                self.printer.delimiter("]");
            }
            NodeKind::SetComp { elt, generators } => {
                self.printer.delimiter("{");
                self.expr(*elt, TEST);
                self.comprehension(generators);
                self.printer.delimiter("}");
            }
            NodeKind::DictComp {
                key,
                value,
                generators,
            } => {
                self.printer.delimiter("{");
                self.expr(*key, TEST);
                self.printer.delimiter(":");
                self.expr(*value, TEST);
                self.comprehension(generators);
                self.printer.delimiter("}");
            }
            NodeKind::GeneratorExp { elt, generators } => {
                self.printer.delimiter("(");
                self.expr(*elt, TEST);
                self.comprehension(generators);
                self.printer.delimiter(")");
            }
            NodeKind::Await { value } => {
                self.printer.keyword("await");
                self.expr(*value, ATOM);
            }
            NodeKind::Yield { value } => {
                self.printer.keyword("yield");
                if let Some(value) = value {
                    self.unpacking_value(*value, self.targets.bare_return_unpacking());
                }
            }
            NodeKind::YieldFrom { value } => {
                self.printer.keyword("yield");
                self.printer.keyword("from");
                self.expr(*value, TEST);
            }
            NodeKind::Compare {
                left,
                ops,
                comparators,
            } => {
                self.expr(*left, BOR);
                for (op, &comparator) in ops.iter().zip(comparators.iter()) {
                    match op {
                        CmpOperator::Is | CmpOperator::In => self.printer.keyword(op.symbol()),
                        CmpOperator::IsNot => {
                            self.printer.keyword("is");
                            self.printer.keyword("not");
                        }
                        CmpOperator::NotIn => {
                            self.printer.keyword("not");
                            self.printer.keyword("in");
                        }
                        _ => self.printer.operator(op.symbol()),
                    }
                    self.expr(comparator, BOR);
                }
            }
            NodeKind::Call {
                func,
                args,
                keywords,
            } => {
                self.expr(*func, ATOM);
                self.printer.delimiter("(");
                match (args.as_slice(), keywords.is_empty()) {
                    ([only], true)
                        if matches!(self.kind(*only), NodeKind::GeneratorExp { .. }) =>
                    {
                        let NodeKind::GeneratorExp { elt, generators } = self.kind(*only) else {
                            unreachable!();
                        };
                        self.expr(*elt, TEST);
                        self.comprehension(generators);
                    }
                    _ => self.call_arguments(args, keywords),
                }
                self.printer.delimiter(")");
            }
            NodeKind::JoinedStr { .. } | NodeKind::TemplateStr { .. } => self.interpolated(id),
            NodeKind::Constant { value } => self.constant(value),
            NodeKind::Attribute { value, attr, .. } => {
                self.expr(*value, ATOM);
                self.printer.delimiter(".");
                self.printer.identifier(attr);
            }
            NodeKind::Subscript { value, slice, .. } => {
                self.expr(*value, ATOM);
                self.printer.delimiter("[");
                self.subscript_slice(*slice);
                self.printer.delimiter("]");
            }
            NodeKind::Starred { value, .. } => {
                self.printer.operator("*");
                self.expr(*value, BOR);
            }
            NodeKind::Name { id, .. } => self.printer.identifier(id),
            NodeKind::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    self.expr(*lower, TEST);
                }
                self.printer.delimiter(":");
                if let Some(upper) = upper {
                    self.expr(*upper, TEST);
                }
                if let Some(step) = step {
                    self.printer.delimiter(":");
                    self.expr(*step, TEST);
                }
            }
            other => panic!("{} is not an expression", other.name()),
        }
    }

    fn display_items(&mut self, elts: &[NodeId], bare_walrus: bool) {
        for (i, &elt) in elts.iter().enumerate() {
            if i > 0 {
                self.printer.delimiter(",");
            }
            if bare_walrus {
                self.named_or(elt, TEST);
            } else {
                self.expr(elt, TEST);
            }
        }
    }
}
