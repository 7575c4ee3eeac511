//! Front-end seam
//!
//! The minifier works on the arena [`SyntaxTree`]. A [`Frontend`] turns source text into
//! that tree; [`PythonFrontend`] does it with `rustpython-parser` and is the only code that
//! names the foreign AST.

use std::str::FromStr;

use num_bigint::BigInt;
use rustpython_parser::{ast, Mode};

use crate::error::ParseFailure;
use crate::tree::{
    BoolOperator, CmpOperator, Conversion, ExprContext, Literal, NodeId, NodeKind, Operator,
    Span, SyntaxTree, UnaryOperator,
};

/// Parser collaborator consumed by the pipeline. Must be usable from worker threads.
pub trait Frontend: Send + Sync {
    /// Parse a whole module.
    fn parse_module(&self, source: &str, filename: &str) -> Result<SyntaxTree, ParseFailure>;

    /// Parse a single expression into an eval-mode tree.
    fn parse_expression(&self, source: &str) -> Result<SyntaxTree, ParseFailure>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFrontend;

impl Frontend for PythonFrontend {
    fn parse_module(&self, source: &str, filename: &str) -> Result<SyntaxTree, ParseFailure> {
        let parsed = rustpython_parser::parse(source, Mode::Module, filename)
            .map_err(|err| ParseFailure::new(filename, err.to_string()))?;
        let mut converter = Converter::new(source);
        let root = match &parsed {
            ast::Mod::Module(ast::ModModule { body, .. }) => {
                let body = converter.stmts(body);
                converter.tree.add(NodeKind::Module { body })
            }
            _ => return Err(ParseFailure::new(filename, "expected a module")),
        };
        converter.tree.set_root(root);
        Ok(converter.tree)
    }

    fn parse_expression(&self, source: &str) -> Result<SyntaxTree, ParseFailure> {
        let parsed = rustpython_parser::parse(source, Mode::Expression, "<expression>")
            .map_err(|err| ParseFailure::new("<expression>", err.to_string()))?;
        let mut converter = Converter::new(source);
        let root = match &parsed {
            ast::Mod::Expression(ast::ModExpression { body, .. }) => {
                let body = converter.expr(body);
                converter.tree.add(NodeKind::Expression { body })
            }
            _ => return Err(ParseFailure::new("<expression>", "expected an expression")),
        };
        converter.tree.set_root(root);
        Ok(converter.tree)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERSION
// ═══════════════════════════════════════════════════════════════════════════════

fn ident(id: &ast::Identifier) -> String {
    id.as_str().to_string()
}

fn opt_ident(id: &Option<ast::Identifier>) -> Option<String> {
    id.as_ref().map(ident)
}

fn context(ctx: &ast::ExprContext) -> ExprContext {
    match ctx {
        ast::ExprContext::Load => ExprContext::Load,
        ast::ExprContext::Store => ExprContext::Store,
        ast::ExprContext::Del => ExprContext::Del,
    }
}

fn operator(op: &ast::Operator) -> Operator {
    match op {
        ast::Operator::Add => Operator::Add,
        ast::Operator::Sub => Operator::Sub,
        ast::Operator::Mult => Operator::Mult,
        ast::Operator::MatMult => Operator::MatMult,
        ast::Operator::Div => Operator::Div,
        ast::Operator::Mod => Operator::Mod,
        ast::Operator::Pow => Operator::Pow,
        ast::Operator::LShift => Operator::LShift,
        ast::Operator::RShift => Operator::RShift,
        ast::Operator::BitOr => Operator::BitOr,
        ast::Operator::BitXor => Operator::BitXor,
        ast::Operator::BitAnd => Operator::BitAnd,
        ast::Operator::FloorDiv => Operator::FloorDiv,
    }
}

fn unary_operator(op: &ast::UnaryOp) -> UnaryOperator {
    match op {
        ast::UnaryOp::Invert => UnaryOperator::Invert,
        ast::UnaryOp::Not => UnaryOperator::Not,
        ast::UnaryOp::UAdd => UnaryOperator::UAdd,
        ast::UnaryOp::USub => UnaryOperator::USub,
    }
}

fn compare_operator(op: &ast::CmpOp) -> CmpOperator {
    match op {
        ast::CmpOp::Eq => CmpOperator::Eq,
        ast::CmpOp::NotEq => CmpOperator::NotEq,
        ast::CmpOp::Lt => CmpOperator::Lt,
        ast::CmpOp::LtE => CmpOperator::LtE,
        ast::CmpOp::Gt => CmpOperator::Gt,
        ast::CmpOp::GtE => CmpOperator::GtE,
        ast::CmpOp::Is => CmpOperator::Is,
        ast::CmpOp::IsNot => CmpOperator::IsNot,
        ast::CmpOp::In => CmpOperator::In,
        ast::CmpOp::NotIn => CmpOperator::NotIn,
    }
}

fn conversion(flag: &ast::ConversionFlag) -> Conversion {
    match flag {
        ast::ConversionFlag::None => Conversion::None,
        ast::ConversionFlag::Str => Conversion::Str,
        ast::ConversionFlag::Repr => Conversion::Repr,
        ast::ConversionFlag::Ascii => Conversion::Ascii,
    }
}

/// Scalar constants. Tuple constants never come out of the parser and are expanded by
/// the caller.
fn literal(constant: &ast::Constant) -> Literal {
    match constant {
        ast::Constant::None => Literal::None,
        ast::Constant::Bool(b) => Literal::Bool(*b),
        ast::Constant::Str(s) => Literal::Str(s.clone()),
        ast::Constant::Bytes(b) => Literal::Bytes(b.clone()),
        ast::Constant::Int(i) => match BigInt::from_str(&i.to_string()) {
            Ok(value) => Literal::Int(value),
            Err(_) => unreachable!("parser produced a malformed integer"),
        },
        ast::Constant::Float(f) => Literal::Float(*f),
        ast::Constant::Complex { imag, .. } => Literal::Complex(*imag),
        ast::Constant::Ellipsis => Literal::Ellipsis,
        ast::Constant::Tuple(_) => unreachable!("tuple constants are expanded by the caller"),
    }
}

struct Converter {
    tree: SyntaxTree,
}

impl Converter {
    fn new(source: &str) -> Self {
        Converter {
            tree: SyntaxTree::new(Some(source.to_string())),
        }
    }

    fn add(&mut self, kind: NodeKind) -> NodeId {
        self.tree.add(kind)
    }

    fn stmts(&mut self, stmts: &[ast::Stmt]) -> Vec<NodeId> {
        stmts.iter().map(|stmt| self.stmt(stmt)).collect()
    }

    fn exprs(&mut self, exprs: &[ast::Expr]) -> Vec<NodeId> {
        exprs.iter().map(|expr| self.expr(expr)).collect()
    }

    fn opt_expr(&mut self, expr: &Option<Box<ast::Expr>>) -> Option<NodeId> {
        expr.as_ref().map(|expr| self.expr(expr))
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Statements
    // ───────────────────────────────────────────────────────────────────────────

    fn stmt(&mut self, stmt: &ast::Stmt) -> NodeId {
        let kind = match stmt {
            ast::Stmt::FunctionDef(ast::StmtFunctionDef {
                name,
                args,
                body,
                decorator_list,
                returns,
                type_params,
                ..
            }) => self.function_def(false, name, args, body, decorator_list, returns, type_params),
            ast::Stmt::AsyncFunctionDef(ast::StmtAsyncFunctionDef {
                name,
                args,
                body,
                decorator_list,
                returns,
                type_params,
                ..
            }) => self.function_def(true, name, args, body, decorator_list, returns, type_params),
            ast::Stmt::ClassDef(ast::StmtClassDef {
                name,
                bases,
                keywords,
                body,
                decorator_list,
                type_params,
                ..
            }) => {
                let decorators = self.exprs(decorator_list);
                let type_params = self.type_params(type_params);
                let bases = self.exprs(bases);
                let keywords = self.keywords(keywords);
                let body = self.stmts(body);
                NodeKind::ClassDef {
                    name: ident(name),
                    bases,
                    keywords,
                    body,
                    decorators,
                    type_params,
                }
            }
            ast::Stmt::Return(ast::StmtReturn { value, .. }) => NodeKind::Return {
                value: self.opt_expr(value),
            },
            ast::Stmt::Delete(ast::StmtDelete { targets, .. }) => NodeKind::Delete {
                targets: self.exprs(targets),
            },
            ast::Stmt::Assign(ast::StmtAssign { targets, value, .. }) => {
                let targets = self.exprs(targets);
                let value = self.expr(value);
                NodeKind::Assign { targets, value }
            }
            ast::Stmt::TypeAlias(ast::StmtTypeAlias {
                name,
                type_params,
                value,
                ..
            }) => {
                let name = self.expr(name);
                let type_params = self.type_params(type_params);
                let value = self.expr(value);
                NodeKind::TypeAlias {
                    name,
                    type_params,
                    value,
                }
            }
            ast::Stmt::AugAssign(ast::StmtAugAssign {
                target, op, value, ..
            }) => {
                let target = self.expr(target);
                let value = self.expr(value);
                NodeKind::AugAssign {
                    target,
                    op: operator(op),
                    value,
                }
            }
            ast::Stmt::AnnAssign(ast::StmtAnnAssign {
                target,
                annotation,
                value,
                simple,
                ..
            }) => {
                let target = self.expr(target);
                let annotation = self.expr(annotation);
                let value = self.opt_expr(value);
                NodeKind::AnnAssign {
                    target,
                    annotation,
                    value,
                    simple: *simple,
                }
            }
            ast::Stmt::For(ast::StmtFor {
                target,
                iter,
                body,
                orelse,
                ..
            }) => self.for_loop(false, target, iter, body, orelse),
            ast::Stmt::AsyncFor(ast::StmtAsyncFor {
                target,
                iter,
                body,
                orelse,
                ..
            }) => self.for_loop(true, target, iter, body, orelse),
            ast::Stmt::While(ast::StmtWhile {
                test, body, orelse, ..
            }) => {
                let test = self.expr(test);
                let body = self.stmts(body);
                let orelse = self.stmts(orelse);
                NodeKind::While { test, body, orelse }
            }
            ast::Stmt::If(ast::StmtIf {
                test, body, orelse, ..
            }) => {
                let test = self.expr(test);
                let body = self.stmts(body);
                let orelse = self.stmts(orelse);
                NodeKind::If { test, body, orelse }
            }
            ast::Stmt::With(ast::StmtWith { items, body, .. }) => self.with(false, items, body),
            ast::Stmt::AsyncWith(ast::StmtAsyncWith { items, body, .. }) => {
                self.with(true, items, body)
            }
            ast::Stmt::Match(ast::StmtMatch { subject, cases, .. }) => {
                let subject = self.expr(subject);
                let cases = cases.iter().map(|case| self.match_case(case)).collect();
                NodeKind::Match { subject, cases }
            }
            ast::Stmt::Raise(ast::StmtRaise { exc, cause, .. }) => {
                let exc = self.opt_expr(exc);
                let cause = self.opt_expr(cause);
                NodeKind::Raise { exc, cause }
            }
            ast::Stmt::Try(ast::StmtTry {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            }) => self.try_stmt(false, body, handlers, orelse, finalbody),
            ast::Stmt::TryStar(ast::StmtTryStar {
                body,
                handlers,
                orelse,
                finalbody,
                ..
            }) => self.try_stmt(true, body, handlers, orelse, finalbody),
            ast::Stmt::Assert(ast::StmtAssert { test, msg, .. }) => {
                let test = self.expr(test);
                let msg = self.opt_expr(msg);
                NodeKind::Assert { test, msg }
            }
            ast::Stmt::Import(ast::StmtImport { names, .. }) => NodeKind::Import {
                names: self.aliases(names),
            },
            ast::Stmt::ImportFrom(ast::StmtImportFrom {
                module,
                names,
                level,
                ..
            }) => NodeKind::ImportFrom {
                module: opt_ident(module),
                names: self.aliases(names),
                level: level.as_ref().map(|level| level.to_u32()).unwrap_or(0),
            },
            ast::Stmt::Global(ast::StmtGlobal { names, .. }) => NodeKind::Global {
                names: names.iter().map(ident).collect(),
            },
            ast::Stmt::Nonlocal(ast::StmtNonlocal { names, .. }) => NodeKind::Nonlocal {
                names: names.iter().map(ident).collect(),
            },
            ast::Stmt::Expr(ast::StmtExpr { value, .. }) => NodeKind::Expr {
                value: self.expr(value),
            },
            ast::Stmt::Pass(_) => NodeKind::Pass,
            ast::Stmt::Break(_) => NodeKind::Break,
            ast::Stmt::Continue(_) => NodeKind::Continue,
        };
        self.add(kind)
    }

    #[allow(clippy::too_many_arguments)]
    fn function_def(
        &mut self,
        is_async: bool,
        name: &ast::Identifier,
        args: &ast::Arguments,
        body: &[ast::Stmt],
        decorator_list: &[ast::Expr],
        returns: &Option<Box<ast::Expr>>,
        type_params: &[ast::TypeParam],
    ) -> NodeKind {
        let decorators = self.exprs(decorator_list);
        let type_params = self.type_params(type_params);
        let args = self.arguments(args);
        let returns = self.opt_expr(returns);
        let body = self.stmts(body);
        NodeKind::FunctionDef {
            name: ident(name),
            is_async,
            args,
            body,
            decorators,
            returns,
            type_params,
        }
    }

    fn for_loop(
        &mut self,
        is_async: bool,
        target: &ast::Expr,
        iter: &ast::Expr,
        body: &[ast::Stmt],
        orelse: &[ast::Stmt],
    ) -> NodeKind {
        let target = self.expr(target);
        let iter = self.expr(iter);
        let body = self.stmts(body);
        let orelse = self.stmts(orelse);
        NodeKind::For {
            is_async,
            target,
            iter,
            body,
            orelse,
        }
    }

    fn with(&mut self, is_async: bool, items: &[ast::WithItem], body: &[ast::Stmt]) -> NodeKind {
        let items = items
            .iter()
            .map(|item| {
                let context_expr = self.expr(&item.context_expr);
                let optional_vars = self.opt_expr(&item.optional_vars);
                self.add(NodeKind::WithItem {
                    context_expr,
                    optional_vars,
                })
            })
            .collect();
        let body = self.stmts(body);
        NodeKind::With {
            is_async,
            items,
            body,
        }
    }

    fn try_stmt(
        &mut self,
        is_star: bool,
        body: &[ast::Stmt],
        handlers: &[ast::ExceptHandler],
        orelse: &[ast::Stmt],
        finalbody: &[ast::Stmt],
    ) -> NodeKind {
        let body = self.stmts(body);
        let handlers = handlers
            .iter()
            .map(|handler| match handler {
                ast::ExceptHandler::ExceptHandler(ast::ExceptHandlerExceptHandler {
                    type_,
                    name,
                    body,
                    ..
                }) => {
                    let type_ = self.opt_expr(type_);
                    let body = self.stmts(body);
                    self.add(NodeKind::ExceptHandler {
                        type_,
                        name: opt_ident(name),
                        body,
                    })
                }
            })
            .collect();
        let orelse = self.stmts(orelse);
        let finalbody = self.stmts(finalbody);
        NodeKind::Try {
            is_star,
            body,
            handlers,
            orelse,
            finalbody,
        }
    }

    fn aliases(&mut self, aliases: &[ast::Alias]) -> Vec<NodeId> {
        aliases
            .iter()
            .map(|alias| {
                self.add(NodeKind::Alias {
                    name: ident(&alias.name),
                    asname: opt_ident(&alias.asname),
                })
            })
            .collect()
    }

    fn keywords(&mut self, keywords: &[ast::Keyword]) -> Vec<NodeId> {
        keywords
            .iter()
            .map(|keyword| {
                let value = self.expr(&keyword.value);
                self.add(NodeKind::Keyword {
                    arg: opt_ident(&keyword.arg),
                    value,
                })
            })
            .collect()
    }

    fn arg(&mut self, arg: &ast::Arg) -> NodeId {
        let annotation = self.opt_expr(&arg.annotation);
        self.add(NodeKind::Arg {
            arg: ident(&arg.arg),
            annotation,
        })
    }

    fn arguments(&mut self, arguments: &ast::Arguments) -> NodeId {
        let mut defaults = Vec::new();
        let mut positional = |converter: &mut Self, list: &[ast::ArgWithDefault]| -> Vec<NodeId> {
            list.iter()
                .map(|param| {
                    let id = converter.arg(&param.def);
                    if let Some(default) = &param.default {
                        defaults.push(converter.expr(default));
                    }
                    id
                })
                .collect()
        };
        let posonlyargs = positional(self, &arguments.posonlyargs);
        let args = positional(self, &arguments.args);
        let vararg = arguments.vararg.as_ref().map(|arg| self.arg(arg));
        let mut kw_defaults = Vec::new();
        let kwonlyargs = arguments
            .kwonlyargs
            .iter()
            .map(|param| {
                let id = self.arg(&param.def);
                kw_defaults.push(param.default.as_ref().map(|default| self.expr(default)));
                id
            })
            .collect();
        let kwarg = arguments.kwarg.as_ref().map(|arg| self.arg(arg));
        self.add(NodeKind::Arguments {
            posonlyargs,
            args,
            vararg,
            kwonlyargs,
            kw_defaults,
            kwarg,
            defaults,
        })
    }

    fn type_params(&mut self, params: &[ast::TypeParam]) -> Vec<NodeId> {
        params
            .iter()
            .map(|param| {
                let kind = match param {
                    ast::TypeParam::TypeVar(ast::TypeParamTypeVar { name, bound, .. }) => {
                        NodeKind::TypeVar {
                            name: ident(name),
                            bound: self.opt_expr(bound),
                        }
                    }
                    ast::TypeParam::ParamSpec(ast::TypeParamParamSpec { name, .. }) => {
                        NodeKind::ParamSpec { name: ident(name) }
                    }
                    ast::TypeParam::TypeVarTuple(ast::TypeParamTypeVarTuple { name, .. }) => {
                        NodeKind::TypeVarTuple { name: ident(name) }
                    }
                };
                self.add(kind)
            })
            .collect()
    }

    fn match_case(&mut self, case: &ast::MatchCase) -> NodeId {
        let pattern = self.pattern(&case.pattern);
        let guard = self.opt_expr(&case.guard);
        let body = self.stmts(&case.body);
        self.add(NodeKind::MatchCase {
            pattern,
            guard,
            body,
        })
    }

    fn patterns(&mut self, patterns: &[ast::Pattern]) -> Vec<NodeId> {
        patterns.iter().map(|p| self.pattern(p)).collect()
    }

    fn pattern(&mut self, pattern: &ast::Pattern) -> NodeId {
        let kind = match pattern {
            ast::Pattern::MatchValue(ast::PatternMatchValue { value, .. }) => NodeKind::MatchValue {
                value: self.expr(value),
            },
            ast::Pattern::MatchSingleton(ast::PatternMatchSingleton { value, .. }) => {
                NodeKind::MatchSingleton {
                    value: literal(value),
                }
            }
            ast::Pattern::MatchSequence(ast::PatternMatchSequence { patterns, .. }) => {
                NodeKind::MatchSequence {
                    patterns: self.patterns(patterns),
                }
            }
            ast::Pattern::MatchMapping(ast::PatternMatchMapping {
                keys,
                patterns,
                rest,
                ..
            }) => {
                let keys = self.exprs(keys);
                let patterns = self.patterns(patterns);
                NodeKind::MatchMapping {
                    keys,
                    patterns,
                    rest: opt_ident(rest),
                }
            }
            ast::Pattern::MatchClass(ast::PatternMatchClass {
                cls,
                patterns,
                kwd_attrs,
                kwd_patterns,
                ..
            }) => {
                let cls = self.expr(cls);
                let patterns = self.patterns(patterns);
                let kwd_patterns = self.patterns(kwd_patterns);
                NodeKind::MatchClass {
                    cls,
                    patterns,
                    kwd_attrs: kwd_attrs.iter().map(ident).collect(),
                    kwd_patterns,
                }
            }
            ast::Pattern::MatchStar(ast::PatternMatchStar { name, .. }) => NodeKind::MatchStar {
                name: opt_ident(name),
            },
            ast::Pattern::MatchAs(ast::PatternMatchAs { pattern, name, .. }) => {
                let pattern = pattern.as_ref().map(|p| self.pattern(p));
                NodeKind::MatchAs {
                    pattern,
                    name: opt_ident(name),
                }
            }
            ast::Pattern::MatchOr(ast::PatternMatchOr { patterns, .. }) => NodeKind::MatchOr {
                patterns: self.patterns(patterns),
            },
        };
        self.add(kind)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Expressions
    // ───────────────────────────────────────────────────────────────────────────

    fn comprehensions(&mut self, generators: &[ast::Comprehension]) -> Vec<NodeId> {
        generators
            .iter()
            .map(|generator| {
                let target = self.expr(&generator.target);
                let iter = self.expr(&generator.iter);
                let ifs = self.exprs(&generator.ifs);
                self.add(NodeKind::Comprehension {
                    target,
                    iter,
                    ifs,
                    is_async: generator.is_async,
                })
            })
            .collect()
    }

    fn constant(&mut self, value: &ast::Constant) -> NodeId {
        match value {
            ast::Constant::Tuple(items) => {
                let elts = items.iter().map(|item| self.constant(item)).collect();
                self.add(NodeKind::Tuple {
                    elts,
                    ctx: ExprContext::Load,
                })
            }
            other => self.add(NodeKind::Constant {
                value: literal(other),
            }),
        }
    }

    /// Interpolated-string parts with adjacent text merged and empty text dropped, so
    /// implicit concatenation and re-parsed output normalize the same way.
    fn joined_parts(&mut self, values: &[ast::Expr]) -> Vec<NodeId> {
        let mut parts = Vec::new();
        let mut text: Option<String> = None;
        self.collect_parts(values, &mut parts, &mut text);
        if let Some(text) = text.take().filter(|t| !t.is_empty()) {
            parts.push(self.add(NodeKind::Constant {
                value: Literal::Str(text),
            }));
        }
        parts
    }

    fn collect_parts(&mut self, values: &[ast::Expr], parts: &mut Vec<NodeId>, text: &mut Option<String>) {
        for value in values {
            match value {
                ast::Expr::Constant(ast::ExprConstant {
                    value: ast::Constant::Str(s),
                    ..
                }) => text.get_or_insert_with(String::new).push_str(s),
                ast::Expr::JoinedStr(ast::ExprJoinedStr { values, .. }) => {
                    self.collect_parts(values, parts, text);
                }
                other => {
                    if let Some(pending) = text.take().filter(|t| !t.is_empty()) {
                        parts.push(self.add(NodeKind::Constant {
                            value: Literal::Str(pending),
                        }));
                    }
                    parts.push(self.expr(other));
                }
            }
        }
    }

    fn expr(&mut self, expr: &ast::Expr) -> NodeId {
        let kind = match expr {
            ast::Expr::BoolOp(ast::ExprBoolOp { op, values, .. }) => NodeKind::BoolOp {
                op: match op {
                    ast::BoolOp::And => BoolOperator::And,
                    ast::BoolOp::Or => BoolOperator::Or,
                },
                values: self.exprs(values),
            },
            ast::Expr::NamedExpr(ast::ExprNamedExpr { target, value, .. }) => {
                let target = self.expr(target);
                let value = self.expr(value);
                NodeKind::NamedExpr { target, value }
            }
            ast::Expr::BinOp(ast::ExprBinOp {
                left, op, right, ..
            }) => {
                let left = self.expr(left);
                let right = self.expr(right);
                NodeKind::BinOp {
                    left,
                    op: operator(op),
                    right,
                }
            }
            ast::Expr::UnaryOp(ast::ExprUnaryOp { op, operand, .. }) => NodeKind::UnaryOp {
                op: unary_operator(op),
                operand: self.expr(operand),
            },
            ast::Expr::Lambda(ast::ExprLambda { args, body, .. }) => {
                let args = self.arguments(args);
                let body = self.expr(body);
                NodeKind::Lambda { args, body }
            }
            ast::Expr::IfExp(ast::ExprIfExp {
                test, body, orelse, ..
            }) => {
                let test = self.expr(test);
                let body = self.expr(body);
                let orelse = self.expr(orelse);
                NodeKind::IfExp { test, body, orelse }
            }
            ast::Expr::Dict(ast::ExprDict { keys, values, .. }) => {
                let keys = keys
                    .iter()
                    .map(|key| key.as_ref().map(|key| self.expr(key)))
                    .collect();
                let values = self.exprs(values);
                NodeKind::Dict { keys, values }
            }
            ast::Expr::Set(ast::ExprSet { elts, .. }) => NodeKind::Set {
                elts: self.exprs(elts),
            },
            ast::Expr::ListComp(ast::ExprListComp {
                elt, generators, ..
            }) => {
                let elt = self.expr(elt);
                let generators = self.comprehensions(generators);
                NodeKind::ListComp { elt, generators }
            }
            ast::Expr::SetComp(ast::ExprSetComp {
                elt, generators, ..
            }) => {
                let elt = self.expr(elt);
                let generators = self.comprehensions(generators);
                NodeKind::SetComp { elt, generators }
            }
            ast::Expr::DictComp(ast::ExprDictComp {
                key,
                value,
                generators,
                ..
            }) => {
                let key = self.expr(key);
                let value = self.expr(value);
                let generators = self.comprehensions(generators);
                NodeKind::DictComp {
                    key,
                    value,
                    generators,
                }
            }
            ast::Expr::GeneratorExp(ast::ExprGeneratorExp {
                elt, generators, ..
            }) => {
                let elt = self.expr(elt);
                let generators = self.comprehensions(generators);
                NodeKind::GeneratorExp { elt, generators }
            }
            ast::Expr::Await(ast::ExprAwait { value, .. }) => NodeKind::Await {
                value: self.expr(value),
            },
            ast::Expr::Yield(ast::ExprYield { value, .. }) => NodeKind::Yield {
                value: self.opt_expr(value),
            },
            ast::Expr::YieldFrom(ast::ExprYieldFrom { value, .. }) => NodeKind::YieldFrom {
                value: self.expr(value),
            },
            ast::Expr::Compare(ast::ExprCompare {
                left,
                ops,
                comparators,
                ..
            }) => {
                let left = self.expr(left);
                let comparators = self.exprs(comparators);
                NodeKind::Compare {
                    left,
                    ops: ops.iter().map(compare_operator).collect(),
                    comparators,
                }
            }
            ast::Expr::Call(ast::ExprCall {
                func,
                args,
                keywords,
                ..
            }) => {
                let func = self.expr(func);
                let args = self.exprs(args);
                let keywords = self.keywords(keywords);
                NodeKind::Call {
                    func,
                    args,
                    keywords,
                }
            }
            ast::Expr::FormattedValue(ast::ExprFormattedValue {
                value,
                conversion: flag,
                format_spec,
                ..
            }) => {
                let value = self.expr(value);
                let format_spec = format_spec.as_ref().map(|spec| match spec.as_ref() {
                    ast::Expr::JoinedStr(ast::ExprJoinedStr { values, .. }) => {
                        let values = self.joined_parts(values);
                        self.add(NodeKind::JoinedStr { values })
                    }
                    other => {
                        let values = self.joined_parts(std::slice::from_ref(other));
                        self.add(NodeKind::JoinedStr { values })
                    }
                });
                NodeKind::FormattedValue {
                    value,
                    conversion: conversion(flag),
                    format_spec,
                }
            }
            ast::Expr::JoinedStr(ast::ExprJoinedStr { values, range }) => {
                let values = self.joined_parts(values);
                let span = Span {
                    start: u32::from(range.start()),
                    end: u32::from(range.end()),
                };
                return self
                    .tree
                    .add_spanned(NodeKind::JoinedStr { values }, Some(span));
            }
            ast::Expr::Constant(ast::ExprConstant { value, .. }) => return self.constant(value),
            ast::Expr::Attribute(ast::ExprAttribute {
                value, attr, ctx, ..
            }) => NodeKind::Attribute {
                value: self.expr(value),
                attr: ident(attr),
                ctx: context(ctx),
            },
            ast::Expr::Subscript(ast::ExprSubscript {
                value, slice, ctx, ..
            }) => {
                let value = self.expr(value);
                let slice = self.expr(slice);
                NodeKind::Subscript {
                    value,
                    slice,
                    ctx: context(ctx),
                }
            }
            ast::Expr::Starred(ast::ExprStarred { value, ctx, .. }) => NodeKind::Starred {
                value: self.expr(value),
                ctx: context(ctx),
            },
            ast::Expr::Name(ast::ExprName { id, ctx, .. }) => NodeKind::Name {
                id: ident(id),
                ctx: context(ctx),
            },
            ast::Expr::List(ast::ExprList { elts, ctx, .. }) => NodeKind::List {
                elts: self.exprs(elts),
                ctx: context(ctx),
            },
            ast::Expr::Tuple(ast::ExprTuple { elts, ctx, .. }) => NodeKind::Tuple {
                elts: self.exprs(elts),
                ctx: context(ctx),
            },
            ast::Expr::Slice(ast::ExprSlice {
                lower, upper, step, ..
            }) => {
                let lower = self.opt_expr(lower);
                let upper = self.opt_expr(upper);
                let step = self.opt_expr(step);
                NodeKind::Slice { lower, upper, step }
            }
        };
        self.add(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_builds_rooted_tree() {
        let tree = PythonFrontend.parse_module("x = 1\n", "test.py").unwrap();
        match tree.kind(tree.root()) {
            NodeKind::Module { body } => assert_eq!(body.len(), 1),
            other => panic!("unexpected root {}", other.name()),
        }
    }

    #[test]
    fn test_parse_error_carries_filename() {
        let err = PythonFrontend.parse_module("def (:\n", "broken.py").unwrap_err();
        assert_eq!(err.filename, "broken.py");
    }

    #[test]
    fn test_fstring_keeps_source_span() {
        let tree = PythonFrontend.parse_expression("f'a{b}c'").unwrap();
        let NodeKind::Expression { body } = tree.kind(tree.root()) else {
            panic!("expected eval root");
        };
        assert_eq!(tree.span_text(*body), Some("f'a{b}c'"));
    }

    #[test]
    fn test_imaginary_literal() {
        let tree = PythonFrontend.parse_expression("2j").unwrap();
        let NodeKind::Expression { body } = tree.kind(tree.root()) else {
            panic!("expected eval root");
        };
        assert_eq!(
            tree.kind(*body),
            &NodeKind::Constant {
                value: Literal::Complex(2.0)
            }
        );
    }
}
