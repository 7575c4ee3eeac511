use crate::tree::{ExprContext, Literal, NodeId, NodeKind, SyntaxTree};

/// Non-node field payloads. Operators are carried by their source spelling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Literal(&'a Literal),
    Bool(bool),
    Int(u32),
    Op(&'static str),
    Ops(&'a [crate::tree::CmpOperator]),
    Conversion(crate::tree::Conversion),
}

/// One named field of a node, in declaration order.
#[derive(Debug, Clone, Copy)]
pub enum Field<'a> {
    Node(NodeId),
    OptNode(Option<NodeId>),
    Nodes(&'a [NodeId]),
    OptNodes(&'a [Option<NodeId>]),
    Ident(&'a str),
    OptIdent(Option<&'a str>),
    Idents(&'a [String]),
    Scalar(Scalar<'a>),
    /// Load/store/delete marker; ignored by structural comparison.
    Ctx(ExprContext),
}

/// The single authoritative field listing for every node kind.
///
/// Child iteration, pre-order numbering and the stability comparison are all derived
/// from this table, so the traversal order is fixed in one place.
pub fn fields(kind: &NodeKind) -> Vec<(&'static str, Field<'_>)> {
    use Field::*;
    match kind {
        NodeKind::Module { body } => vec![("body", Nodes(body))],
        NodeKind::Expression { body } => vec![("body", Node(*body))],
        NodeKind::FunctionDef {
            name,
            is_async: _,
            args,
            body,
            decorators,
            returns,
            type_params,
        } => vec![
            ("decorator_list", Nodes(decorators)),
            ("name", Ident(name)),
            ("type_params", Nodes(type_params)),
            ("args", Node(*args)),
            ("returns", OptNode(*returns)),
            ("body", Nodes(body)),
        ],
        NodeKind::ClassDef {
            name,
            bases,
            keywords,
            body,
            decorators,
            type_params,
        } => vec![
            ("decorator_list", Nodes(decorators)),
            ("name", Ident(name)),
            ("type_params", Nodes(type_params)),
            ("bases", Nodes(bases)),
            ("keywords", Nodes(keywords)),
            ("body", Nodes(body)),
        ],
        NodeKind::Return { value } => vec![("value", OptNode(*value))],
        NodeKind::Delete { targets } => vec![("targets", Nodes(targets))],
        NodeKind::Assign { targets, value } => {
            vec![("targets", Nodes(targets)), ("value", Node(*value))]
        }
        NodeKind::TypeAlias {
            name,
            type_params,
            value,
        } => vec![
            ("name", Node(*name)),
            ("type_params", Nodes(type_params)),
            ("value", Node(*value)),
        ],
        NodeKind::AugAssign { target, op, value } => vec![
            ("target", Node(*target)),
            ("op", Scalar(self::Scalar::Op(op.symbol()))),
            ("value", Node(*value)),
        ],
        NodeKind::AnnAssign {
            target,
            annotation,
            value,
            simple,
        } => vec![
            ("target", Node(*target)),
            ("annotation", Node(*annotation)),
            ("value", OptNode(*value)),
            ("simple", Scalar(self::Scalar::Bool(*simple))),
        ],
        NodeKind::For {
            is_async: _,
            target,
            iter,
            body,
            orelse,
        } => vec![
            ("target", Node(*target)),
            ("iter", Node(*iter)),
            ("body", Nodes(body)),
            ("orelse", Nodes(orelse)),
        ],
        NodeKind::While { test, body, orelse } | NodeKind::If { test, body, orelse } => vec![
            ("test", Node(*test)),
            ("body", Nodes(body)),
            ("orelse", Nodes(orelse)),
        ],
        NodeKind::With {
            is_async: _,
            items,
            body,
        } => vec![("items", Nodes(items)), ("body", Nodes(body))],
        NodeKind::Match { subject, cases } => {
            vec![("subject", Node(*subject)), ("cases", Nodes(cases))]
        }
        NodeKind::Raise { exc, cause } => {
            vec![("exc", OptNode(*exc)), ("cause", OptNode(*cause))]
        }
        NodeKind::Try {
            is_star: _,
            body,
            handlers,
            orelse,
            finalbody,
        } => vec![
            ("body", Nodes(body)),
            ("handlers", Nodes(handlers)),
            ("orelse", Nodes(orelse)),
            ("finalbody", Nodes(finalbody)),
        ],
        NodeKind::Assert { test, msg } => vec![("test", Node(*test)), ("msg", OptNode(*msg))],
        NodeKind::Import { names } => vec![("names", Nodes(names))],
        NodeKind::ImportFrom {
            module,
            names,
            level,
        } => vec![
            ("module", OptIdent(module.as_deref())),
            ("names", Nodes(names)),
            ("level", Scalar(self::Scalar::Int(*level))),
        ],
        NodeKind::Global { names } | NodeKind::Nonlocal { names } => {
            vec![("names", Idents(names))]
        }
        NodeKind::Expr { value } => vec![("value", Node(*value))],
        NodeKind::Pass | NodeKind::Break | NodeKind::Continue => vec![],
        NodeKind::BoolOp { op, values } => vec![
            (
                "op",
                Scalar(self::Scalar::Op(match op {
                    crate::tree::BoolOperator::And => "and",
                    crate::tree::BoolOperator::Or => "or",
                })),
            ),
            ("values", Nodes(values)),
        ],
        NodeKind::NamedExpr { target, value } => {
            vec![("target", Node(*target)), ("value", Node(*value))]
        }
        NodeKind::BinOp { left, op, right } => vec![
            ("left", Node(*left)),
            ("op", Scalar(self::Scalar::Op(op.symbol()))),
            ("right", Node(*right)),
        ],
        NodeKind::UnaryOp { op, operand } => vec![
            ("op", Scalar(self::Scalar::Op(op.symbol()))),
            ("operand", Node(*operand)),
        ],
        NodeKind::Lambda { args, body } => vec![("args", Node(*args)), ("body", Node(*body))],
        NodeKind::IfExp { test, body, orelse } => vec![
            ("test", Node(*test)),
            ("body", Node(*body)),
            ("orelse", Node(*orelse)),
        ],
        NodeKind::Dict { keys, values } => {
            vec![("keys", OptNodes(keys)), ("values", Nodes(values))]
        }
        NodeKind::Set { elts } => vec![("elts", Nodes(elts))],
        NodeKind::ListComp { elt, generators }
        | NodeKind::SetComp { elt, generators }
        | NodeKind::GeneratorExp { elt, generators } => {
            vec![("elt", Node(*elt)), ("generators", Nodes(generators))]
        }
        NodeKind::DictComp {
            key,
            value,
            generators,
        } => vec![
            ("key", Node(*key)),
            ("value", Node(*value)),
            ("generators", Nodes(generators)),
        ],
        NodeKind::Await { value } | NodeKind::YieldFrom { value } => {
            vec![("value", Node(*value))]
        }
        NodeKind::Yield { value } => vec![("value", OptNode(*value))],
        NodeKind::Compare {
            left,
            ops,
            comparators,
        } => vec![
            ("left", Node(*left)),
            ("ops", Scalar(self::Scalar::Ops(ops))),
            ("comparators", Nodes(comparators)),
        ],
        NodeKind::Call {
            func,
            args,
            keywords,
        } => vec![
            ("func", Node(*func)),
            ("args", Nodes(args)),
            ("keywords", Nodes(keywords)),
        ],
        NodeKind::FormattedValue {
            value,
            conversion,
            format_spec,
        } => vec![
            ("value", Node(*value)),
            ("conversion", Scalar(self::Scalar::Conversion(*conversion))),
            ("format_spec", OptNode(*format_spec)),
        ],
        NodeKind::JoinedStr { values } | NodeKind::TemplateStr { values } => {
            vec![("values", Nodes(values))]
        }
        NodeKind::Constant { value } => vec![("value", Scalar(self::Scalar::Literal(value)))],
        NodeKind::Attribute { value, attr, ctx } => vec![
            ("value", Node(*value)),
            ("attr", Ident(attr)),
            ("ctx", Ctx(*ctx)),
        ],
        NodeKind::Subscript { value, slice, ctx } => vec![
            ("value", Node(*value)),
            ("slice", Node(*slice)),
            ("ctx", Ctx(*ctx)),
        ],
        NodeKind::Starred { value, ctx } => vec![("value", Node(*value)), ("ctx", Ctx(*ctx))],
        NodeKind::Name { id, ctx } => vec![("id", Ident(id)), ("ctx", Ctx(*ctx))],
        NodeKind::List { elts, ctx } | NodeKind::Tuple { elts, ctx } => {
            vec![("elts", Nodes(elts)), ("ctx", Ctx(*ctx))]
        }
        NodeKind::Slice { lower, upper, step } => vec![
            ("lower", OptNode(*lower)),
            ("upper", OptNode(*upper)),
            ("step", OptNode(*step)),
        ],
        NodeKind::Comprehension {
            target,
            iter,
            ifs,
            is_async,
        } => vec![
            ("target", Node(*target)),
            ("iter", Node(*iter)),
            ("ifs", Nodes(ifs)),
            ("is_async", Scalar(self::Scalar::Bool(*is_async))),
        ],
        NodeKind::ExceptHandler { type_, name, body } => vec![
            ("type", OptNode(*type_)),
            ("name", OptIdent(name.as_deref())),
            ("body", Nodes(body)),
        ],
        NodeKind::Arguments {
            posonlyargs,
            args,
            vararg,
            kwonlyargs,
            kw_defaults,
            kwarg,
            defaults,
        } => vec![
            ("posonlyargs", Nodes(posonlyargs)),
            ("args", Nodes(args)),
            ("vararg", OptNode(*vararg)),
            ("kwonlyargs", Nodes(kwonlyargs)),
            ("kw_defaults", OptNodes(kw_defaults)),
            ("kwarg", OptNode(*kwarg)),
            ("defaults", Nodes(defaults)),
        ],
        NodeKind::Arg { arg, annotation } => {
            vec![("arg", Ident(arg)), ("annotation", OptNode(*annotation))]
        }
        NodeKind::Keyword { arg, value } => {
            vec![("arg", OptIdent(arg.as_deref())), ("value", Node(*value))]
        }
        NodeKind::Alias { name, asname } => {
            vec![("name", Ident(name)), ("asname", OptIdent(asname.as_deref()))]
        }
        NodeKind::WithItem {
            context_expr,
            optional_vars,
        } => vec![
            ("context_expr", Node(*context_expr)),
            ("optional_vars", OptNode(*optional_vars)),
        ],
        NodeKind::MatchCase {
            pattern,
            guard,
            body,
        } => vec![
            ("pattern", Node(*pattern)),
            ("guard", OptNode(*guard)),
            ("body", Nodes(body)),
        ],
        NodeKind::MatchValue { value } => vec![("value", Node(*value))],
        NodeKind::MatchSingleton { value } => {
            vec![("value", Scalar(self::Scalar::Literal(value)))]
        }
        NodeKind::MatchSequence { patterns } | NodeKind::MatchOr { patterns } => {
            vec![("patterns", Nodes(patterns))]
        }
        NodeKind::MatchMapping {
            keys,
            patterns,
            rest,
        } => vec![
            ("keys", Nodes(keys)),
            ("patterns", Nodes(patterns)),
            ("rest", OptIdent(rest.as_deref())),
        ],
        NodeKind::MatchClass {
            cls,
            patterns,
            kwd_attrs,
            kwd_patterns,
        } => vec![
            ("cls", Node(*cls)),
            ("patterns", Nodes(patterns)),
            ("kwd_attrs", Idents(kwd_attrs)),
            ("kwd_patterns", Nodes(kwd_patterns)),
        ],
        NodeKind::MatchStar { name } => vec![("name", OptIdent(name.as_deref()))],
        NodeKind::MatchAs { pattern, name } => vec![
            ("pattern", OptNode(*pattern)),
            ("name", OptIdent(name.as_deref())),
        ],
        NodeKind::TypeVar { name, bound } => {
            vec![("name", Ident(name)), ("bound", OptNode(*bound))]
        }
        NodeKind::ParamSpec { name } | NodeKind::TypeVarTuple { name } => {
            vec![("name", Ident(name))]
        }
    }
}

/// Node handles carried by a single field.
pub fn field_nodes(field: &Field<'_>) -> Vec<NodeId> {
    match field {
        Field::Node(id) => vec![*id],
        Field::OptNode(Some(id)) => vec![*id],
        Field::Nodes(ids) => ids.to_vec(),
        Field::OptNodes(ids) => ids.iter().flatten().copied().collect(),
        _ => Vec::new(),
    }
}

/// Direct children of a node in field order.
pub fn children(kind: &NodeKind) -> Vec<NodeId> {
    fields(kind)
        .iter()
        .flat_map(|(_, field)| field_nodes(field))
        .collect()
}

/// Pre-order listing of the subtree rooted at `root`.
pub fn preorder(tree: &SyntaxTree, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        out.push(id);
        let mut kids = children(tree.kind(id));
        kids.reverse();
        stack.extend(kids);
    }
    out
}

/// Pre-order rank of every node reachable from the root, indexed by arena slot.
pub fn preorder_rank(tree: &SyntaxTree) -> Vec<usize> {
    let mut rank = vec![usize::MAX; tree.len()];
    for (position, id) in preorder(tree, tree.root()).into_iter().enumerate() {
        rank[id.index()] = position;
    }
    rank
}
