//! Namespace mapper
//!
//! Sets the parent and namespace link of every node and attaches an empty [`Scope`] to
//! every namespace node. `global`/`nonlocal` declarations are collected here, along with
//! the names a class body reads, so the binder can redirect them.

use tracing::debug;

use crate::tree::{ExprContext, NodeId, NodeKind, Scope, SyntaxTree};
use crate::visitor::{field_nodes, fields};

/// Annotate the whole tree. Safe to call again after edits; scopes are rebuilt empty.
pub fn add_namespace(tree: &mut SyntaxTree) {
    let root = tree.root();
    map_node(tree, root, None, None);
    debug!(nodes = tree.len(), "namespaces mapped");
}

fn map_node(tree: &mut SyntaxTree, id: NodeId, parent: Option<NodeId>, namespace: Option<NodeId>) {
    {
        let node = tree.node_mut(id);
        node.parent = parent;
        node.namespace = namespace;
        node.scope = if node.kind.is_scope() {
            Some(Box::new(Scope::default()))
        } else {
            None
        };
    }

    record_declarations(tree, id, parent, namespace);

    let inner = if tree.kind(id).is_scope() {
        Some(id)
    } else {
        namespace
    };

    let plan: Vec<(&'static str, Vec<NodeId>)> = fields(tree.kind(id))
        .iter()
        .map(|(name, field)| (*name, field_nodes(field)))
        .collect();

    for (field, kids) in plan {
        for kid in kids {
            let child_namespace = child_namespace(tree, id, field, inner, namespace);
            map_node(tree, kid, Some(id), child_namespace);
        }
    }
}

/// Global/nonlocal statements, and loads in a class body that must skip the class.
fn record_declarations(
    tree: &mut SyntaxTree,
    id: NodeId,
    parent: Option<NodeId>,
    namespace: Option<NodeId>,
) {
    let Some(namespace) = namespace else {
        return;
    };
    let is_class = matches!(tree.kind(namespace), NodeKind::ClassDef { .. });
    let augmented = parent
        .map(|p| matches!(tree.kind(p), NodeKind::AugAssign { .. }))
        .unwrap_or(false);
    let (globals, nonlocals): (Vec<String>, Vec<String>) = match tree.kind(id) {
        NodeKind::Global { names } => (names.clone(), Vec::new()),
        NodeKind::Nonlocal { names } => (Vec::new(), names.clone()),
        NodeKind::Name { id: name, ctx } if is_class => {
            if *ctx == ExprContext::Load || (*ctx == ExprContext::Store && augmented) {
                (Vec::new(), vec![name.clone()])
            } else {
                return;
            }
        }
        _ => return,
    };
    let scope = tree.scope_mut(namespace);
    scope.global_names.extend(globals);
    scope.nonlocal_names.extend(nonlocals);
}

fn child_namespace(
    tree: &SyntaxTree,
    id: NodeId,
    field: &str,
    inner: Option<NodeId>,
    outer: Option<NodeId>,
) -> Option<NodeId> {
    match tree.kind(id) {
        // Decorators and annotations are evaluated where the def statement runs.
        NodeKind::FunctionDef { .. } if matches!(field, "decorator_list" | "returns") => outer,
        NodeKind::ClassDef { .. } if matches!(field, "decorator_list" | "bases" | "keywords") => {
            outer
        }
        NodeKind::Arguments { .. } if matches!(field, "defaults" | "kw_defaults") => {
            owner_namespace(tree, id)
        }
        NodeKind::Arg { .. } if field == "annotation" => {
            tree.parent(id).and_then(|arguments| owner_namespace(tree, arguments))
        }
        // Only the first iterable is evaluated outside the comprehension.
        NodeKind::Comprehension { .. } if field == "iter" => {
            let comprehension_scope = tree.parent(id);
            let is_first = comprehension_scope
                .map(|scope| first_generator(tree, scope) == Some(id))
                .unwrap_or(false);
            if is_first {
                comprehension_scope.and_then(|scope| tree.namespace(scope))
            } else {
                inner
            }
        }
        NodeKind::NamedExpr { .. } if field == "target" => {
            let mut current = inner;
            while let Some(scope) = current {
                if !tree.kind(scope).is_comprehension_scope() {
                    break;
                }
                current = tree.namespace(scope);
            }
            current
        }
        _ => inner,
    }
}

/// Namespace the function or lambda owning an `arguments` node is defined in.
fn owner_namespace(tree: &SyntaxTree, arguments: NodeId) -> Option<NodeId> {
    tree.parent(arguments).and_then(|owner| tree.namespace(owner))
}

fn first_generator(tree: &SyntaxTree, scope: NodeId) -> Option<NodeId> {
    match tree.kind(scope) {
        NodeKind::ListComp { generators, .. }
        | NodeKind::SetComp { generators, .. }
        | NodeKind::DictComp { generators, .. }
        | NodeKind::GeneratorExp { generators, .. } => generators.first().copied(),
        _ => None,
    }
}
