//! Literal hoisting
//!
//! Repeated literal values are grouped into one [`BindingKind::HoistedLiteral`] binding
//! per value, placed in the deepest module or function scope shared by all occurrences.
//! Nothing is rewritten here: the renamer decides whether a group is worth a variable.
//!
//! [`BindingKind::HoistedLiteral`]: crate::binding::BindingKind::HoistedLiteral

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::binding::{Binding, LiteralKey};
use crate::scope::scope_chain;
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use crate::visitor::preorder;

/// Whether a constant may be replaced by a name load.
fn is_hoistable(tree: &SyntaxTree, constant: NodeId) -> bool {
    let Some(parent) = tree.parent(constant) else {
        return false;
    };
    match tree.kind(parent) {
        // docstrings and other literal statements
        NodeKind::Expr { .. } => false,
        // f-string text and format specs must stay literal
        NodeKind::JoinedStr { .. } | NodeKind::TemplateStr { .. } => false,
        _ => !tree.in_pattern(constant),
    }
}

/// Module and function scopes enclosing a node, outermost first. Only these can hold the
/// injected assignment.
fn statement_path(tree: &SyntaxTree, id: NodeId) -> Vec<NodeId> {
    let Some(namespace) = tree.namespace(id) else {
        return Vec::new();
    };
    let mut path: Vec<NodeId> = scope_chain(tree, namespace)
        .into_iter()
        .filter(|&scope| {
            matches!(
                tree.kind(scope),
                NodeKind::Module { .. } | NodeKind::FunctionDef { .. }
            )
        })
        .collect();
    path.reverse();
    path
}

fn deepest_common(paths: &[Vec<NodeId>]) -> Option<NodeId> {
    let first = paths.first()?;
    let mut common = None;
    for (depth, &scope) in first.iter().enumerate() {
        if paths.iter().all(|path| path.get(depth) == Some(&scope)) {
            common = Some(scope);
        } else {
            break;
        }
    }
    common
}

/// Group repeated literals into hoisted bindings. Returns the number of groups created.
pub fn hoist_literals(tree: &mut SyntaxTree) -> usize {
    let root = tree.root();
    if !matches!(tree.kind(root), NodeKind::Module { .. }) {
        return 0;
    }
    if tree.scope(root).tainted {
        debug!("module uses dynamic name access, hoisting skipped");
        return 0;
    }

    let mut groups: FxHashMap<LiteralKey, Vec<NodeId>> = FxHashMap::default();
    let mut order: Vec<LiteralKey> = Vec::new();
    for id in preorder(tree, root) {
        let NodeKind::Constant { value } = tree.kind(id) else {
            continue;
        };
        if !is_hoistable(tree, id) {
            continue;
        }
        let key = LiteralKey::of(value);
        let occurrences = groups.entry(key.clone()).or_default();
        if occurrences.is_empty() {
            order.push(key);
        }
        occurrences.push(id);
    }

    let mut created = 0;
    for key in order {
        let occurrences = match groups.remove(&key) {
            Some(occurrences) if occurrences.len() > 1 => occurrences,
            _ => continue,
        };
        let paths: Vec<Vec<NodeId>> = occurrences
            .iter()
            .map(|&id| statement_path(tree, id))
            .collect();
        let Some(placement) = deepest_common(&paths) else {
            continue;
        };
        trace!(
            occurrences = occurrences.len(),
            scope = tree.kind(placement).name(),
            "literal group placed"
        );
        let mut binding = Binding::hoisted(key);
        binding.references = occurrences;
        tree.scope_mut(placement).bindings.push(binding);
        created += 1;
    }
    debug!(groups = created, "literals hoisted");
    created
}
