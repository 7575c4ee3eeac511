//! Binding resolution
//!
//! Two passes over a mapped tree. The bind pass creates a [`Binding`] for every name a
//! scope declares and records each declaring site. The resolve pass attaches every load
//! to the binding it reads, falling back to implicit builtins at module level.

use tracing::debug;

use crate::binding::{parameter_renames_in_place, Binding, BindingKind};
use crate::scope::{
    binding_target, find_binding, is_builtin, is_dunder, is_redirected, resolve,
    TAINTING_BUILTINS,
};
use crate::tree::{ExprContext, NodeId, NodeKind, SyntaxTree};
use crate::visitor::preorder;

/// Map namespaces and build all bindings. Any previous annotation is discarded.
pub fn annotate(tree: &mut SyntaxTree) {
    crate::mapper::add_namespace(tree);
    bind_names(tree);
    resolve_names(tree);
}

// ═══════════════════════════════════════════════════════════════════════════════
// BIND PASS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct BindSite {
    site: NodeId,
    name: String,
    namespace: NodeId,
    allow_rename: bool,
    /// The name must stay valid where it is declared, even after a rename.
    keep_original: bool,
}

impl BindSite {
    fn new(site: NodeId, name: &str, namespace: NodeId) -> Self {
        BindSite {
            site,
            name: name.to_string(),
            namespace,
            allow_rename: true,
            keep_original: false,
        }
    }

    fn fixed(mut self) -> Self {
        self.allow_rename = false;
        self
    }
}

fn is_future_import(tree: &SyntaxTree, alias: NodeId) -> bool {
    tree.parent(alias)
        .map(|stmt| {
            matches!(
                tree.kind(stmt),
                NodeKind::ImportFrom { module: Some(m), .. } if m == "__future__"
            )
        })
        .unwrap_or(false)
}

fn collect_sites(tree: &SyntaxTree) -> Vec<BindSite> {
    let mut sites = Vec::new();
    for id in preorder(tree, tree.root()) {
        let Some(namespace) = tree.namespace(id) else {
            continue;
        };
        match tree.kind(id) {
            NodeKind::Name { id: name, ctx } if *ctx != ExprContext::Load => {
                sites.push(BindSite::new(id, name, namespace));
            }
            NodeKind::FunctionDef { name, .. } | NodeKind::ClassDef { name, .. } => {
                sites.push(BindSite::new(id, name, namespace));
            }
            NodeKind::Alias { name, asname } => {
                if name == "*" {
                    continue;
                }
                let future = is_future_import(tree, id);
                let site = match asname {
                    Some(asname) => BindSite::new(id, asname, namespace),
                    None => match name.split_once('.') {
                        // `import a.b` binds `a`, and the statement can't be aliased
                        Some((head, _)) => BindSite::new(id, head, namespace).fixed(),
                        None => BindSite::new(id, name, namespace),
                    },
                };
                sites.push(if future { site.fixed() } else { site });
            }
            NodeKind::Arg { arg, .. } => {
                let owner = tree.parent(id).and_then(|arguments| tree.parent(arguments));
                let is_lambda = owner
                    .map(|owner| matches!(tree.kind(owner), NodeKind::Lambda { .. }))
                    .unwrap_or(false);
                let in_place = parameter_renames_in_place(tree, id);
                let mut site = BindSite::new(id, arg, namespace);
                if is_lambda && !in_place {
                    site = site.fixed();
                } else if !in_place {
                    site.keep_original = true;
                }
                sites.push(site);
            }
            NodeKind::ExceptHandler { name: Some(name), .. }
            | NodeKind::MatchAs { name: Some(name), .. }
            | NodeKind::MatchStar { name: Some(name) }
            | NodeKind::MatchMapping {
                rest: Some(name), ..
            } => {
                sites.push(BindSite::new(id, name, namespace));
            }
            NodeKind::Global { names } | NodeKind::Nonlocal { names } => {
                for name in names {
                    sites.push(BindSite::new(id, name, namespace));
                }
            }
            NodeKind::TypeVar { name, .. }
            | NodeKind::ParamSpec { name }
            | NodeKind::TypeVarTuple { name } => {
                sites.push(BindSite::new(id, name, namespace).fixed());
            }
            _ => {}
        }
    }
    sites
}

fn bind_site(tree: &mut SyntaxTree, site: &BindSite) {
    let (target, class_attribute) = binding_target(tree, site.namespace, &site.name);
    let index = match find_binding(tree, target, &site.name) {
        Some(found) => found.index,
        None => {
            let bindings = &mut tree.scope_mut(target).bindings;
            bindings.push(Binding::declared(&site.name));
            bindings.len() - 1
        }
    };
    let binding = &mut tree.scope_mut(target).bindings[index];
    binding.references.push(site.site);
    if class_attribute
        || !site.allow_rename
        || is_dunder(&site.name)
        || is_builtin(&site.name)
    {
        binding.disallow_rename();
    }
    if site.keep_original {
        binding.reserved = Some(site.name.clone());
    }
}

/// Create a Declared binding for every binding site. Sites redirected by `global` or
/// `nonlocal` are bound last so the binder they refer to already exists.
pub fn bind_names(tree: &mut SyntaxTree) {
    let sites = collect_sites(tree);
    let (redirected, direct): (Vec<BindSite>, Vec<BindSite>) = sites
        .into_iter()
        .partition(|site| is_redirected(tree, site.namespace, &site.name));
    for site in direct.iter().chain(redirected.iter()) {
        bind_site(tree, site);
    }
    debug!(sites = direct.len() + redirected.len(), "names bound");
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVE PASS
// ═══════════════════════════════════════════════════════════════════════════════

/// Attach every name load to the binding it reads.
pub fn resolve_names(tree: &mut SyntaxTree) {
    let module = tree.module();
    let mut builtins = 0usize;
    for id in preorder(tree, tree.root()) {
        let (name, namespace) = match (tree.kind(id), tree.namespace(id)) {
            (
                NodeKind::Name {
                    id: name,
                    ctx: ExprContext::Load,
                },
                Some(namespace),
            ) => (name.clone(), namespace),
            _ => continue,
        };

        if let Some(found) = resolve(tree, namespace, &name) {
            tree.scope_mut(found.scope).bindings[found.index]
                .references
                .push(id);
            continue;
        }

        let mut binding = if is_builtin(&name) {
            builtins += 1;
            let mut binding = Binding::builtin(&name);
            // zero-argument super() finds its class cell through the literal name
            if name == "super" || is_dunder(&name) {
                binding.disallow_rename();
            }
            if TAINTING_BUILTINS.contains(name.as_str()) {
                debug!(builtin = %name, "module tainted by dynamic name access");
                tree.scope_mut(module).tainted = true;
            }
            binding
        } else {
            // An undefined name: a runtime NameError already, so leave it untouched.
            let mut binding = Binding::declared(&name);
            binding.disallow_rename();
            binding
        };
        binding.references.push(id);
        tree.scope_mut(module).bindings.push(binding);
    }
    debug!(builtins, "names resolved");
}

/// All bindings of the tree with their owning scope, in pre-order of the scope nodes.
pub fn all_bindings(tree: &SyntaxTree) -> Vec<crate::binding::BindingRef> {
    let mut out = Vec::new();
    for id in preorder(tree, tree.root()) {
        if tree.node(id).scope.is_none() {
            continue;
        }
        for index in 0..tree.scope(id).bindings.len() {
            out.push(crate::binding::BindingRef { scope: id, index });
        }
    }
    out
}

/// Whether a load resolves to an implicit builtin of the given name.
pub fn is_builtin_reference(tree: &SyntaxTree, name_node: NodeId) -> bool {
    let (name, namespace) = match (tree.kind(name_node), tree.namespace(name_node)) {
        (NodeKind::Name { id, .. }, Some(namespace)) => (id, namespace),
        _ => return false,
    };
    match resolve(tree, namespace, name) {
        Some(found) => {
            tree.scope(found.scope).bindings[found.index].kind == BindingKind::ImplicitBuiltin
        }
        None => false,
    }
}
