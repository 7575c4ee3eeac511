//! Cost-driven identifier renaming
//!
//! Every binding competes for short names. Bindings are visited from most to least
//! referenced; each takes the first generated name that is unclaimed in all scopes its
//! references pass through, and keeps it only when the cost model says the rename pays.

use std::cmp::Reverse;

use tracing::{debug, trace};

use crate::bind::all_bindings;
use crate::binding::{self, site_kind, BindingKind, BindingRef, SiteKind};
use crate::scope::{is_module_scope, is_unavailable};
use crate::tree::{NodeId, NodeKind, SyntaxTree};
use crate::visitor::preorder_rank;

// ═══════════════════════════════════════════════════════════════════════════════
// NAME GENERATION
// ═══════════════════════════════════════════════════════════════════════════════

const FIRST: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const REST: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// Infinite stream of identifiers, shortest first, skipping keywords and builtins.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    prefix: String,
    length: u32,
    counter: u64,
}

impl NameGenerator {
    pub fn new(prefix: &str) -> Self {
        NameGenerator {
            prefix: prefix.to_string(),
            length: 1,
            counter: 0,
        }
    }

    fn capacity(length: u32) -> u64 {
        FIRST.len() as u64 * (REST.len() as u64).pow(length - 1)
    }

    fn spell(&self) -> String {
        let mut digits = Vec::with_capacity(self.length as usize);
        let mut rest = self.counter;
        for _ in 1..self.length {
            digits.push(REST[(rest % REST.len() as u64) as usize]);
            rest /= REST.len() as u64;
        }
        digits.push(FIRST[rest as usize]);
        digits.reverse();
        digits.into_iter().map(char::from).collect()
    }
}

impl Iterator for NameGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.counter >= Self::capacity(self.length) {
                self.length += 1;
                self.counter = 0;
            }
            let name = self.spell();
            self.counter += 1;
            if !is_unavailable(&name) {
                return Some(format!("{}{}", self.prefix, name));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESERVATION SCOPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Every scope a reference passes through on its way to the binding's owner. A new name
/// must be free in all of them.
pub fn reservation_scope(tree: &SyntaxTree, at: BindingRef) -> Vec<NodeId> {
    let mut scopes = vec![at.scope];
    for &site in &tree.scope(at.scope).bindings[at.index].references {
        let mut current = tree.namespace(site);
        while let Some(scope) = current {
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
            if scope == at.scope {
                break;
            }
            current = tree.namespace(scope);
        }
    }
    scopes
}

pub fn is_free(tree: &SyntaxTree, scopes: &[NodeId], name: &str) -> bool {
    scopes
        .iter()
        .all(|&scope| !tree.scope(scope).assigned_names.contains(name))
}

fn claim(tree: &mut SyntaxTree, scopes: &[NodeId], name: &str) {
    for &scope in scopes {
        tree.scope_mut(scope)
            .assigned_names
            .insert(name.to_string());
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RENAMING
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    pub rename_locals: bool,
    pub rename_globals: bool,
    pub preserve_locals: Vec<String>,
    pub preserve_globals: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameStats {
    pub considered: usize,
    pub renamed: usize,
}

fn has_star_import(tree: &SyntaxTree) -> bool {
    let Some(body) = tree.body(tree.module()) else {
        return false;
    };
    body.iter().any(|&stmt| match tree.kind(stmt) {
        NodeKind::ImportFrom { names, .. } => names
            .iter()
            .any(|&alias| matches!(tree.kind(alias), NodeKind::Alias { name, .. } if name == "*")),
        _ => false,
    })
}

fn is_renameable(tree: &SyntaxTree, at: BindingRef, options: &RenameOptions, star: bool) -> bool {
    let binding = &tree.scope(at.scope).bindings[at.index];
    if !binding.allow_rename {
        return false;
    }
    let module_level = is_module_scope(tree, at.scope);
    if module_level && star {
        return false;
    }
    match binding.kind {
        BindingKind::HoistedLiteral(_) | BindingKind::ImplicitBuiltin => true,
        BindingKind::Declared if module_level => {
            options.rename_globals && !options.preserve_globals.contains(&binding.name)
        }
        BindingKind::Declared => {
            options.rename_locals && !options.preserve_locals.contains(&binding.name)
        }
    }
}

/// Name a parameter keeps in its signature when it is renamed through an alias.
fn kept_name(tree: &SyntaxTree, at: BindingRef) -> Option<String> {
    let binding = &tree.scope(at.scope).bindings[at.index];
    if binding.reserved.is_some() {
        return binding.reserved.clone();
    }
    binding
        .references
        .iter()
        .any(|&site| site_kind(tree, site) == SiteKind::KeywordParameter)
        .then(|| binding.name.clone())
}

/// Processing order: most referenced first, then by pre-order position of the owning
/// scope, then by position inside that scope.
pub fn rename_order(tree: &SyntaxTree) -> Vec<BindingRef> {
    let rank = preorder_rank(tree);
    let mut order = all_bindings(tree);
    order.sort_by_key(|at| {
        let references = tree.scope(at.scope).bindings[at.index].references.len();
        (Reverse(references), rank[at.scope.index()], at.index)
    });
    order
}

pub fn rename_bindings(tree: &mut SyntaxTree, options: &RenameOptions) -> RenameStats {
    let module = tree.module();
    let mut stats = RenameStats::default();
    if tree.scope(module).tainted {
        debug!("module uses dynamic name access, renaming skipped");
        return stats;
    }

    let star = has_star_import(tree);
    let order = rename_order(tree);
    let renameable: Vec<bool> = order
        .iter()
        .map(|&at| is_renameable(tree, at, options, star))
        .collect();

    // Names that will survive are claimed before any new name is handed out.
    for (&at, &can_rename) in order.iter().zip(&renameable) {
        let scopes = reservation_scope(tree, at);
        if !can_rename {
            let name = tree.scope(at.scope).bindings[at.index].name.clone();
            if !name.is_empty() {
                claim(tree, &scopes, &name);
            }
        }
        if let Some(kept) = kept_name(tree, at) {
            claim(tree, &scopes, &kept);
        }
    }

    for (&at, &can_rename) in order.iter().zip(&renameable) {
        if !can_rename {
            continue;
        }
        stats.considered += 1;
        let scopes = reservation_scope(tree, at);
        let prefix = if is_module_scope(tree, at.scope) && !options.rename_globals {
            "_"
        } else {
            ""
        };
        let candidate = match NameGenerator::new(prefix).find(|name| is_free(tree, &scopes, name)) {
            Some(candidate) => candidate,
            None => unreachable!("name generator is infinite"),
        };

        let current = &tree.scope(at.scope).bindings[at.index];
        let hoisted = matches!(current.kind, BindingKind::HoistedLiteral(_));
        let old_name = current.name.clone();
        let keeps_signature = kept_name(tree, at).as_deref() == Some(old_name.as_str());
        let collides = !hoisted && !keeps_signature && !is_free(tree, &scopes, &old_name);

        if collides || current.should_rename(tree, &candidate) {
            trace!(from = %old_name, to = %candidate, forced = collides, "rename accepted");
            binding::rename(tree, at, &candidate);
            claim(tree, &scopes, &candidate);
            stats.renamed += 1;
        } else if !hoisted {
            claim(tree, &scopes, &old_name);
        }
    }

    debug!(
        considered = stats.considered,
        renamed = stats.renamed,
        "renaming complete"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_starts_with_single_letters() {
        let names: Vec<String> = NameGenerator::new("").take(3).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_generator_moves_to_two_characters_after_alphabet() {
        let names: Vec<String> = NameGenerator::new("").take(54).collect();
        assert_eq!(names[51], "Z");
        assert_eq!(names[52], "aa");
        assert_eq!(names[53], "ab");
    }

    #[test]
    fn test_generator_skips_keywords_and_builtins() {
        let names: Vec<String> = NameGenerator::new("").take(4000).collect();
        assert!(!names.contains(&"if".to_string()));
        assert!(!names.contains(&"id".to_string()));
        assert!(!names.contains(&"or".to_string()));
        assert!(names.contains(&"ie".to_string()));
    }

    #[test]
    fn test_generator_prefix() {
        let names: Vec<String> = NameGenerator::new("_").take(2).collect();
        assert_eq!(names, vec!["_a", "_b"]);
    }
}
