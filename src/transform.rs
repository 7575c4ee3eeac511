//! Size-reducing tree rewrites
//!
//! Each pass edits the tree in place and returns how many edits it made. The passes run
//! on an annotated tree and leave parent links stale for the nodes they create, so the
//! caller re-annotates before anything that reads scopes.

use std::collections::HashSet;

use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use tracing::debug;

use crate::bind::is_builtin_reference;
use crate::options::{RemoveAnnotationsOptions, RemoveLiteralStatementsOptions, TargetVersions};
use crate::scope::BUILTIN_EXCEPTIONS;
use crate::tree::{CmpOperator, Literal, NodeId, NodeKind, SyntaxTree};
use crate::visitor::preorder;

lazy_static! {
    /// Class decorators and bases whose annotations define fields.
    static ref FIELD_DECLARING: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("dataclass");
        s.insert("NamedTuple");
        s.insert("TypedDict");
        s
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUITE EDITING
// ═══════════════════════════════════════════════════════════════════════════════

/// Statement lists of a node, each flagged with whether it must stay non-empty.
fn suites_mut(kind: &mut NodeKind) -> Vec<(&mut Vec<NodeId>, bool)> {
    match kind {
        NodeKind::Module { body } => vec![(body, false)],
        NodeKind::FunctionDef { body, .. }
        | NodeKind::ClassDef { body, .. }
        | NodeKind::With { body, .. }
        | NodeKind::ExceptHandler { body, .. }
        | NodeKind::MatchCase { body, .. } => vec![(body, true)],
        NodeKind::For { body, orelse, .. }
        | NodeKind::While { body, orelse, .. }
        | NodeKind::If { body, orelse, .. } => vec![(body, true), (orelse, false)],
        NodeKind::Try {
            body,
            orelse,
            finalbody,
            ..
        } => vec![(body, true), (orelse, false), (finalbody, true)],
        _ => Vec::new(),
    }
}

/// `0`, the shortest statement that does nothing.
fn placeholder(tree: &mut SyntaxTree) -> NodeId {
    let zero = tree.constant(Literal::Int(BigInt::zero()));
    tree.add(NodeKind::Expr { value: zero })
}

/// Run `edit` over every statement list of the tree, outermost first. `edit` gets the
/// owning node and the index of the list within it. A required list left empty gets a
/// placeholder statement.
fn edit_suites(
    tree: &mut SyntaxTree,
    mut edit: impl FnMut(&mut SyntaxTree, NodeId, usize, Vec<NodeId>) -> Vec<NodeId>,
) {
    for owner in preorder(tree, tree.root()) {
        let taken: Vec<(Vec<NodeId>, bool)> = suites_mut(tree.kind_mut(owner))
            .into_iter()
            .map(|(suite, required)| (std::mem::take(suite), required))
            .collect();
        if taken.is_empty() {
            continue;
        }

        let mut edited = Vec::with_capacity(taken.len());
        for (index, (suite, required)) in taken.into_iter().enumerate() {
            let was_empty = suite.is_empty();
            let mut suite = edit(tree, owner, index, suite);
            if suite.is_empty() && required && !was_empty {
                suite.push(placeholder(tree));
            }
            edited.push(suite);
        }

        for ((slot, _), suite) in suites_mut(tree.kind_mut(owner)).into_iter().zip(edited) {
            *slot = suite;
        }
    }
}

/// Drop every statement `remove` matches. Returns the number dropped.
fn remove_statements(tree: &mut SyntaxTree, remove: impl Fn(&SyntaxTree, NodeId) -> bool) -> usize {
    let mut removed = 0;
    edit_suites(tree, |tree, _, _, suite| {
        let before = suite.len();
        let kept: Vec<NodeId> = suite.into_iter().filter(|&s| !remove(tree, s)).collect();
        removed += before - kept.len();
        kept
    });
    removed
}

// ═══════════════════════════════════════════════════════════════════════════════
// LITERAL STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

fn mentions_doc(tree: &SyntaxTree) -> bool {
    preorder(tree, tree.root()).into_iter().any(|id| match tree.kind(id) {
        NodeKind::Name { id, .. } => id == "__doc__",
        NodeKind::Attribute { attr, .. } => attr == "__doc__",
        _ => false,
    })
}

fn is_literal_statement(tree: &SyntaxTree, stmt: NodeId) -> bool {
    match tree.kind(stmt) {
        NodeKind::Expr { value } => matches!(tree.kind(*value), NodeKind::Constant { .. }),
        _ => false,
    }
}

pub fn remove_literal_statements(
    tree: &mut SyntaxTree,
    options: &RemoveLiteralStatementsOptions,
) -> usize {
    if !options.any() {
        return 0;
    }
    let keep_docstrings = mentions_doc(tree);
    let mut removed = 0;
    edit_suites(tree, |tree, owner, index, suite| {
        let before = suite.len();
        let kept: Vec<NodeId> = suite
            .iter()
            .enumerate()
            .filter(|&(position, &stmt)| {
                if !is_literal_statement(tree, stmt) {
                    return true;
                }
                let docstring = index == 0 && position == 0 && tree.is_docstring_statement(stmt);
                let remove = match tree.kind(owner) {
                    NodeKind::Module { .. } if docstring => options.remove_module_docstring,
                    NodeKind::FunctionDef { .. } if docstring => options.remove_function_docstrings,
                    NodeKind::ClassDef { .. } if docstring => options.remove_class_docstrings,
                    _ => options.remove_other_literals,
                };
                !remove || (docstring && keep_docstrings)
            })
            .map(|(_, &stmt)| stmt)
            .collect();
        removed += before - kept.len();
        kept
    });
    debug!(removed, "literal statements removed");
    removed
}

// ═══════════════════════════════════════════════════════════════════════════════
// ANNOTATIONS
// ═══════════════════════════════════════════════════════════════════════════════

fn trailing_name(tree: &SyntaxTree, id: NodeId) -> Option<&str> {
    match tree.kind(id) {
        NodeKind::Name { id, .. } => Some(id),
        NodeKind::Attribute { attr, .. } => Some(attr),
        NodeKind::Call { func, .. } => trailing_name(tree, *func),
        _ => None,
    }
}

/// Dataclass-like classes, where annotations declare the fields.
fn declares_fields(tree: &SyntaxTree, class: NodeId) -> bool {
    let NodeKind::ClassDef {
        bases, decorators, ..
    } = tree.kind(class)
    else {
        return false;
    };
    decorators
        .iter()
        .chain(bases.iter())
        .filter_map(|&id| trailing_name(tree, id))
        .any(|name| FIELD_DECLARING.contains(name))
}

pub fn remove_annotations(tree: &mut SyntaxTree, options: &RemoveAnnotationsOptions) -> usize {
    if !options.any() {
        return 0;
    }
    let mut removed = 0;
    for id in preorder(tree, tree.root()) {
        match tree.kind(id) {
            NodeKind::FunctionDef {
                returns: Some(_), ..
            } if options.remove_return_annotations => {
                if let NodeKind::FunctionDef { returns, .. } = tree.kind_mut(id) {
                    *returns = None;
                    removed += 1;
                }
            }
            NodeKind::Arg {
                annotation: Some(_),
                ..
            } if options.remove_argument_annotations => {
                if let NodeKind::Arg { annotation, .. } = tree.kind_mut(id) {
                    *annotation = None;
                    removed += 1;
                }
            }
            NodeKind::AnnAssign { target, value, .. } => {
                let (target, value) = (*target, *value);
                let class = tree
                    .namespace(id)
                    .filter(|&ns| matches!(tree.kind(ns), NodeKind::ClassDef { .. }));
                let allowed = match class {
                    Some(class) => {
                        options.remove_class_attribute_annotations && !declares_fields(tree, class)
                    }
                    None => options.remove_variable_annotations,
                };
                if !allowed {
                    continue;
                }
                match value {
                    Some(value) => tree.replace_kind(
                        id,
                        NodeKind::Assign {
                            targets: vec![target],
                            value,
                        },
                    ),
                    None => {
                        // the target must stay declared, so only the annotation shrinks
                        let zero = tree.constant(Literal::Int(BigInt::zero()));
                        if let NodeKind::AnnAssign { annotation, .. } = tree.kind_mut(id) {
                            *annotation = zero;
                        }
                    }
                }
                removed += 1;
            }
            _ => {}
        }
    }
    debug!(removed, "annotations removed");
    removed
}

// ═══════════════════════════════════════════════════════════════════════════════
// NO-OP STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn remove_pass(tree: &mut SyntaxTree) -> usize {
    let removed = remove_statements(tree, |tree, stmt| matches!(tree.kind(stmt), NodeKind::Pass));
    debug!(removed, "pass statements removed");
    removed
}

pub fn remove_asserts(tree: &mut SyntaxTree) -> usize {
    let removed =
        remove_statements(tree, |tree, stmt| matches!(tree.kind(stmt), NodeKind::Assert { .. }));
    debug!(removed, "asserts removed");
    removed
}

/// Replace each `if` whose outcome `decide` knows with the branch that runs.
fn inline_decided_ifs(tree: &mut SyntaxTree, decide: impl Fn(&SyntaxTree, NodeId) -> Option<bool>) -> usize {
    let mut inlined = 0;
    edit_suites(tree, |tree, _, _, suite| {
        let mut out = Vec::with_capacity(suite.len());
        for stmt in suite {
            let NodeKind::If { test, body, orelse } = tree.kind(stmt) else {
                out.push(stmt);
                continue;
            };
            match decide(tree, *test) {
                Some(true) => out.extend(body.iter().copied()),
                Some(false) => out.extend(orelse.iter().copied()),
                None => {
                    out.push(stmt);
                    continue;
                }
            }
            inlined += 1;
        }
        out
    });
    inlined
}

pub fn remove_debug(tree: &mut SyntaxTree) -> usize {
    // compiled with -O the guarded body never runs
    let removed = inline_decided_ifs(tree, |tree, test| match tree.kind(test) {
        NodeKind::Name { id, .. } if id == "__debug__" => Some(false),
        _ => None,
    });
    debug!(removed, "debug guards removed");
    removed
}

// ───────────────────────────────────────────────────────────────────────────────
// Version guards
// ───────────────────────────────────────────────────────────────────────────────

fn target_range(versions: &TargetVersions) -> Vec<(u8, u8)> {
    let (min, max) = (versions.minimum, versions.maximum);
    let mut out = Vec::new();
    for major in min.0..=max.0 {
        let low = if major == min.0 { min.1 } else { 0 };
        let high = if major == max.0 { max.1 } else { 99 };
        for minor in low..=high {
            out.push((major, minor));
        }
    }
    out
}

fn is_version_info(tree: &SyntaxTree, id: NodeId) -> bool {
    match tree.kind(id) {
        NodeKind::Attribute { value, attr, .. } if attr == "version_info" => {
            matches!(tree.kind(*value), NodeKind::Name { id, .. } if id == "sys")
        }
        _ => false,
    }
}

fn int_tuple(tree: &SyntaxTree, id: NodeId) -> Option<Vec<i64>> {
    let NodeKind::Tuple { elts, .. } = tree.kind(id) else {
        return None;
    };
    elts.iter()
        .map(|&elt| match tree.kind(elt) {
            NodeKind::Constant {
                value: Literal::Int(i),
            } => i.to_i64(),
            _ => None,
        })
        .collect()
}

/// `sys.version_info <op> literal` on one interpreter version. `None` when the micro
/// version would decide it.
fn compare_version(op: CmpOperator, version: (u8, u8), literal: &[i64]) -> Option<bool> {
    use std::cmp::Ordering;

    let known = [i64::from(version.0), i64::from(version.1)];
    let mut ordering = Ordering::Equal;
    for (a, b) in known.iter().zip(literal.iter()) {
        ordering = a.cmp(b);
        if ordering != Ordering::Equal {
            break;
        }
    }
    if ordering == Ordering::Equal {
        if literal.len() > known.len() {
            return None;
        }
        // version_info has more fields than the literal
        ordering = Ordering::Greater;
    }
    let result = match op {
        CmpOperator::Lt => ordering == Ordering::Less,
        CmpOperator::LtE => ordering != Ordering::Greater,
        CmpOperator::Gt => ordering == Ordering::Greater,
        CmpOperator::GtE => ordering != Ordering::Less,
        CmpOperator::Eq => ordering == Ordering::Equal,
        CmpOperator::NotEq => ordering != Ordering::Equal,
        _ => return None,
    };
    Some(result)
}

fn version_guard_outcome(tree: &SyntaxTree, test: NodeId, versions: &[(u8, u8)]) -> Option<bool> {
    let NodeKind::Compare {
        left,
        ops,
        comparators,
    } = tree.kind(test)
    else {
        return None;
    };
    if ops.len() != 1 || !is_version_info(tree, *left) {
        return None;
    }
    let literal = int_tuple(tree, comparators[0])?;
    let mut outcome = None;
    for &version in versions {
        let result = compare_version(ops[0], version, &literal)?;
        match outcome {
            None => outcome = Some(result),
            Some(previous) if previous != result => return None,
            Some(_) => {}
        }
    }
    outcome
}

pub fn remove_version_guards(tree: &mut SyntaxTree, targets: &TargetVersions) -> usize {
    let versions = target_range(targets);
    let removed = inline_decided_ifs(tree, |tree, test| version_guard_outcome(tree, test, &versions));
    debug!(removed, "version guards resolved");
    removed
}

// ═══════════════════════════════════════════════════════════════════════════════
// SMALLER SPELLINGS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn remove_object_base(tree: &mut SyntaxTree) -> usize {
    let mut removed = 0;
    for id in preorder(tree, tree.root()) {
        let NodeKind::ClassDef { bases, .. } = tree.kind(id) else {
            continue;
        };
        let [base] = bases.as_slice() else {
            continue;
        };
        let is_object = matches!(tree.kind(*base), NodeKind::Name { id, .. } if id == "object")
            && is_builtin_reference(tree, *base);
        if is_object {
            if let NodeKind::ClassDef { bases, .. } = tree.kind_mut(id) {
                bases.clear();
                removed += 1;
            }
        }
    }
    debug!(removed, "object bases removed");
    removed
}

/// `return None` becomes `return`, and a bare `return` that ends a function goes.
pub fn remove_explicit_return_none(tree: &mut SyntaxTree) -> usize {
    let mut removed = 0;
    for id in preorder(tree, tree.root()) {
        let NodeKind::Return { value: Some(value) } = tree.kind(id) else {
            continue;
        };
        if matches!(tree.kind(*value), NodeKind::Constant { value: Literal::None }) {
            tree.replace_kind(id, NodeKind::Return { value: None });
            removed += 1;
        }
    }
    edit_suites(tree, |tree, owner, index, mut suite| {
        if index == 0 && matches!(tree.kind(owner), NodeKind::FunctionDef { .. }) {
            if let Some(&last) = suite.last() {
                if matches!(tree.kind(last), NodeKind::Return { value: None }) {
                    suite.pop();
                    removed += 1;
                }
            }
        }
        suite
    });
    debug!(removed, "explicit returns simplified");
    removed
}

/// `raise ValueError()` becomes `raise ValueError` for builtin exception classes.
pub fn remove_builtin_exception_brackets(tree: &mut SyntaxTree) -> usize {
    if tree.scope(tree.module()).tainted {
        return 0;
    }
    let mut removed = 0;
    for id in preorder(tree, tree.root()) {
        let NodeKind::Raise {
            exc: Some(exc),
            cause,
        } = tree.kind(id)
        else {
            continue;
        };
        let NodeKind::Call {
            func,
            args,
            keywords,
        } = tree.kind(*exc)
        else {
            continue;
        };
        if !args.is_empty() || !keywords.is_empty() {
            continue;
        }
        let is_exception = matches!(tree.kind(*func), NodeKind::Name { id, .. } if BUILTIN_EXCEPTIONS.contains(id.as_str()))
            && is_builtin_reference(tree, *func);
        if is_exception {
            let kind = NodeKind::Raise {
                exc: Some(*func),
                cause: *cause,
            };
            tree.replace_kind(id, kind);
            removed += 1;
        }
    }
    debug!(removed, "exception call brackets removed");
    removed
}

// ═══════════════════════════════════════════════════════════════════════════════
// IMPORTS
// ═══════════════════════════════════════════════════════════════════════════════

fn is_star_import(tree: &SyntaxTree, names: &[NodeId]) -> bool {
    names
        .iter()
        .any(|&alias| matches!(tree.kind(alias), NodeKind::Alias { name, .. } if name == "*"))
}

/// Whether `next` can be appended to the import statement `previous`.
fn mergeable(tree: &SyntaxTree, previous: NodeId, next: NodeId) -> bool {
    match (tree.kind(previous), tree.kind(next)) {
        (NodeKind::Import { .. }, NodeKind::Import { .. }) => true,
        (
            NodeKind::ImportFrom {
                module: m1,
                names: n1,
                level: l1,
            },
            NodeKind::ImportFrom {
                module: m2,
                names: n2,
                level: l2,
            },
        ) => m1 == m2 && l1 == l2 && !is_star_import(tree, n1) && !is_star_import(tree, n2),
        _ => false,
    }
}

pub fn combine_imports(tree: &mut SyntaxTree) -> usize {
    let mut merged = 0;
    edit_suites(tree, |tree, _, _, suite| {
        let mut out: Vec<NodeId> = Vec::with_capacity(suite.len());
        for stmt in suite {
            let previous = match out.last() {
                Some(&previous) if mergeable(tree, previous, stmt) => previous,
                _ => {
                    out.push(stmt);
                    continue;
                }
            };
            let extra = match tree.kind(stmt) {
                NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } => names.clone(),
                _ => Vec::new(),
            };
            if let NodeKind::Import { names } | NodeKind::ImportFrom { names, .. } =
                tree.kind_mut(previous)
            {
                names.extend(extra);
            }
            merged += 1;
        }
        out
    });
    debug!(merged, "imports combined");
    merged
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARAMETERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Positional-only parameters become ordinary ones. Signatures with a `**` collector are
/// left alone, since a keyword matching the old name would no longer land in it.
pub fn convert_posargs_to_args(tree: &mut SyntaxTree) -> usize {
    let mut converted = 0;
    for id in preorder(tree, tree.root()) {
        if let NodeKind::Arguments {
            posonlyargs,
            args,
            kwarg: None,
            ..
        } = tree.kind_mut(id)
        {
            if posonlyargs.is_empty() {
                continue;
            }
            let mut merged = std::mem::take(posonlyargs);
            merged.append(args);
            *args = merged;
            converted += 1;
        }
    }
    debug!(converted, "positional-only markers removed");
    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_version_prefix() {
        assert_eq!(compare_version(CmpOperator::GtE, (3, 8), &[3]), Some(true));
        assert_eq!(compare_version(CmpOperator::Lt, (3, 8), &[3, 9]), Some(true));
        assert_eq!(compare_version(CmpOperator::GtE, (3, 8), &[3, 8]), Some(true));
        assert_eq!(compare_version(CmpOperator::Lt, (3, 8), &[3, 8]), Some(false));
        assert_eq!(compare_version(CmpOperator::Lt, (3, 8), &[3, 8, 2]), None);
        assert_eq!(compare_version(CmpOperator::Lt, (3, 7), &[3, 8, 2]), Some(true));
    }

    #[test]
    fn test_target_range_spans_minors() {
        let range = target_range(&TargetVersions {
            minimum: (3, 6),
            maximum: (3, 8),
        });
        assert_eq!(range, vec![(3, 6), (3, 7), (3, 8)]);
    }
}
