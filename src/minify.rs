//! Minification pipeline
//!
//! Runs the enabled passes in a fixed order, prints the result and proves it by parsing
//! the printed text again and comparing it with the transformed tree. Text that fails
//! the comparison is never returned.

use tracing::{debug, debug_span, warn};

use crate::bind::annotate;
use crate::codegen::unparse;
use crate::error::{MinifyError, StabilityCause, StabilityError};
use crate::fold::fold_constants;
use crate::hoist::hoist_literals;
use crate::options::{MinifyOptions, TargetVersions};
use crate::parse::{Frontend, PythonFrontend};
use crate::renamer::rename_bindings;
use crate::transform;
use crate::tree::{Literal, NodeId, NodeKind, SyntaxTree};
use crate::validate::compare_trees;

/// String entries of a literal list or tuple assigned to `__all__` at module level.
pub fn exported_names(tree: &SyntaxTree) -> Vec<String> {
    let Some(body) = tree.body(tree.module()) else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for &stmt in body {
        let value = match tree.kind(stmt) {
            NodeKind::Assign { targets, value } if targets.iter().any(|&t| is_all(tree, t)) => *value,
            NodeKind::AugAssign { target, value, .. } if is_all(tree, *target) => *value,
            NodeKind::AnnAssign {
                target,
                value: Some(value),
                ..
            } if is_all(tree, *target) => *value,
            _ => continue,
        };
        if let NodeKind::List { elts, .. } | NodeKind::Tuple { elts, .. } = tree.kind(value) {
            for &elt in elts {
                if let NodeKind::Constant {
                    value: Literal::Str(name),
                } = tree.kind(elt)
                {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
        }
    }
    names
}

fn is_all(tree: &SyntaxTree, id: NodeId) -> bool {
    matches!(tree.kind(id), NodeKind::Name { id, .. } if id == "__all__")
}

fn shebang(tree: &SyntaxTree) -> Option<&str> {
    let source = tree.source()?;
    if !source.starts_with("#!") {
        return None;
    }
    source.lines().next()
}

/// Apply every enabled pass to an annotated tree.
fn transform_tree(tree: &mut SyntaxTree, options: &MinifyOptions, frontend: &dyn Frontend) {
    let exported = exported_names(tree);

    annotate(tree);
    transform::remove_literal_statements(tree, &options.remove_literal_statements);
    transform::remove_annotations(tree, &options.remove_annotations);
    if options.remove_pass {
        transform::remove_pass(tree);
    }
    if options.remove_object_base {
        transform::remove_object_base(tree);
    }
    if options.remove_asserts {
        transform::remove_asserts(tree);
    }
    if options.remove_debug {
        transform::remove_debug(tree);
    }
    if options.remove_version_guards {
        transform::remove_version_guards(tree, &options.target_versions);
    }
    if options.remove_explicit_return_none {
        transform::remove_explicit_return_none(tree);
    }
    if options.remove_builtin_exception_brackets {
        transform::remove_builtin_exception_brackets(tree);
    }
    if options.combine_imports {
        transform::combine_imports(tree);
    }

    annotate(tree);
    if options.constant_folding {
        fold_constants(tree, frontend, options.target_versions);
        annotate(tree);
    }

    if options.hoist_literals {
        hoist_literals(tree);
    }
    if options.rename_locals || options.rename_globals || options.hoist_literals {
        rename_bindings(tree, &options.rename_options(&exported));
    }
    if options.convert_posargs_to_args {
        transform::convert_posargs_to_args(tree);
    }
}

/// Print `tree` and check that the text parses back to the same tree.
pub fn stable_unparse(
    tree: &SyntaxTree,
    frontend: &dyn Frontend,
    targets: TargetVersions,
) -> Result<String, StabilityError> {
    let minified = unparse(tree, frontend, targets);
    let failure = |cause: StabilityCause, minified: String| StabilityError {
        input: tree.source().unwrap_or_default().to_string(),
        minified,
        cause,
    };

    let reparsed = match frontend.parse_module(&minified, "<minified>") {
        Ok(reparsed) => reparsed,
        Err(err) => {
            warn!(%err, "minified output does not parse");
            return Err(failure(StabilityCause::Reparse(err), minified));
        }
    };
    if let Err(err) = compare_trees(tree, &reparsed) {
        warn!(%err, "minified output parses to a different tree");
        return Err(failure(StabilityCause::Mismatch(err), minified));
    }
    Ok(minified)
}

/// Minify a parsed module.
pub fn minify(
    mut tree: SyntaxTree,
    options: &MinifyOptions,
    frontend: &dyn Frontend,
) -> Result<String, StabilityError> {
    let _span = debug_span!("minify", nodes = tree.len()).entered();
    transform_tree(&mut tree, options, frontend);
    let mut minified = stable_unparse(&tree, frontend, options.target_versions)?;

    if options.preserve_shebang {
        if let Some(line) = shebang(&tree) {
            minified = format!("{}\n{}", line, minified);
        }
    }
    debug!(
        input = tree.source().map(str::len).unwrap_or(0),
        output = minified.len(),
        "minified"
    );
    Ok(minified)
}

/// Parse and minify source text with the built-in front-end.
pub fn minify_source(source: &str, filename: &str, options: &MinifyOptions) -> Result<String, MinifyError> {
    let frontend = PythonFrontend;
    let tree = frontend.parse_module(source, filename)?;
    Ok(minify(tree, options, &frontend)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exported(source: &str) -> Vec<String> {
        exported_names(&PythonFrontend.parse_module(source, "test.py").unwrap())
    }

    #[test]
    fn test_exported_names_from_list_and_tuple() {
        assert_eq!(exported("__all__ = ['a', 'b']\n"), vec!["a", "b"]);
        assert_eq!(exported("__all__ = ('a',)\n__all__ += ['c']\n"), vec!["a", "c"]);
    }

    #[test]
    fn test_exported_names_ignore_computed_entries() {
        assert_eq!(exported("__all__ = ['a', name]\n"), vec!["a"]);
        assert!(exported("__all__ = names()\n").is_empty());
    }

    #[test]
    fn test_shebang_kept() {
        let out = minify_source("#!/usr/bin/env python\nx = 1\n", "t.py", &MinifyOptions::default())
            .unwrap();
        assert_eq!(out, "#!/usr/bin/env python\nx=1");
    }

    #[test]
    fn test_shebang_dropped_when_disabled() {
        let options = MinifyOptions {
            preserve_shebang: false,
            ..MinifyOptions::default()
        };
        let out = minify_source("#!/usr/bin/env python\nx = 1\n", "t.py", &options).unwrap();
        assert_eq!(out, "x=1");
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let err = minify_source("def (:\n", "bad.py", &MinifyOptions::default()).unwrap_err();
        assert!(matches!(err, MinifyError::Parse(_)));
    }
}
