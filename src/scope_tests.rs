//! Scope Analysis Tests
//!
//! Namespace assignment and binding resolution for the places where Python's scoping is
//! not simply lexical.

#[cfg(test)]
mod tests {
    use crate::bind::annotate;
    use crate::binding::{Binding, BindingKind};
    use crate::parse::{Frontend, PythonFrontend};
    use crate::scope::find_binding;
    use crate::tree::{NodeId, NodeKind, SyntaxTree};
    use crate::visitor::preorder;

    fn annotated(source: &str) -> SyntaxTree {
        let mut tree = PythonFrontend.parse_module(source, "test.py").unwrap();
        annotate(&mut tree);
        tree
    }

    fn find_def(tree: &SyntaxTree, wanted: &str) -> NodeId {
        preorder(tree, tree.root())
            .into_iter()
            .find(|&id| matches!(tree.kind(id), NodeKind::FunctionDef { name, .. } if name == wanted))
            .unwrap()
    }

    fn find_name(tree: &SyntaxTree, wanted: &str) -> NodeId {
        preorder(tree, tree.root())
            .into_iter()
            .find(|&id| matches!(tree.kind(id), NodeKind::Name { id, .. } if id == wanted))
            .unwrap()
    }

    fn binding<'a>(tree: &'a SyntaxTree, scope: NodeId, name: &str) -> Option<&'a Binding> {
        find_binding(tree, scope, name).map(|at| &tree.scope(at.scope).bindings[at.index])
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // COMPREHENSIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_first_iterable_evaluated_outside() {
        let tree = annotated("def f(items, more):\n    return [y for y in items for z in more]\n");
        let f = find_def(&tree, "f");
        let items = find_name(&tree, "items");
        assert_eq!(tree.namespace(items), Some(f));

        let more = find_name(&tree, "more");
        let comprehension = tree.namespace(more).unwrap();
        assert!(matches!(tree.kind(comprehension), NodeKind::ListComp { .. }));
    }

    #[test]
    fn test_walrus_target_binds_in_enclosing_function() {
        let tree = annotated("def f(data):\n    return [(last := x) for x in data]\n");
        let f = find_def(&tree, "f");
        assert!(binding(&tree, f, "last").is_some());

        let x = find_name(&tree, "x");
        let comprehension = tree.namespace(x).unwrap();
        assert!(binding(&tree, comprehension, "last").is_none());
        assert!(binding(&tree, comprehension, "x").is_some());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CLASS BODIES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_class_names_invisible_to_methods() {
        let tree = annotated("class A:\n    y = 1\n    def m(self):\n        return y\n");
        let module = tree.module();
        let outer = binding(&tree, module, "y").unwrap();
        assert!(!outer.allow_rename);
        assert_eq!(outer.references.len(), 1);

        let class = tree.namespace(find_def(&tree, "m")).unwrap();
        let attribute = binding(&tree, class, "y").unwrap();
        assert!(!attribute.allow_rename);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // REDIRECTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_global_statement_redirects_to_module() {
        let tree = annotated("x = 0\ndef f():\n    global x\n    x = 1\n");
        let f = find_def(&tree, "f");
        assert!(binding(&tree, f, "x").is_none());
        assert_eq!(binding(&tree, tree.module(), "x").unwrap().references.len(), 3);
    }

    #[test]
    fn test_nonlocal_statement_redirects_to_enclosing_function() {
        let tree = annotated(
            "def outer():\n    n = 0\n    def inner():\n        nonlocal n\n        n += 1\n",
        );
        let outer = find_def(&tree, "outer");
        let inner = find_def(&tree, "inner");
        assert!(binding(&tree, inner, "n").is_none());
        assert_eq!(binding(&tree, outer, "n").unwrap().references.len(), 3);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PARAMETERS AND SPECIAL NAMES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_keyword_parameter_reserves_its_name() {
        let tree = annotated("def f(width, /, *rest, size):\n    pass\n");
        let f = find_def(&tree, "f");
        assert_eq!(binding(&tree, f, "width").unwrap().reserved, None);
        assert_eq!(binding(&tree, f, "rest").unwrap().reserved, None);
        assert_eq!(
            binding(&tree, f, "size").unwrap().reserved.as_deref(),
            Some("size")
        );
    }

    #[test]
    fn test_lambda_keyword_parameter_fixed() {
        let tree = annotated("g = lambda value: value\n");
        let value = find_name(&tree, "value");
        let lambda = tree.namespace(value).unwrap();
        assert!(!binding(&tree, lambda, "value").unwrap().allow_rename);
    }

    #[test]
    fn test_builtins_and_future_imports() {
        let tree = annotated("from __future__ import annotations\nprint(len(x))\n");
        let module = tree.module();
        assert!(!binding(&tree, module, "annotations").unwrap().allow_rename);
        let print = binding(&tree, module, "print").unwrap();
        assert_eq!(print.kind, BindingKind::ImplicitBuiltin);
        assert!(print.allow_rename);
        // undefined names stay as written
        assert!(!binding(&tree, module, "x").unwrap().allow_rename);
    }

    #[test]
    fn test_dynamic_access_taints_module() {
        let tree = annotated("def f():\n    return locals()\n");
        assert!(tree.scope(tree.module()).tainted);
        let clean = annotated("def f():\n    return 1\n");
        assert!(!clean.scope(clean.module()).tainted);
    }

    #[test]
    fn test_reannotation_discards_previous_bindings() {
        let mut tree = annotated("x = 1\nx = 2\n");
        annotate(&mut tree);
        assert_eq!(binding(&tree, tree.module(), "x").unwrap().references.len(), 2);
    }
}
