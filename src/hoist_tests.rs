//! Literal Hoisting Tests

#[cfg(test)]
mod tests {
    use crate::bind::annotate;
    use crate::binding::BindingKind;
    use crate::hoist::hoist_literals;
    use crate::minify::minify_source;
    use crate::options::MinifyOptions;
    use crate::parse::{Frontend, PythonFrontend};
    use crate::tree::{NodeKind, SyntaxTree};
    use crate::visitor::preorder;

    fn minify(source: &str) -> String {
        minify_source(source, "test.py", &MinifyOptions::default()).unwrap()
    }

    fn annotated(source: &str) -> SyntaxTree {
        let mut tree = PythonFrontend.parse_module(source, "test.py").unwrap();
        annotate(&mut tree);
        tree
    }

    fn hoisted_in(tree: &SyntaxTree, scope: crate::tree::NodeId) -> usize {
        tree.scope(scope)
            .bindings
            .iter()
            .filter(|b| matches!(b.kind, BindingKind::HoistedLiteral(_)))
            .count()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // GROUPING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_groups_by_value_and_type() {
        let mut tree = annotated("a = 1\nb = 1\nc = 1.0\nd = 1.0\ne = True\n");
        assert_eq!(hoist_literals(&mut tree), 2);
    }

    #[test]
    fn test_docstrings_are_not_occurrences() {
        let mut tree = annotated("'doc'\nx = 'doc'\n");
        assert_eq!(hoist_literals(&mut tree), 0);
    }

    #[test]
    fn test_placed_in_deepest_common_function() {
        let mut tree = annotated(
            "def f():\n    x = 'abc'\n    def g():\n        return 'abc'\n    return x\n",
        );
        assert_eq!(hoist_literals(&mut tree), 1);
        let f = preorder(&tree, tree.root())
            .into_iter()
            .find(|&id| matches!(tree.kind(id), NodeKind::FunctionDef { name, .. } if name == "f"))
            .unwrap();
        assert_eq!(hoisted_in(&tree, f), 1);
        assert_eq!(hoisted_in(&tree, tree.root()), 0);
    }

    #[test]
    fn test_value_patterns_are_not_occurrences() {
        let mut tree = annotated("match x:\n    case 'abc':\n        pass\ny = 'abc'\n");
        assert_eq!(hoist_literals(&mut tree), 0);
    }

    #[test]
    fn test_tainted_module_not_hoisted() {
        let mut tree = annotated("x = 'abc'\ny = 'abc'\nexec('')\n");
        assert_eq!(hoist_literals(&mut tree), 0);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // END TO END
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_two_short_occurrences_not_worth_it() {
        assert_eq!(minify("a = 'hello'\nb = 'hello'\n"), "a='hello';b='hello'");
    }

    #[test]
    fn test_repeated_literal_becomes_one_binding() {
        assert_eq!(
            minify("a = 'hello'\nb = 'hello'\nc = 'hello'\nd = 'hello'\n"),
            "_a='hello';a=_a;b=_a;c=_a;d=_a"
        );
    }

    #[test]
    fn test_hoisted_inside_function() {
        assert_eq!(
            minify("def f():\n    x = 'hello world'\n    y = 'hello world'\n    return x, y\n"),
            "def f():a='hello world';x=a;y=a;return x,y"
        );
    }

    #[test]
    fn test_hoisting_respects_docstring_position() {
        let options = MinifyOptions::default();
        let out = minify_source(
            "def f():\n    'doc'\n    x = 'hello world'\n    y = 'hello world'\n    return x, y\n",
            "test.py",
            &options,
        )
        .unwrap();
        assert_eq!(out, "def f():'doc';a='hello world';x=a;y=a;return x,y");
    }
}
