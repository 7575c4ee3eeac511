//! Interpolated String Tests
//!
//! Printed f-strings must reparse to the same tree under both the pre-3.12 quoting rules
//! and the relaxed ones.

#[cfg(test)]
mod tests {
    use crate::codegen::unparse;
    use crate::fstring::{interpolated_text, level_specials, solve_quotes, MAX_DEPTH};
    use crate::minify::minify_source;
    use crate::options::{MinifyOptions, TargetVersions};
    use crate::parse::{Frontend, PythonFrontend};
    use crate::tree::{Conversion, ExprContext, Literal, NodeId, NodeKind, SyntaxTree};
    use crate::validate::compare_trees;

    fn minify(source: &str) -> String {
        minify_source(source, "test.py", &MinifyOptions::print_only()).unwrap()
    }

    fn targeting(minimum: (u8, u8), source: &str) -> String {
        let options = MinifyOptions {
            target_versions: TargetVersions {
                minimum,
                maximum: (3, 14),
            },
            ..MinifyOptions::print_only()
        };
        minify_source(source, "test.py", &options).unwrap()
    }

    fn modern(source: &str) -> String {
        targeting((3, 12), source)
    }

    /// `f'{f'{...}'}'` nested `depth` times around a name, built without source text.
    fn nested_fstring(depth: usize) -> (SyntaxTree, NodeId) {
        let mut tree = SyntaxTree::new(None);
        let mut inner = tree.name("x", ExprContext::Load);
        for _ in 0..depth {
            let part = tree.add(NodeKind::FormattedValue {
                value: inner,
                conversion: Conversion::None,
                format_spec: None,
            });
            inner = tree.add(NodeKind::JoinedStr { values: vec![part] });
        }
        tree.set_root(inner);
        (tree, inner)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // LEGACY QUOTING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_plain_fstring() {
        assert_eq!(minify("x = f\"{a}\"\n"), "x=f'{a}'");
        assert_eq!(minify("x = f\"{a!r:>10}\"\n"), "x=f'{a!r:>10}'");
    }

    #[test]
    fn test_nested_string_takes_other_quote() {
        assert_eq!(minify("x = f\"{a['k']}\"\n"), "x=f'{a[\"k\"]}'");
    }

    #[test]
    fn test_nested_fstring() {
        assert_eq!(minify("x = f\"{f'{a}'}\"\n"), "x=f'{f\"{a}\"}'");
    }

    #[test]
    fn test_escapes_in_outer_text() {
        assert_eq!(minify("x = f\"a\\n{b}\"\n"), "x=f'a\\n{b}'");
    }

    #[test]
    fn test_literal_braces_doubled() {
        assert_eq!(minify("x = f\"{{}}{a}\"\n"), "x=f'{{}}{a}'");
    }

    #[test]
    fn test_debug_shorthand_from_3_8() {
        assert_eq!(targeting((3, 8), "x = f\"{value=}\"\n"), "x=f'{value=}'");
        assert_eq!(
            targeting((3, 8), "name = 1\nprint(f'name={name!r}')\n"),
            "name=1;print(f'{name=}')"
        );
    }

    #[test]
    fn test_debug_shorthand_avoided_before_3_8() {
        assert_eq!(
            targeting((3, 6), "name = 1\nprint(f'name={name!r}')\n"),
            "name=1;print(f'name={name!r}')"
        );
        assert_eq!(targeting((3, 6), "x = f\"{value=}\"\n"), "x=f'value={value!r}'");
        assert_eq!(minify("x = f\"{value=}\"\n"), "x=f'value={value!r}'");
    }

    #[test]
    fn test_renamed_debug_name_uses_explicit_form() {
        let out = minify_source(
            "def f():\n    value = 1\n    return f\"{value=}\" + f\"{value}\" + f\"{value}\"\n",
            "test.py",
            &MinifyOptions::default(),
        )
        .unwrap();
        assert_eq!(out, "def f():a=1;return f'value={a!r}'+f'{a}'+f'{a}'");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MODERN QUOTING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_modern_output_reparses() {
        let out = modern("x = f\"{a['k']}\"\n");
        let original = PythonFrontend.parse_module("x = f\"{a['k']}\"\n", "a.py").unwrap();
        let reparsed = PythonFrontend.parse_module(&out, "b.py").unwrap();
        assert!(compare_trees(&original, &reparsed).is_ok());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // NESTING LIMITS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_four_levels_are_solvable() {
        let (tree, id) = nested_fstring(MAX_DEPTH);
        let levels = level_specials(&tree, id);
        assert_eq!(levels.len(), MAX_DEPTH);
        assert!(solve_quotes(&levels).is_some());
    }

    #[test]
    fn test_five_levels_report_infeasible() {
        let (tree, id) = nested_fstring(MAX_DEPTH + 1);
        assert_eq!(solve_quotes(&level_specials(&tree, id)), None);
        // without source text to fall back on, some spelling is still produced
        assert!(interpolated_text(&tree, id, &PythonFrontend, TargetVersions::default(), None).is_some());
    }

    #[test]
    fn test_string_nested_in_deepest_level_counts() {
        let mut tree = SyntaxTree::new(None);
        let text = tree.constant(Literal::Str("s".to_string()));
        let part = tree.add(NodeKind::FormattedValue {
            value: text,
            conversion: Conversion::None,
            format_spec: None,
        });
        let id = tree.add(NodeKind::JoinedStr { values: vec![part] });
        tree.set_root(id);
        assert_eq!(level_specials(&tree, id).len(), 2);
    }

    #[test]
    fn test_print_only_round_trip_keeps_tree() {
        let source = "x = f'{a:{b}}' + f\"{c!s}\" + f'{d[\"e\"]!a:>{w}}'\n";
        let tree = PythonFrontend.parse_module(source, "t.py").unwrap();
        let out = unparse(&tree, &PythonFrontend, TargetVersions::default());
        let reparsed = PythonFrontend.parse_module(&out, "t.py").unwrap();
        assert!(compare_trees(&tree, &reparsed).is_ok(), "{}", out);
    }
}
