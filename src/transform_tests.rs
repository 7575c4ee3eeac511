//! Transform Tests
//!
//! Each rewrite is switched on alone over the print-only profile, so the expected text
//! shows exactly what that rewrite changed.

#[cfg(test)]
mod tests {
    use crate::minify::minify_source;
    use crate::options::{
        MinifyOptions, RemoveAnnotationsOptions, RemoveLiteralStatementsOptions, TargetVersions,
    };

    fn run(source: &str, options: MinifyOptions) -> String {
        minify_source(source, "test.py", &options).unwrap()
    }

    fn with(configure: impl FnOnce(&mut MinifyOptions)) -> MinifyOptions {
        let mut options = MinifyOptions::print_only();
        configure(&mut options);
        options
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // REMOVALS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_remove_pass_leaves_placeholder() {
        let options = with(|o| o.remove_pass = true);
        assert_eq!(run("def f():\n    pass\n", options.clone()), "def f():0");
        assert_eq!(run("class A:\n    pass\n", options.clone()), "class A:0");
        assert_eq!(run("x = 1\npass\n", options), "x=1");
    }

    #[test]
    fn test_remove_literal_statements() {
        let options = with(|o| o.remove_literal_statements = RemoveLiteralStatementsOptions::all());
        assert_eq!(run("'doc'\n1\nx = 1\n", options.clone()), "x=1");
        assert_eq!(
            run("def f():\n    'doc'\n    return 1\n", options),
            "def f():return 1"
        );
    }

    #[test]
    fn test_docstrings_kept_when_module_reads_doc() {
        let options = with(|o| o.remove_literal_statements = RemoveLiteralStatementsOptions::all());
        assert_eq!(
            run("'doc'\nprint(__doc__)\n", options),
            "'doc';print(__doc__)"
        );
    }

    #[test]
    fn test_only_selected_docstrings_removed() {
        let options = with(|o| {
            o.remove_literal_statements = RemoveLiteralStatementsOptions {
                remove_function_docstrings: true,
                ..RemoveLiteralStatementsOptions::default()
            }
        });
        assert_eq!(
            run("class A:\n    'doc'\ndef f():\n    'doc'\n", options),
            "class A:'doc'\ndef f():0"
        );
    }

    #[test]
    fn test_remove_asserts() {
        let options = with(|o| o.remove_asserts = true);
        assert_eq!(run("assert x\ny = 1\n", options), "y=1");
    }

    #[test]
    fn test_remove_debug_takes_else_branch() {
        let options = with(|o| o.remove_debug = true);
        assert_eq!(
            run("if __debug__:\n    y = 1\nelse:\n    y = 2\n", options),
            "y=2"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ANNOTATIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_annotations_removed() {
        let options = with(|o| o.remove_annotations = RemoveAnnotationsOptions::default());
        assert_eq!(run("x: int = 1\n", options.clone()), "x=1");
        assert_eq!(
            run("def f(a: int) -> int:\n    return a\n", options.clone()),
            "def f(a):return a"
        );
        assert_eq!(run("y: int\n", options), "y:0");
    }

    #[test]
    fn test_class_attribute_annotations_kept_by_default() {
        let options = with(|o| o.remove_annotations = RemoveAnnotationsOptions::default());
        assert_eq!(run("class A:\n    x: int = 1\n", options), "class A:x:int=1");
    }

    #[test]
    fn test_dataclass_fields_never_lose_annotations() {
        let options = with(|o| {
            o.remove_annotations = RemoveAnnotationsOptions {
                remove_class_attribute_annotations: true,
                ..RemoveAnnotationsOptions::default()
            }
        });
        let out = run("@dataclass\nclass A:\n    x: int = 1\n", options.clone());
        assert!(out.ends_with("class A:x:int=1"), "{}", out);
        assert_eq!(run("class B:\n    x: int = 1\n", options), "class B:x=1");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // SMALLER SPELLINGS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_remove_object_base() {
        let options = with(|o| o.remove_object_base = true);
        assert_eq!(run("class A(object):\n    x = 1\n", options.clone()), "class A:x=1");
        assert_eq!(
            run("object = int\nclass A(object):\n    x = 1\n", options),
            "object=int\nclass A(object):x=1"
        );
    }

    #[test]
    fn test_remove_explicit_return_none() {
        let options = with(|o| o.remove_explicit_return_none = true);
        assert_eq!(run("def f():\n    return None\n", options.clone()), "def f():0");
        assert_eq!(
            run("def f(x):\n    if x:\n        return None\n    return 1\n", options),
            "def f(x):\n if x:return\n return 1"
        );
    }

    #[test]
    fn test_builtin_exception_brackets() {
        let options = with(|o| o.remove_builtin_exception_brackets = true);
        assert_eq!(run("raise ValueError()\n", options.clone()), "raise ValueError");
        assert_eq!(run("raise ValueError('x')\n", options.clone()), "raise ValueError('x')");
        assert_eq!(run("raise Custom()\n", options), "raise Custom()");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // IMPORTS AND GUARDS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_combine_imports() {
        let options = with(|o| o.combine_imports = true);
        assert_eq!(
            run("import a\nimport b\nfrom c import d\nfrom c import e\n", options),
            "import a,b;from c import d,e"
        );
    }

    #[test]
    fn test_star_imports_not_combined() {
        let options = with(|o| o.combine_imports = true);
        assert_eq!(
            run("from c import *\nfrom c import e\n", options),
            "from c import*;from c import e"
        );
    }

    #[test]
    fn test_version_guard_resolved() {
        let options = with(|o| o.remove_version_guards = true);
        assert_eq!(
            run(
                "import sys\nif sys.version_info >= (3, 0):\n    x = 1\nelse:\n    x = 2\n",
                options
            ),
            "import sys;x=1"
        );
    }

    #[test]
    fn test_version_guard_undecided_across_targets() {
        let options = with(|o| {
            o.remove_version_guards = true;
            o.target_versions = TargetVersions {
                minimum: (3, 7),
                maximum: (3, 12),
            };
        });
        let out = run(
            "import sys\nif sys.version_info >= (3, 10):\n    x = 1\n",
            options,
        );
        assert!(out.contains("if sys.version_info>=(3,10)"), "{}", out);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PARAMETERS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_positional_only_marker_dropped() {
        let options = with(|o| o.convert_posargs_to_args = true);
        assert_eq!(
            run("def f(a, b, /):\n    return a + b\n", options),
            "def f(a,b):return a+b"
        );
    }

    #[test]
    fn test_positional_only_kept_with_kwargs_collector() {
        let options = with(|o| o.convert_posargs_to_args = true);
        let out = run("def f(a, /, **k):\n    return a\n", options);
        assert!(out.contains('/'), "{}", out);
    }
}
