//! Renaming Tests
//!
//! Rename order, name reuse across sibling scopes, keyword parameters and the cases where
//! renaming must not happen at all.

#[cfg(test)]
mod tests {
    use crate::minify::minify_source;
    use crate::options::MinifyOptions;

    fn options() -> MinifyOptions {
        MinifyOptions {
            hoist_literals: false,
            ..MinifyOptions::default()
        }
    }

    fn minify(source: &str) -> String {
        minify_source(source, "test.py", &options()).unwrap()
    }

    fn accumulating_function(name: &str) -> String {
        let mut source = format!("def {}():\n    accumulator = 0\n", name);
        for _ in 0..8 {
            source.push_str("    accumulator += 1\n");
        }
        source.push_str("    return accumulator\n");
        source
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // SHORT NAMES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_sibling_functions_reuse_short_name() {
        let source = format!("{}{}", accumulating_function("first"), accumulating_function("second"));
        let body = format!("a=0;{}return a", "a+=1;".repeat(8));
        assert_eq!(
            minify(&source),
            format!("def first():{}\ndef second():{}", body, body)
        );
    }

    #[test]
    fn test_most_referenced_binding_gets_first_name() {
        let out = minify("def f():\n    rare = 1\n    common = 2\n    return rare + common + common + common\n");
        assert_eq!(out, "def f():b=1;a=2;return b+a+a+a");
    }

    #[test]
    fn test_equal_counts_follow_declaration_order() {
        let out = minify("def f():\n    first = 1\n    second = 2\n    return first + second\n");
        assert_eq!(out, "def f():a=1;b=2;return a+b");
    }

    #[test]
    fn test_closure_variable_not_shadowed() {
        let out = minify(
            "def outer():\n    value = 1\n    def inner():\n        return value\n    return inner\n",
        );
        assert_eq!(out, "def outer():\n a=1\n def b():return a\n return b");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PARAMETERS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_keyword_parameter_keeps_name_and_gains_alias() {
        let out = minify("def area(width):\n    return width * width * width * width\n");
        assert_eq!(out, "def area(width):a=width;return a*a*a*a");
    }

    #[test]
    fn test_short_parameter_left_alone() {
        let out = minify("def f(x):\n    return x\n");
        assert_eq!(out, "def f(x):return x");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // NO RENAMING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_dynamic_access_taints_module() {
        let out = minify("def f():\n    value = 1\n    return eval('value')\n");
        assert_eq!(out, "def f():value=1;return eval('value')");
    }

    #[test]
    fn test_preserved_local() {
        let options = MinifyOptions {
            preserve_locals: vec!["total".to_string()],
            ..options()
        };
        let out = minify_source("def f():\n    total = 1\n    return total\n", "t.py", &options)
            .unwrap();
        assert_eq!(out, "def f():total=1;return total");
    }

    #[test]
    fn test_globals_kept_by_default() {
        let out = minify("counter = 1\ncounter = counter + 1\n");
        assert_eq!(out, "counter=1;counter=counter+1");
    }

    #[test]
    fn test_exported_globals_kept_when_renaming_globals() {
        let options = MinifyOptions {
            rename_globals: true,
            ..options()
        };
        let out = minify_source(
            "__all__ = ['public']\ndef public():\n    pass\ndef helper():\n    pass\nhelper()\n",
            "t.py",
            &options,
        )
        .unwrap();
        assert!(out.contains("def public():"));
        assert!(!out.contains("helper"));
    }

    #[test]
    fn test_star_import_blocks_global_renaming() {
        let options = MinifyOptions {
            rename_globals: true,
            ..options()
        };
        let out = minify_source("from m import *\nlongname = 1\nprint(longname)\n", "t.py", &options)
            .unwrap();
        assert!(out.contains("longname"));
    }
}
