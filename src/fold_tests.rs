//! Constant Folding Tests

#[cfg(test)]
mod tests {
    use crate::bind::annotate;
    use crate::fold::fold_constants;
    use crate::minify::minify_source;
    use crate::options::{MinifyOptions, TargetVersions};
    use crate::parse::{Frontend, PythonFrontend};

    fn minify(source: &str) -> String {
        minify_source(source, "test.py", &MinifyOptions::default()).unwrap()
    }

    fn folds(source: &str) -> usize {
        let mut tree = PythonFrontend.parse_module(source, "test.py").unwrap();
        annotate(&mut tree);
        fold_constants(&mut tree, &PythonFrontend, TargetVersions::default())
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ACCEPTED
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_simple_addition() {
        assert_eq!(minify("x = 1 + 1\n"), "x=2");
    }

    #[test]
    fn test_negative_result_is_unary_minus() {
        assert_eq!(minify("x = 1 - 5\n"), "x=-4");
    }

    #[test]
    fn test_nested_operations_fold_together() {
        assert_eq!(minify("x = (2 * 3) + 4\n"), "x=10");
    }

    #[test]
    fn test_bool_arithmetic_folds_to_int() {
        assert_eq!(minify("x = True + True\n"), "x=2");
    }

    #[test]
    fn test_float_folding_removes_operator() {
        let out = minify("x = 1.5 + 1.5\n");
        assert!(!out.contains('+'), "{}", out);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // REJECTED
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_division_and_power_never_fold() {
        assert_eq!(minify("x = 10 / 2\n"), "x=10/2");
        assert_eq!(minify("x = 2 ** 10\n"), "x=2**10");
        assert_eq!(folds("x = 10 / 2\ny = 2 ** 10\n"), 0);
    }

    #[test]
    fn test_longer_result_kept_unfolded() {
        assert_eq!(minify("x = 1 << 40\n"), "x=1<<40");
    }

    #[test]
    fn test_non_numeric_operands_kept() {
        assert_eq!(minify("x = 'a' + 'b'\n"), "x='a'+'b'");
        assert_eq!(minify("x = y + 1\n"), "x=y+1");
    }

    #[test]
    fn test_disabled_by_option() {
        let options = MinifyOptions {
            constant_folding: false,
            ..MinifyOptions::default()
        };
        assert_eq!(minify_source("x = 1 + 1\n", "t.py", &options).unwrap(), "x=1+1");
    }

    #[test]
    fn test_value_patterns_untouched() {
        assert_eq!(folds("match x:\n    case 1 + 2j:\n        pass\n"), 0);
    }
}
