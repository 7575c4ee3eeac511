//! Safety Gate Tests
//!
//! Output is only returned when it parses back to the tree it was printed from. These
//! tests run a corpus of tricky constructs through the printer and every default rewrite,
//! and check that a front-end disagreeing with the printer is caught.

#[cfg(test)]
mod tests {
    use crate::codegen::unparse;
    use crate::error::{MinifyError, ParseFailure, StabilityCause};
    use crate::minify::{minify, minify_source, stable_unparse};
    use crate::options::{MinifyOptions, TargetVersions};
    use crate::parse::{Frontend, PythonFrontend};
    use crate::tree::SyntaxTree;
    use crate::validate::compare_trees;

    const CORPUS: &[&str] = &[
        "x = -a ** 2\ny = (-a) ** 2\nz = a ** -b\n",
        "x = (a + b) * c - (d - e)\ny = a - (b - c)\nz = a / (b * c)\n",
        "x = not a == b\ny = (not a) == b\n",
        "x = a if b else c if d else e\ny = (a if b else c) if d else e\n",
        "x = lambda a, *b, c=1, **d: (a, b, c, d)\n",
        "x = 1 .real\ny = 1.5.real\nz = 1j.imag\nw = 0x10\n",
        "x = a[1:2, ::3]\ny = a[...]\nz = a[(1, 2)]\n",
        "x = {**a, 'b': 1}\ny = {*a, 2}\nz = [*a, *b]\n",
        "x = 'it\\'s'\ny = \"say \\\"hi\\\"\"\nz = b'\\x00\\xff'\nw = 'line\\nbreak'\n",
        "if (n := len(a)) > 10:\n    print(n)\n",
        "a < b < c\na is not b\na not in b\n",
        "@decorator(1)\n@other\nclass A(B, metaclass=M):\n    def m(self, /, x, *, y):\n        return super().m(x, y=y)\n",
        "try:\n    pass\nexcept (A, B) as e:\n    raise C from e\nexcept D:\n    pass\nelse:\n    x = 1\nfinally:\n    y = 2\n",
        "async def f():\n    async with a as b, c:\n        async for x in b:\n            await x\n    return [y async for y in z]\n",
        "def g():\n    x = yield\n    y = yield from z\n    await_ = (yield 1)\n",
        "for i in range(3):\n    if i:\n        continue\n    while True:\n        break\nelse:\n    done = True\n",
        "match p:\n    case [1, *rest]:\n        pass\n    case {'k': v, **kw}:\n        pass\n    case Point(x=0) | None:\n        pass\n    case _ if guard:\n        pass\n",
        "global_name = 1\ndef f():\n    global global_name\n    del global_name\n",
        "with open(a) as f, open(b) as g:\n    print(*f, sep='', **kw)\n",
        "x = f'{a!r:>{width}}' + f\"{b['k']}\" + f'{{literal}}'\n",
        "x = [y for y in z if y for w in y]\nd = {k: v for k, v in items}\ng = (i for i in it)\n",
        "import a.b as c\nfrom . import d\nfrom ..e import (f as g, h)\n",
        "x = ()\ny = (1,)\nz = 1, 2\n[a, b] = c\n(d), e = f\n",
        "class E:\n    'doc'\n    x: int\n    y: 'str' = 'v'\n",
    ];

    /// Constructs whose shortest spelling is only accepted by newer versions.
    const VERSION_SENSITIVE: &[&str] = &[
        "name = 1\nprint(f'name={name!r}')\n",
        "def f(a):\n    return (*a, 1)\n",
        "def g(a):\n    yield (*a, 1)\n",
        "for x in (*a, 1):\n    pass\n",
        "print({(y := 1), 2})\n",
    ];

    fn parse(source: &str) -> SyntaxTree {
        PythonFrontend.parse_module(source, "corpus.py").unwrap()
    }

    fn targeting(minimum: (u8, u8)) -> MinifyOptions {
        MinifyOptions {
            target_versions: TargetVersions {
                minimum,
                maximum: (3, 14),
            },
            ..MinifyOptions::print_only()
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ROUND TRIP
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_print_only_round_trip() {
        for source in CORPUS {
            let original = parse(source);
            let out = minify_source(source, "corpus.py", &MinifyOptions::print_only())
                .unwrap_or_else(|err| panic!("{}\n{}", source, err));
            let reparsed = parse(&out);
            assert!(
                compare_trees(&original, &reparsed).is_ok(),
                "{}\n=>\n{}",
                source,
                out
            );
        }
    }

    #[test]
    fn test_print_only_is_idempotent() {
        for source in CORPUS {
            let once = minify_source(source, "a.py", &MinifyOptions::print_only()).unwrap();
            let twice = minify_source(&once, "b.py", &MinifyOptions::print_only()).unwrap();
            assert_eq!(once, twice, "{}", source);
        }
    }

    #[test]
    fn test_default_rewrites_stay_valid() {
        for source in CORPUS {
            let result = minify_source(source, "corpus.py", &MinifyOptions::default());
            assert!(result.is_ok(), "{}\n{:?}", source, result);
        }
    }

    #[test]
    fn test_output_never_longer_than_printed_input() {
        for source in CORPUS {
            let printed = minify_source(source, "a.py", &MinifyOptions::print_only()).unwrap();
            let minified = minify_source(source, "a.py", &MinifyOptions::default()).unwrap();
            assert!(minified.len() <= printed.len(), "{}\n{}", printed, minified);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // TARGET VERSIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_3_6_output_avoids_newer_spellings() {
        let outputs: Vec<String> = VERSION_SENSITIVE
            .iter()
            .map(|source| minify_source(source, "a.py", &targeting((3, 6))).unwrap())
            .collect();
        assert_eq!(
            outputs,
            vec![
                "name=1;print(f'name={name!r}')",
                "def f(a):return(*a,1)",
                "def g(a):yield(*a,1)",
                "for x in(*a,1):pass",
                "print({(y:=1),2})",
            ]
        );
    }

    #[test]
    fn test_3_8_output_uses_only_3_8_spellings() {
        let outputs: Vec<String> = VERSION_SENSITIVE
            .iter()
            .map(|source| minify_source(source, "a.py", &targeting((3, 8))).unwrap())
            .collect();
        assert_eq!(
            outputs,
            vec![
                "name=1;print(f'{name=}')",
                "def f(a):return*a,1",
                "def g(a):yield*a,1",
                "for x in(*a,1):pass",
                "print({(y:=1),2})",
            ]
        );
    }

    #[test]
    fn test_version_sensitive_output_keeps_tree() {
        for minimum in [(3, 0), (3, 6), (3, 8), (3, 9), (3, 12)] {
            for source in VERSION_SENSITIVE {
                let out = minify_source(source, "a.py", &targeting(minimum)).unwrap();
                assert!(
                    compare_trees(&parse(source), &parse(&out)).is_ok(),
                    "{:?}: {}",
                    minimum,
                    out
                );
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // STABILITY FAILURES
    // ═══════════════════════════════════════════════════════════════════════════════

    /// Parses input normally but reads every printed module back as `other`.
    struct DisagreeingFrontend {
        other: &'static str,
    }

    impl Frontend for DisagreeingFrontend {
        fn parse_module(&self, source: &str, filename: &str) -> Result<SyntaxTree, ParseFailure> {
            if filename == "<minified>" {
                PythonFrontend.parse_module(self.other, filename)
            } else {
                PythonFrontend.parse_module(source, filename)
            }
        }

        fn parse_expression(&self, source: &str) -> Result<SyntaxTree, ParseFailure> {
            PythonFrontend.parse_expression(source)
        }
    }

    #[test]
    fn test_mismatch_reported_with_both_texts() {
        let frontend = DisagreeingFrontend { other: "y = 2\n" };
        let tree = frontend.parse_module("x = 1\n", "input.py").unwrap();
        let err = stable_unparse(&tree, &frontend, TargetVersions::default()).unwrap_err();
        assert_eq!(err.input, "x = 1\n");
        assert_eq!(err.minified, "x=1");
        assert!(matches!(err.cause, StabilityCause::Mismatch(_)));
    }

    #[test]
    fn test_unparseable_output_reported() {
        let frontend = DisagreeingFrontend { other: "x = (\n" };
        let tree = frontend.parse_module("x = 1\n", "input.py").unwrap();
        let err = minify(tree, &MinifyOptions::print_only(), &frontend).unwrap_err();
        assert!(matches!(err.cause, StabilityCause::Reparse(_)));
    }

    #[test]
    fn test_parse_failure_is_not_a_stability_error() {
        let err = minify_source("def (:\n", "broken.py", &MinifyOptions::default()).unwrap_err();
        assert!(matches!(err, MinifyError::Parse(_)));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // END TO END
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_full_pipeline_on_small_module() {
        let source = "\
import os
import sys


class Greeter(object):
    \"\"\"Say hello.\"\"\"

    def greet(self, name: str) -> None:
        message = 'hello ' + name
        print(message)
        print(message)
        return None
";
        let out = minify_source(source, "greeter.py", &MinifyOptions::default()).unwrap();
        assert!(out.starts_with("import os,sys\nclass Greeter:"), "{}", out);
        assert!(!out.contains("object"));
        assert!(!out.contains("None"));
        assert!(!out.contains("message"));
        let original = parse(source);
        assert!(compare_trees(&original, &parse(&out)).is_err());
        assert!(unparse(&parse(&out), &PythonFrontend, TargetVersions::default()).len() <= out.len());
    }
}
