//! Name tables and namespace lookup helpers
//!
//! Keyword and builtin sets are built once and shared read-only across every minification.

use std::collections::HashSet;

use crate::binding::BindingRef;
use crate::tree::{NodeId, NodeKind, SyntaxTree};

lazy_static::lazy_static! {
    pub static ref KEYWORDS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        for kw in [
            "False", "None", "True", "and", "as", "assert", "async", "await", "break",
            "class", "continue", "def", "del", "elif", "else", "except", "finally", "for",
            "from", "global", "if", "import", "in", "is", "lambda", "nonlocal", "not", "or",
            "pass", "raise", "return", "try", "while", "with", "yield",
            // keywords in some supported versions
            "print", "exec",
        ] {
            s.insert(kw);
        }
        s
    };

    /// Contextual keywords; printed with a trailing space and never generated as names.
    pub static ref SOFT_KEYWORDS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("match");
        s.insert("case");
        s.insert("type");
        s.insert("_");
        s
    };

    pub static ref BUILTINS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        for name in [
            // Functions
            "abs", "aiter", "all", "anext", "any", "ascii", "bin", "breakpoint", "callable",
            "chr", "compile", "copyright", "credits", "delattr", "dir", "divmod", "eval",
            "exec", "exit", "format", "getattr", "globals", "hasattr", "hash", "help", "hex",
            "id", "input", "isinstance", "issubclass", "iter", "len", "license", "locals",
            "max", "min", "next", "oct", "open", "ord", "pow", "print", "quit", "repr",
            "round", "setattr", "sorted", "sum", "vars", "__import__", "__build_class__",
            // Types
            "bool", "bytearray", "bytes", "classmethod", "complex", "dict", "enumerate",
            "filter", "float", "frozenset", "int", "list", "map", "memoryview", "object",
            "property", "range", "reversed", "set", "slice", "staticmethod", "str", "super",
            "tuple", "type", "zip",
            // Constants
            "Ellipsis", "NotImplemented", "__debug__",
        ] {
            s.insert(name);
        }
        for name in BUILTIN_EXCEPTIONS.iter() {
            s.insert(*name);
        }
        s
    };

    pub static ref BUILTIN_EXCEPTIONS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        for name in [
            "ArithmeticError", "AssertionError", "AttributeError", "BaseException",
            "BaseExceptionGroup", "BlockingIOError", "BrokenPipeError", "BufferError",
            "BytesWarning", "ChildProcessError", "ConnectionAbortedError", "ConnectionError",
            "ConnectionRefusedError", "ConnectionResetError", "DeprecationWarning",
            "EncodingWarning", "EnvironmentError", "EOFError", "Exception", "ExceptionGroup",
            "FileExistsError", "FileNotFoundError", "FloatingPointError", "FutureWarning",
            "GeneratorExit", "ImportError", "ImportWarning", "IndentationError", "IndexError",
            "InterruptedError", "IOError", "IsADirectoryError", "KeyboardInterrupt",
            "KeyError", "LookupError", "MemoryError", "ModuleNotFoundError", "NameError",
            "NotADirectoryError", "NotImplementedError", "OSError", "OverflowError",
            "PendingDeprecationWarning", "PermissionError", "ProcessLookupError",
            "RecursionError", "ReferenceError", "ResourceWarning", "RuntimeError",
            "RuntimeWarning", "StopAsyncIteration", "StopIteration", "SyntaxError",
            "SyntaxWarning", "SystemError", "SystemExit", "TabError", "TimeoutError",
            "TypeError", "UnboundLocalError", "UnicodeDecodeError", "UnicodeEncodeError",
            "UnicodeError", "UnicodeTranslateError", "UnicodeWarning", "UserWarning",
            "ValueError", "Warning", "ZeroDivisionError",
        ] {
            s.insert(name);
        }
        s
    };

    /// Builtins that can observe local names at runtime.
    pub static ref TAINTING_BUILTINS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("eval");
        s.insert("exec");
        s.insert("locals");
        s.insert("globals");
        s.insert("vars");
        s
    };
}

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(name) || SOFT_KEYWORDS.contains(name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(name)
}

/// `__name__`-style system names are looked up by the runtime and never renamed.
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Names a generated identifier must never take.
pub fn is_unavailable(name: &str) -> bool {
    is_keyword(name) || is_builtin(name)
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

pub fn find_binding(tree: &SyntaxTree, scope: NodeId, name: &str) -> Option<BindingRef> {
    tree.scope(scope)
        .bindings
        .iter()
        .position(|b| b.name == name)
        .map(|index| BindingRef { scope, index })
}

/// The namespace chain from `scope` up to the module, innermost first.
pub fn scope_chain(tree: &SyntaxTree, scope: NodeId) -> Vec<NodeId> {
    let mut chain = vec![scope];
    let mut current = tree.namespace(scope);
    while let Some(outer) = current {
        chain.push(outer);
        current = tree.namespace(outer);
    }
    chain
}

pub fn is_class_scope(tree: &SyntaxTree, scope: NodeId) -> bool {
    matches!(tree.kind(scope), NodeKind::ClassDef { .. })
}

pub fn is_module_scope(tree: &SyntaxTree, scope: NodeId) -> bool {
    matches!(
        tree.kind(scope),
        NodeKind::Module { .. } | NodeKind::Expression { .. }
    )
}

/// The enclosing non-class scope nearest to `namespace` that already binds `name`.
fn enclosing_binder(tree: &SyntaxTree, namespace: NodeId, name: &str) -> Option<NodeId> {
    let mut current = tree.namespace(namespace);
    while let Some(outer) = current {
        if !is_class_scope(tree, outer) && find_binding(tree, outer, name).is_some() {
            return Some(outer);
        }
        current = tree.namespace(outer);
    }
    None
}

/// Where a binding of `name` written in `namespace` lives, following `global` and
/// `nonlocal` declarations. The flag is set when the binding is visible as a class
/// attribute and so must keep its name.
///
/// Redirected sites must be bound after every plain site, so the binder they redirect to
/// already exists.
pub fn binding_target(tree: &SyntaxTree, namespace: NodeId, name: &str) -> (NodeId, bool) {
    let scope = tree.scope(namespace);
    if scope.global_names.contains(name) {
        return (tree.module(), false);
    }
    let redirected = scope.nonlocal_names.contains(name);
    if is_class_scope(tree, namespace) {
        if redirected {
            let target = enclosing_binder(tree, namespace, name).unwrap_or_else(|| tree.module());
            return (target, true);
        }
        return (namespace, true);
    }
    if redirected {
        if let Some(target) = enclosing_binder(tree, namespace, name) {
            return (target, false);
        }
        // no binder yet: the nearest enclosing function owns it
        let mut current = tree.namespace(namespace);
        while let Some(outer) = current {
            if matches!(tree.kind(outer), NodeKind::FunctionDef { .. } | NodeKind::Lambda { .. }) {
                return (outer, false);
            }
            current = tree.namespace(outer);
        }
        return (tree.module(), false);
    }
    (namespace, false)
}

/// Whether a store of `name` in `namespace` goes through a `global`/`nonlocal` redirect.
pub fn is_redirected(tree: &SyntaxTree, namespace: NodeId, name: &str) -> bool {
    let scope = tree.scope(namespace);
    scope.global_names.contains(name) || scope.nonlocal_names.contains(name)
}

/// Resolve a load of `name` in `namespace` to an existing binding. Class bodies are
/// skipped once the search leaves the starting namespace.
pub fn resolve(tree: &SyntaxTree, namespace: NodeId, name: &str) -> Option<BindingRef> {
    let scope = tree.scope(namespace);
    if scope.global_names.contains(name) {
        return find_binding(tree, tree.module(), name);
    }
    if !scope.nonlocal_names.contains(name) {
        if let Some(found) = find_binding(tree, namespace, name) {
            return Some(found);
        }
    }
    let outer = enclosing_binder(tree, namespace, name)?;
    find_binding(tree, outer, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables() {
        assert!(is_keyword("lambda"));
        assert!(is_keyword("match"));
        assert!(is_builtin("print"));
        assert!(is_builtin("ValueError"));
        assert!(!is_builtin("accumulator"));
        assert!(TAINTING_BUILTINS.contains("locals"));
    }

    #[test]
    fn test_dunder() {
        assert!(is_dunder("__init__"));
        assert!(!is_dunder("__"));
        assert!(!is_dunder("____"));
        assert!(!is_dunder("_private"));
    }
}
