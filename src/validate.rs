//! Structural tree comparison
//!
//! Walks two trees field by field through [`visitor::fields`] and reports the first
//! difference as a dotted path. The load/store/delete marker is not compared.

use crate::error::CompareError;
use crate::tree::{NodeId, SyntaxTree};
use crate::visitor::{fields, Field, Scalar};

/// Compare the subtree at `left_id` in `left` with the subtree at `right_id` in `right`.
pub fn compare_nodes(
    left: &SyntaxTree,
    left_id: NodeId,
    right: &SyntaxTree,
    right_id: NodeId,
) -> Result<(), CompareError> {
    let name = left.kind(left_id).name();
    Comparer { left, right }.node(left_id, right_id, name.to_string())
}

/// Compare two whole trees from their roots.
pub fn compare_trees(left: &SyntaxTree, right: &SyntaxTree) -> Result<(), CompareError> {
    compare_nodes(left, left.root(), right, right.root())
}

struct Comparer<'a> {
    left: &'a SyntaxTree,
    right: &'a SyntaxTree,
}

fn mismatch(path: &str, reason: impl Into<String>) -> CompareError {
    CompareError {
        path: path.to_string(),
        reason: reason.into(),
    }
}

fn scalar_equal(a: &Scalar<'_>, b: &Scalar<'_>) -> bool {
    match (a, b) {
        (Scalar::Literal(a), Scalar::Literal(b)) => a.same_value(b),
        (a, b) => a == b,
    }
}

impl Comparer<'_> {
    fn node(&self, a: NodeId, b: NodeId, path: String) -> Result<(), CompareError> {
        let (kind_a, kind_b) = (self.left.kind(a), self.right.kind(b));
        if kind_a.name() != kind_b.name() {
            return Err(mismatch(
                &path,
                format!("expected {}, found {}", kind_a.name(), kind_b.name()),
            ));
        }

        let fields_a = fields(kind_a);
        let fields_b = fields(kind_b);
        for ((field, value_a), (_, value_b)) in fields_a.iter().zip(fields_b.iter()) {
            let path = format!("{}.{}", path, field);
            self.field(value_a, value_b, path)?;
        }
        Ok(())
    }

    fn field(&self, a: &Field<'_>, b: &Field<'_>, path: String) -> Result<(), CompareError> {
        match (a, b) {
            (Field::Ctx(_), Field::Ctx(_)) => Ok(()),
            (Field::Node(a), Field::Node(b)) => self.node(*a, *b, path),
            (Field::OptNode(a), Field::OptNode(b)) => self.optional(*a, *b, path),
            (Field::Nodes(a), Field::Nodes(b)) => {
                if a.len() != b.len() {
                    return Err(mismatch(
                        &path,
                        format!("expected {} items, found {}", a.len(), b.len()),
                    ));
                }
                for (index, (a, b)) in a.iter().zip(b.iter()).enumerate() {
                    self.node(*a, *b, format!("{}[{}]", path, index))?;
                }
                Ok(())
            }
            (Field::OptNodes(a), Field::OptNodes(b)) => {
                if a.len() != b.len() {
                    return Err(mismatch(
                        &path,
                        format!("expected {} items, found {}", a.len(), b.len()),
                    ));
                }
                for (index, (a, b)) in a.iter().zip(b.iter()).enumerate() {
                    self.optional(*a, *b, format!("{}[{}]", path, index))?;
                }
                Ok(())
            }
            (Field::Ident(a), Field::Ident(b)) if a == b => Ok(()),
            (Field::OptIdent(a), Field::OptIdent(b)) if a == b => Ok(()),
            (Field::Idents(a), Field::Idents(b)) if a == b => Ok(()),
            (Field::Scalar(a), Field::Scalar(b)) if scalar_equal(a, b) => Ok(()),
            (a, b) => Err(mismatch(&path, format!("expected {:?}, found {:?}", a, b))),
        }
    }

    fn optional(&self, a: Option<NodeId>, b: Option<NodeId>, path: String) -> Result<(), CompareError> {
        match (a, b) {
            (None, None) => Ok(()),
            (Some(a), Some(b)) => self.node(a, b, path),
            (Some(a), None) => Err(mismatch(
                &path,
                format!("expected {}, found nothing", self.left.kind(a).name()),
            )),
            (None, Some(b)) => Err(mismatch(
                &path,
                format!("expected nothing, found {}", self.right.kind(b).name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Frontend, PythonFrontend};

    fn module(source: &str) -> SyntaxTree {
        PythonFrontend.parse_module(source, "test.py").unwrap()
    }

    #[test]
    fn test_equal_trees() {
        assert!(compare_trees(&module("x = 1\n"), &module("x=1")).is_ok());
    }

    #[test]
    fn test_reports_dotted_path() {
        let err = compare_trees(&module("a\nb\nx = 1 + 2\n"), &module("a\nb\nx = y + 2\n"))
            .unwrap_err();
        assert_eq!(err.path, "Module.body[2].value.left");
    }

    #[test]
    fn test_length_mismatch() {
        let err = compare_trees(&module("f(1, 2)\n"), &module("f(1)\n")).unwrap_err();
        assert_eq!(err.path, "Module.body[0].value.args");
    }

    #[test]
    fn test_int_and_float_differ() {
        assert!(compare_trees(&module("x = 1\n"), &module("x = 1.0\n")).is_err());
    }

    #[test]
    fn test_negative_zero_differs() {
        assert!(compare_trees(&module("x = 0.0\n"), &module("x = -0.0\n")).is_err());
        assert!(compare_trees(&module("x = -0.0\n"), &module("x = -0.\n")).is_ok());
    }
}
