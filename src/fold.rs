//! Constant folding
//!
//! Replaces arithmetic over numeric literals with its result when the printed result is
//! strictly shorter. Division and exponentiation are never folded. Every replacement is
//! printed, parsed back and re-evaluated before it is applied.

use num_traits::Signed;
use tracing::{debug, trace};

use crate::codegen::expression_text;
use crate::options::TargetVersions;
use crate::parse::Frontend;
use crate::static_eval::evaluate;
use crate::tree::{Literal, NodeId, NodeKind, Operator, SyntaxTree, UnaryOperator};
use crate::validate::compare_nodes;
use crate::visitor::preorder;

fn is_negative(value: &Literal) -> bool {
    match value {
        Literal::Int(i) => i.is_negative(),
        Literal::Float(f) => f.is_sign_negative(),
        _ => false,
    }
}

fn absolute(value: &Literal) -> Literal {
    match value {
        Literal::Int(i) => Literal::Int(i.abs()),
        Literal::Float(f) => Literal::Float(f.abs()),
        other => other.clone(),
    }
}

/// Negative results are spelled as unary minus over the magnitude, the shape a parser
/// produces for `-5`.
fn build_replacement(tree: &mut SyntaxTree, value: &Literal) -> NodeId {
    if is_negative(value) {
        let operand = tree.constant(absolute(value));
        tree.add(NodeKind::UnaryOp {
            op: UnaryOperator::USub,
            operand,
        })
    } else {
        tree.constant(value.clone())
    }
}

/// The folded form of `id`, if it is valid and shorter than the current text.
fn try_fold(
    tree: &SyntaxTree,
    id: NodeId,
    frontend: &dyn Frontend,
    targets: TargetVersions,
) -> Option<Literal> {
    let NodeKind::BinOp { op, .. } = tree.kind(id) else {
        return None;
    };
    if matches!(op, Operator::Div | Operator::Pow) || tree.in_pattern(id) {
        return None;
    }
    let value = evaluate(tree, id)?;

    let mut scratch = SyntaxTree::new(None);
    let replacement = build_replacement(&mut scratch, &value);
    scratch.set_root(replacement);

    let original = expression_text(tree, id, frontend, targets);
    let folded = expression_text(&scratch, replacement, frontend, targets);
    if folded.len() >= original.len() {
        trace!(%original, %folded, "fold rejected, not shorter");
        return None;
    }

    let parsed = frontend.parse_expression(&folded).ok()?;
    let NodeKind::Expression { body } = parsed.kind(parsed.root()) else {
        return None;
    };
    if let Err(err) = compare_nodes(&scratch, replacement, &parsed, *body) {
        trace!(%folded, %err, "fold rejected, reparse differs");
        return None;
    }
    match evaluate(&parsed, *body) {
        Some(reparsed) if reparsed.same_value(&value) => {}
        _ => {
            trace!(%folded, "fold rejected, value differs");
            return None;
        }
    }
    trace!(%original, %folded, "constant folded");
    Some(value)
}

/// Fold constant arithmetic in place. Returns the number of subtrees replaced.
pub fn fold_constants(
    tree: &mut SyntaxTree,
    frontend: &dyn Frontend,
    targets: TargetVersions,
) -> usize {
    let nodes = preorder(tree, tree.root());
    let mut folded = 0;
    // innermost first so outer operations see folded operands
    for &id in nodes.iter().rev() {
        let Some(value) = try_fold(tree, id, frontend, targets) else {
            continue;
        };
        let kind = if is_negative(&value) {
            let operand = tree.constant(absolute(&value));
            NodeKind::UnaryOp {
                op: UnaryOperator::USub,
                operand,
            }
        } else {
            NodeKind::Constant { value }
        };
        tree.replace_kind(id, kind);
        folded += 1;
    }
    debug!(folded, "constants folded");
    folded
}
