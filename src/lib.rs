//! # Python Source Minifier
//!
//! ## Pipeline
//!
//! 1. **Parse**: source text becomes an arena [`SyntaxTree`] through a [`Frontend`].
//!    Nodes refer to each other by [`NodeId`]; parent and namespace links are plain ids.
//!
//! 2. **Annotate**: every node learns its parent and namespace, every scope node gets a
//!    [`Scope`](tree::Scope) side table, and every name is attached to a binding.
//!
//! 3. **Transform**: the rewrites enabled in [`MinifyOptions`] run in a fixed order
//!    (removals, import merging, constant folding, literal hoisting, renaming).
//!
//! 4. **Print**: the minimal printer emits the shortest text it can prove equivalent,
//!    adding spaces and parentheses only where the grammar needs them.
//!
//! 5. **Verify**: the printed text is parsed again and compared field by field with the
//!    transformed tree. Output that fails the comparison is never returned.
//!
//! ## Invariants
//!
//! - A rename is applied only when the new name is unclaimed in every scope the
//!   binding's references pass through.
//! - Parameters a caller can name by keyword keep their name; the body gains an alias.
//! - Any use of `eval`, `exec`, `locals`, `globals` or `vars` disables renaming and
//!   hoisting for the whole module.

mod bind;
mod binding;
mod codegen;
mod discovery;
mod error;
mod fold;
mod fstring;
mod hoist;
mod literal;
mod mapper;
mod minify;
mod options;
mod parse;
mod printer;
mod renamer;
mod scope;
mod static_eval;
mod transform;
mod tree;
mod validate;
mod visitor;

#[cfg(test)]
mod fold_tests;
#[cfg(test)]
mod fstring_tests;
#[cfg(test)]
mod hoist_tests;
#[cfg(test)]
mod rename_tests;
#[cfg(test)]
mod safety_tests;
#[cfg(test)]
mod scope_tests;
#[cfg(test)]
mod transform_tests;

pub use codegen::{expression_text, unparse};
pub use discovery::{discover_sources, minify_files, BatchSummary, FailedFile, FileOutcome};
pub use error::{BatchError, CompareError, MinifyError, ParseFailure, Result, StabilityCause, StabilityError};
pub use fstring::{solve_quotes, Specials, MAX_DEPTH};
pub use literal::Quote;
pub use minify::{exported_names, minify, minify_source, stable_unparse};
pub use options::{
    MinifyOptions, RemoveAnnotationsOptions, RemoveLiteralStatementsOptions, TargetVersions,
};
pub use parse::{Frontend, PythonFrontend};
pub use tree::{Literal, NodeId, NodeKind, SyntaxTree};
pub use validate::{compare_nodes, compare_trees};
