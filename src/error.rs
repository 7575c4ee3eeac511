//! Error types
//!
//! Only two things can fail a minification: the input doesn't parse, or the printed
//! output doesn't reproduce the transformed tree. Defects inside the passes are panics.

use thiserror::Error;

/// Text that is not valid subject-language syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{filename}: {message}")]
pub struct ParseFailure {
    pub filename: String,
    pub message: String,
}

impl ParseFailure {
    pub fn new(filename: impl Into<String>, message: impl Into<String>) -> Self {
        ParseFailure {
            filename: filename.into(),
            message: message.into(),
        }
    }
}

/// First structural difference between two trees. `path` is a dotted field path from the
/// root, e.g. `Module.body[2].value.left`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {reason}")]
pub struct CompareError {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StabilityCause {
    #[error("minified output does not parse: {0}")]
    Reparse(ParseFailure),
    #[error("minified output parses to a different tree at {0}")]
    Mismatch(CompareError),
}

/// The printed text failed the round-trip check. Carries both texts for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stability check failed: {cause}")]
pub struct StabilityError {
    /// Text of the input the tree was parsed from.
    pub input: String,
    pub minified: String,
    #[source]
    pub cause: StabilityCause,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MinifyError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    #[error(transparent)]
    Stability(#[from] StabilityError),
}

pub type Result<T> = std::result::Result<T, MinifyError>;

/// A file in a batch that produced no output.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Minify(#[from] MinifyError),
}
