//! Error types for script document operations.

use thiserror::Error;

use crate::LineId;

/// Errors from the document model and the action ledger.
///
/// These are programmer-facing: they indicate a broken invariant or a
/// misused mutation contract, and must not be caught silently.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// Caller misuse of a mutation contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// Operation targeted a line that is not part of this document.
    #[error("line not found: {0:?}")]
    NotFound(LineId),

    /// An undo/redo replay required a live presentation binding that is
    /// absent. Fatal to that operation; indicates a structural bug in the
    /// presentation layer's mount/unmount bookkeeping.
    #[error("{op} is missing a node for {line:?}")]
    Consistency { line: LineId, op: &'static str },

    /// Filesystem failure while loading or saving a script file.
    #[error("script file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The script file is not valid JSON for the persisted shape.
    #[error("script file parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
