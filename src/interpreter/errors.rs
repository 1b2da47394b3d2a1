//! Error types of the logic runtime
//!
//! Program text never produces a runtime error: parse errors are values kept
//! per line (see [`ParseError`](crate::parser::parse::ParseError)) and
//! evaluation of a parsed line is total. What can fail is moving saved device
//! state in and out, which is what [`StateError`] covers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    /// Saved state could not be read or written
    #[error("state I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Saved state is not a valid state document
    #[error("invalid state document: {0}")]
    Decode(#[from] serde_json::Error),
}
