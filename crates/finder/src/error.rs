//! Engine errors.

use crate::adapter::NodeKind;
use core::fmt::{Display, Formatter, Result as FmtResult};
use std::error::Error;

/// Fatal errors raised by the engine. Acceleration failures never surface
/// here; they are logged and fall back to the manual path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// The tree root handed to the engine is not a document node.
    InvalidDocument {
        /// Kind of the node that was found instead.
        found: NodeKind,
    },
}

impl Display for FinderError {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::InvalidDocument { found } => {
                write!(fmt, "InvalidDocument: tree root is a {found:?} node, expected a document")
            }
        }
    }
}

impl Error for FinderError {}
