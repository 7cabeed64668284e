//! Typed error surface for the query engine.
use thiserror::Error;

use crate::graph::NodeId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid regex: {0}")]
    InvalidRegex(String),

    #[error("invalid grammar: {0}")]
    InvalidGrammar(String),

    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("node {0:?} is not present in the graph")]
    UnknownNode(NodeId),
}

pub type Result<T> = std::result::Result<T, Error>;
