use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dense 1-based unitig identifier; 0 means "not yet assigned".
pub type UnitigId = usize;
pub type ColorId = usize;

/// Traversal direction through a unitig. `Forward` continues into the
/// successors, `Backward` into the predecessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn flip(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

#[derive(Debug, Error)]
pub enum ColortigError {
    #[error("unitig ids are not assigned; call assign_ids() before traversal")]
    NotInitialized,

    #[error("contig output unavailable: {0}")]
    OutputUnavailable(std::io::Error),

    #[error("unitig '{name}' contains invalid symbol '{symbol}'")]
    MalformedSequence { name: String, symbol: char },

    #[error("graph invariant violated: {0}")]
    InvariantViolation(String),

    #[error("malformed input in {path}: {msg}")]
    MalformedInput { path: String, msg: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
