//! Error types for BVH construction and geometry storage.

use thiserror::Error;

/// Main error type for mesh and BVH operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Node arena could not grow
    #[error("Node allocation failed: could not reserve {requested} more node(s)")]
    AllocationFailed { requested: usize },

    /// Node index would collide with the null sentinel
    #[error("Node index overflow: arena is full (sentinel is u32::MAX)")]
    NodeIndexOverflow,

    /// Vertex index does not fit the 20-bit packed triangle format
    #[error("Vertex index {0} does not fit in 20 bits")]
    VertexIndexOverflow(u32),

    /// Triangle index out of bounds
    #[error("Triangle index {index} out of bounds (count: {count})")]
    TriangleOutOfBounds { index: usize, count: usize },

    /// Storage limit reached (indices must stay below the sentinel)
    #[error("Capacity exceeded: at most {limit} {what}")]
    CapacityExceeded { what: &'static str, limit: usize },

    /// Tree structure check failed
    #[error("BVH invariant violated: {0}")]
    InvariantViolation(String),

    /// Configuration value rejected
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invariant violation error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}

/// Result type alias for BVH operations.
pub type Result<T> = std::result::Result<T, Error>;
