use thiserror::Error;

/// Enum with all errors in this crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RPlusTreeError {
    /// The tree configuration does not satisfy its preconditions.
    #[error("Invalid tree configuration: {0}")]
    InvalidConfig(String),

    /// A rectangle was supplied with a different number of dimensions than the tree holds.
    #[error("Expected {expected} dimensions, got {actual}.")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, RPlusTreeError>;
