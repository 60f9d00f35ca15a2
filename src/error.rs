//! Error taxonomy for enumeration and decoding.
//!
//! All computations here are deterministic, so every error is either a caller
//! bug (an index outside its valid range) or a misconfigured registry.
//! Nothing is ever clamped or defaulted.

use num_bigint::BigUint;
use thiserror::Error;

/// Which of the three decoding indices was rejected.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IndexKind {
    /// Shape index `i`.
    Shape,
    /// Operator configuration index `r`.
    Operator,
    /// Terminal configuration index `s`.
    Terminal,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Shape => write!(f, "shape"),
            IndexKind::Operator => write!(f, "operator configuration"),
            IndexKind::Terminal => write!(f, "terminal configuration"),
        }
    }
}

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum EnumError {
    #[error("Invalid arity {arity} for operator '{name}': must be >= 1")]
    InvalidArity { name: String, arity: usize },

    #[error("Invalid {kind} index {index}: must be below {bound}")]
    InvalidIndex {
        kind: IndexKind,
        index: BigUint,
        bound: BigUint,
    },

    #[error("Unranking index {index} is out of range for {size} elements")]
    RangeOverflow { index: BigUint, size: BigUint },

    #[error("Internal consistency violated: {0}")]
    InternalConsistency(String),

    #[error("Shape index {0} requires operators, but none are registered")]
    UnknownPrimitives(u64),

    #[error("Malformed shape '{shape}': {reason}")]
    MalformedShape { shape: String, reason: String },

    #[error("Search space of the first {0} shapes holds no equations")]
    EmptySearchSpace(u64),

    #[error("Got {seeds} per-sample seeds for {samples} samples")]
    SeedCountMismatch { seeds: usize, samples: usize },
}

pub type Result<T> = std::result::Result<T, EnumError>;

impl EnumError {
    pub(crate) fn invalid_index(kind: IndexKind, index: impl Into<BigUint>, bound: impl Into<BigUint>) -> Self {
        EnumError::InvalidIndex {
            kind,
            index: index.into(),
            bound: bound.into(),
        }
    }

    pub(crate) fn malformed(shape: &str, reason: impl Into<String>) -> Self {
        EnumError::MalformedShape {
            shape: shape.to_string(),
            reason: reason.into(),
        }
    }
}
