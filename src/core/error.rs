use thiserror::Error;

/// Failures raised by the scoring, fusion and clustering core.
///
/// Per-candidate failures (`DimensionMismatch`, `DegenerateVector`) are
/// recovered by the ranking engine; the rest reach the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Degenerate vector: zero norm")]
    DegenerateVector,
    #[error("Division by zero")]
    ZeroDivisor,
    #[error("Insufficient candidates: requested {requested}, only {available} valid")]
    InsufficientCandidates { requested: usize, available: usize },
    #[error("Insufficient samples: k = {k} but only {samples} samples")]
    InsufficientSamples { k: usize, samples: usize },
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Ranking '{0}' is not normalized")]
    Unnormalized(String),
    #[error("Unknown id: {0}")]
    UnknownId(String),
}
