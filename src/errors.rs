//! Error types for the rasp pipeline.

use std::fmt;

/// Errors surfaced by batch construction, the primitives, and the
/// generation driver.
#[derive(Debug, Clone)]
pub enum RaspError {
    /// Two grids that must share a shape do not.
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    /// A batch was built from rows of unequal length.
    RaggedBatch {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// A token role table is empty or self-contradictory.
    InvalidRoles(String),
    /// A prompt does not have the marker / inputs / trigger shape.
    MalformedPrompt(String),
    /// Generation ran out of budget before emitting an end-marker.
    StepLimitExceeded { max_steps: usize },
    /// A finished sequence failed the equivalence check.
    PostconditionViolation(String),
}

impl fmt::Display for RaspError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { expected, got } => write!(
                f,
                "ShapeMismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, got.0, got.1
            ),
            Self::RaggedBatch { row, expected, got } => write!(
                f,
                "RaggedBatch: row {row} has length {got}, expected {expected}"
            ),
            Self::InvalidRoles(msg) => write!(f, "InvalidRoles: {msg}"),
            Self::MalformedPrompt(msg) => write!(f, "MalformedPrompt: {msg}"),
            Self::StepLimitExceeded { max_steps } => write!(
                f,
                "StepLimitExceeded: no end-marker within {max_steps} steps"
            ),
            Self::PostconditionViolation(msg) => {
                write!(f, "PostconditionViolation: {msg}")
            }
        }
    }
}

impl std::error::Error for RaspError {}

pub type Result<T> = std::result::Result<T, RaspError>;
