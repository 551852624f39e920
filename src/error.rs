//! Error types for criteria selection.
//!
//! Only structurally invalid inputs and missing solver backends are errors.
//! Infeasible data is never an error here: it surfaces as a solver status.

use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    /// No candidate criteria were supplied.
    #[error("criterion set is empty")]
    EmptyCriteria,

    /// No objectives were supplied.
    #[error("objective set is empty")]
    EmptyObjectives,

    /// Two criteria share the same id.
    #[error("duplicate criterion id: {0}")]
    DuplicateCriterion(String),

    /// A pair references a criterion id that does not exist.
    #[error("unknown criterion id: {0}")]
    UnknownCriterion(String),

    /// Pair set is incomplete, duplicated, or carries an invalid correlation.
    #[error("invalid pair set: {0}")]
    InvalidPairs(String),

    /// Input vectors or matrices disagree with the declared dimensions.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Thresholds, bands, weights or solver settings are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The assembled MILP model is malformed.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// No capable MILP backend is available.
    #[error("no MILP solver backend available")]
    NoSolverBackend,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SelectionError>;
