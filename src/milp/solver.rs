//! MILP solver interface and backend selection.

use super::model::MilpModel;
use super::variables::VarId;
use crate::error::{Result, SelectionError};
use tracing::{debug, warn};

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverStatus {
    /// Proven optimal solution found.
    Optimal,
    /// Feasible (but not necessarily optimal) solution found.
    Feasible,
    /// No feasible solution exists.
    Infeasible,
    /// Model is invalid or malformed.
    ModelInvalid,
    /// Solver exceeded its time limit without a usable incumbent.
    Timeout,
    /// No solution found for unknown reasons.
    Unknown,
}

/// Solution returned by a MILP backend.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MilpSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Objective function value (if a solution was found).
    pub objective_value: Option<f64>,
    /// Value of every variable, indexed by [`VarId`]. Empty when no
    /// solution was found.
    pub values: Vec<f64>,
    /// Solve time in milliseconds.
    pub solve_time_ms: u64,
}

impl MilpSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: Vec::new(),
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        matches!(self.status, SolverStatus::Optimal | SolverStatus::Feasible)
            && !self.values.is_empty()
    }

    /// Value assigned to `var`, if any.
    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.get(var.index()).copied()
    }
}

/// What to return when the time limit expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeoutFallback {
    /// Return the best feasible assignment found so far as `Feasible`.
    #[default]
    BestIncumbent,
    /// Discard any incumbent and report `Timeout`.
    Fail,
}

/// Solver configuration.
///
/// ```
/// use u_criteria::milp::{SolverConfig, TimeoutFallback};
///
/// let config = SolverConfig::default()
///     .with_time_limit_ms(5_000)
///     .with_fallback(TimeoutFallback::Fail);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Wall-clock limit in milliseconds. `None` disables the deadline.
    pub time_limit_ms: Option<u64>,
    /// Behaviour when the deadline expires.
    pub fallback: TimeoutFallback,
    /// Absolute tolerance for bounds, integrality and constraints.
    pub feasibility_tolerance: f64,
    /// Largest number of free binary decisions an enumerating backend
    /// will branch over (2^n candidates).
    pub max_branching: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: Some(60_000),
            fallback: TimeoutFallback::default(),
            feasibility_tolerance: 1e-6,
            max_branching: 24,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn without_time_limit(mut self) -> Self {
        self.time_limit_ms = None;
        self
    }

    pub fn with_fallback(mut self, fallback: TimeoutFallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tolerance: f64) -> Self {
        self.feasibility_tolerance = tolerance;
        self
    }

    pub fn with_max_branching(mut self, n: usize) -> Self {
        self.max_branching = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.feasibility_tolerance > 0.0 && self.feasibility_tolerance < 1.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "feasibility_tolerance must be in (0, 1), got {}",
                self.feasibility_tolerance
            )));
        }
        if self.max_branching >= 64 {
            return Err(SelectionError::InvalidConfig(format!(
                "max_branching must be below 64, got {}",
                self.max_branching
            )));
        }
        Ok(())
    }
}

/// Trait for MILP backend implementations.
///
/// Implementors wrap an exact or heuristic solver (CBC, HiGHS, GLPK, or a
/// custom search). The model is read-only; a backend returns an
/// assignment for every variable plus a termination status.
pub trait MilpSolver {
    /// Backend name, used in logs.
    fn name(&self) -> &str;

    /// Whether the backend can run in this environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Solves the model and returns a solution.
    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> MilpSolution;
}

/// Picks the first available backend, in preference order.
///
/// An empty list, or a list with no available backend, is a fatal
/// configuration error.
pub fn select_backend<'a>(candidates: &[&'a dyn MilpSolver]) -> Result<&'a dyn MilpSolver> {
    for &backend in candidates {
        if backend.is_available() {
            debug!(backend = backend.name(), "selected MILP backend");
            return Ok(backend);
        }
        debug!(backend = backend.name(), "MILP backend unavailable");
    }
    warn!(candidates = candidates.len(), "no MILP backend available");
    Err(SelectionError::NoSolverBackend)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend {
        name: &'static str,
        available: bool,
    }

    impl MilpSolver for FixedBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn solve(&self, _model: &MilpModel, _config: &SolverConfig) -> MilpSolution {
            MilpSolution::empty(SolverStatus::Unknown)
        }
    }

    #[test]
    fn test_select_first_available() {
        let cbc = FixedBackend { name: "cbc", available: false };
        let highs = FixedBackend { name: "highs", available: true };
        let glpk = FixedBackend { name: "glpk", available: true };

        let chosen = select_backend(&[&cbc, &highs, &glpk]).unwrap();
        assert_eq!(chosen.name(), "highs");
    }

    #[test]
    fn test_no_backend() {
        let cbc = FixedBackend { name: "cbc", available: false };
        assert_eq!(
            select_backend(&[&cbc]).err(),
            Some(SelectionError::NoSolverBackend)
        );
        assert_eq!(
            select_backend(&[]).err(),
            Some(SelectionError::NoSolverBackend)
        );
    }

    #[test]
    fn test_empty_solution() {
        let solution = MilpSolution::empty(SolverStatus::Infeasible);
        assert!(!solution.is_solution_found());
        assert_eq!(solution.value(VarId(0)), None);
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.time_limit_ms, Some(60_000));
        assert_eq!(config.fallback, TimeoutFallback::BestIncumbent);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_solver_config_invalid() {
        assert!(SolverConfig::default()
            .with_feasibility_tolerance(0.0)
            .validate()
            .is_err());
        assert!(SolverConfig::default().with_max_branching(64).validate().is_err());
    }
}
