//! Selection results extracted from a solver assignment.

use super::builder::{BandDeviation, DecisionModel};
use crate::error::{Result, SelectionError};
use crate::milp::{MilpSolution, SolverStatus, VarId};

/// How the solve ended, as seen by the caller.
///
/// Anything but `Optimal` is a terminal state: the caller relaxes
/// thresholds or bands and rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Termination {
    Optimal,
    Infeasible,
    /// Timeout, incumbent-only, invalid model or unknown.
    Other(SolverStatus),
}

impl From<SolverStatus> for Termination {
    fn from(status: SolverStatus) -> Self {
        match status {
            SolverStatus::Optimal => Termination::Optimal,
            SolverStatus::Infeasible => Termination::Infeasible,
            other => Termination::Other(other),
        }
    }
}

/// Realized values of one goal-programming deviation pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Deviation {
    /// Shortfall below the target (`d⁻`).
    pub under: u32,
    /// Excess above the target (`d⁺`).
    pub over: u32,
}

/// Realized representativeness of one objective.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveCoverage {
    pub id: String,
    /// Selected criteria mapped to the objective.
    pub selected: u32,
    /// Deviations against `L`.
    pub lower: Deviation,
    /// Deviations against `U`.
    pub upper: Deviation,
}

/// Outcome of one selection run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionResult {
    pub termination: Termination,
    /// Raw backend status.
    pub status: SolverStatus,
    /// `x[i]` per criterion; all false when no assignment was returned.
    pub selected: Vec<bool>,
    pub selected_ids: Vec<String>,
    /// Realized objectivity ratio ρ.
    pub objectivity_ratio: f64,
    /// `N`
    pub selected_count: u32,
    /// Deviations against ω.
    pub parsimony_lower: Deviation,
    /// Deviations against ζ.
    pub parsimony_upper: Deviation,
    pub objectives: Vec<ObjectiveCoverage>,
    pub objective_value: Option<f64>,
    pub solve_time_ms: u64,
}

impl SelectionResult {
    /// Reads the assignment of `solution` through the model's layout.
    ///
    /// A solution without an assignment yields an empty selection; an
    /// assignment of the wrong length is an error.
    pub fn from_solution(model: &DecisionModel, solution: &MilpSolution) -> Result<Self> {
        let layout = model.layout();
        let termination = Termination::from(solution.status);

        if !solution.is_solution_found() {
            return Ok(Self {
                termination,
                status: solution.status,
                selected: vec![false; layout.select.len()],
                selected_ids: Vec::new(),
                objectivity_ratio: 0.0,
                selected_count: 0,
                parsimony_lower: Deviation::default(),
                parsimony_upper: Deviation::default(),
                objectives: Vec::new(),
                objective_value: None,
                solve_time_ms: solution.solve_time_ms,
            });
        }
        if solution.values.len() != layout.variable_count {
            return Err(SelectionError::DimensionMismatch(format!(
                "solver returned {} values for {} variables",
                solution.values.len(),
                layout.variable_count
            )));
        }

        let values = &solution.values;
        let selected: Vec<bool> = layout.select.iter().map(|&x| binary(values, x)).collect();
        let selected_ids = layout
            .ids
            .iter()
            .zip(&selected)
            .filter(|&(_, &s)| s)
            .map(|(id, _)| id.clone())
            .collect();
        let objectives = layout
            .objectives
            .iter()
            .map(|o| ObjectiveCoverage {
                id: o.id.clone(),
                selected: o.members.iter().filter(|&&i| selected[i]).count() as u32,
                lower: deviation(values, &o.lower),
                upper: deviation(values, &o.upper),
            })
            .collect();

        Ok(Self {
            termination,
            status: solution.status,
            selected_ids,
            objectivity_ratio: value(values, layout.objectivity_ratio),
            selected_count: integer(values, layout.selected_count),
            parsimony_lower: deviation(values, &layout.parsimony_lower),
            parsimony_upper: deviation(values, &layout.parsimony_upper),
            objectives,
            objective_value: solution.objective_value,
            solve_time_ms: solution.solve_time_ms,
            selected,
        })
    }

    pub fn is_optimal(&self) -> bool {
        self.termination == Termination::Optimal
    }

    /// Whether the result carries an assignment (optimal or incumbent).
    pub fn has_assignment(&self) -> bool {
        self.objective_value.is_some()
    }

    /// Whether criterion `id` was selected.
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected_ids.iter().any(|s| s == id)
    }
}

fn value(values: &[f64], var: VarId) -> f64 {
    values.get(var.index()).copied().unwrap_or(0.0)
}

fn binary(values: &[f64], var: VarId) -> bool {
    value(values, var) > 0.5
}

fn integer(values: &[f64], var: VarId) -> u32 {
    value(values, var).round().max(0.0) as u32
}

fn deviation(values: &[f64], band: &BandDeviation) -> Deviation {
    Deviation {
        under: integer(values, band.under),
        over: integer(values, band.over),
    }
}
