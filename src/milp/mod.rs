//! Mixed-Integer Linear Programming (MILP) modeling layer.
//!
//! Provides a domain-agnostic model for expressing linear optimization
//! problems over binary, integer and continuous variables.
//!
//! # Key Components
//!
//! - **Variables**: [`Variable`], [`VarId`], [`VarKind`]
//! - **Constraints**: [`Constraint`] over a [`LinearExpr`]
//! - **Model**: [`MilpModel`], container for variables, constraints, objective
//! - **Solver**: [`MilpSolver`] trait, interface for backend implementations
//!
//! # Design
//!
//! This module defines the modeling layer only. It does NOT include a
//! branch-and-bound engine. The [`MilpSolver`] trait allows plugging in
//! external solvers, and [`MilpModel::to_lp_format`] renders the model for
//! solvers that run out of process.
//!
//! # References
//!
//! Wolsey (1998), "Integer Programming"

mod lp_format;
mod model;
mod solver;
mod variables;

pub use model::{Constraint, LinearExpr, MilpModel, Objective, ObjectiveSense, Sense};
pub use solver::{
    select_backend, MilpSolution, MilpSolver, SolverConfig, SolverStatus, TimeoutFallback,
};
pub use variables::{VarId, VarKind, Variable};
