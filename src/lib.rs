//! Multi-expert criteria subset selection.
//!
//! Selects an optimal subset of decision criteria from a candidate pool,
//! given expert assessments across nine quality dimensions (completeness,
//! objectivity, measurability, distinctiveness, parsimony, sensitivity,
//! cost-effectiveness, alignment, cognitive coherence) plus monotonicity
//! and representativeness constraints.
//!
//! - **Aggregation**: median scores, majority votes, pooled pairwise
//!   correlations, and Monte Carlo sensitivity elasticity.
//! - **Coverage**: majority-vote criterion → objective consolidation,
//!   representativeness vetoes and per-objective target coverage.
//! - **Selection**: assembly of a mixed-integer linear program with
//!   big-M admissibility gates, distinctiveness exclusion and
//!   goal-programming bands, plus result extraction.
//! - **MILP**: a solver-agnostic modeling layer, LP-format export and the
//!   [`milp::MilpSolver`] backend trait.
//! - **Pipeline**: the stages chained as immutable value objects.
//!
//! # Architecture
//!
//! This crate builds the optimization model; it is not a general MILP
//! solver. External solvers plug in through [`milp::MilpSolver`] or read
//! [`milp::MilpModel::to_lp_format`] output. [`selection::SubsetSearch`]
//! solves small candidate pools exactly.

pub mod aggregation;
pub mod coverage;
pub mod error;
pub mod milp;
pub mod pipeline;
pub mod selection;

pub use error::{Result, SelectionError};
pub use pipeline::{Backend, PipelineConfig, SelectionOutcome, SelectionPipeline};
