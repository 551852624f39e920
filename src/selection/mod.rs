//! Selection optimization model.
//!
//! Assembles the criteria-subset MILP from aggregated metrics and the
//! coverage matrix:
//!
//! - **Admissibility gates**: six big-M gates per criterion, each an upper
//!   bound on the selection variable
//! - **Distinctiveness**: pairs at or above δ are mutually exclusive;
//!   joint-selection indicators measure realized redundancy
//! - **Parsimony** and **representativeness** bands as goal-programming
//!   equalities with integer deviations
//! - **Vetoes** for non-monotone and unmapped criteria
//! - **Objectivity ratio** ρ, linearized
//! - A scalarized weighted objective (maximize)
//!
//! The model is handed to any [`MilpSolver`](crate::milp::MilpSolver);
//! [`SubsetSearch`] is an exact reference backend for small pools.
//!
//! # References
//!
//! - Charnes & Cooper (1961), goal programming
//! - Williams (2013), "Model Building in Mathematical Programming", §9 (big-M)

mod builder;
mod config;
mod gate;
mod result;
mod screening;
mod search;

pub use builder::{BandDeviation, DecisionModel, ModelLayout, ObjectiveVars, PairVars};
pub use config::{ModelConfig, ParsimonyBand, Thresholds, Weights, WEIGHT_SUM_TOLERANCE};
pub use result::{Deviation, ObjectiveCoverage, SelectionResult, Termination};
pub use screening::{ScreeningEntry, ScreeningReport};
pub use search::SubsetSearch;
