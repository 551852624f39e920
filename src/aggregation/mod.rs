//! Metric aggregation.
//!
//! Converts raw multi-expert judgments into the scalar and pairwise inputs
//! of the selection model:
//!
//! - **Median scores** for rated properties (completeness, measurability,
//!   cost-effectiveness, alignment, cognitive coherence)
//! - **Majority votes** for objectivity, **unanimity** for monotonicity
//! - **Pooled correlations**: median over experts of absolute Pearson
//!   correlation between decision-matrix columns
//! - **Sensitivity elasticity**: Monte Carlo share of weighted score under
//!   Dirichlet-distributed weights
//!
//! Blank or non-finite judgments are treated as 0 and never raise errors.

mod correlation;
mod engine;
mod metrics;
mod sensitivity;
mod stats;
mod types;

pub use correlation::pooled_correlation;
pub use engine::AggregationEngine;
pub use metrics::{AggregatedMetrics, Criterion, IndexedPair, Metric, Pair, PropertyScores};
pub use sensitivity::{estimate_elasticity, normalize_columns, SensitivityConfig};
pub use stats::{abs_pearson, majority, median, neutral, unanimous};
pub use types::{
    CapturedInputs, CriterionSpec, Direction, ExpertAssessment, ObjectiveSpec, RatedProperty,
    VoteProperty,
};
