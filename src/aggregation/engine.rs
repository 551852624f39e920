//! Aggregation of raw expert judgments into per-criterion metrics.

use super::correlation::pooled_correlation;
use super::metrics::{AggregatedMetrics, Criterion, Pair, PropertyScores};
use super::sensitivity::{estimate_elasticity, SensitivityConfig};
use super::stats::{majority, median, neutral, unanimous};
use super::types::{CapturedInputs, RatedProperty, VoteProperty};
use crate::error::Result;
use tracing::{debug, info};

/// Turns one [`CapturedInputs`] into [`AggregatedMetrics`].
///
/// The engine borrows the inputs and never mutates them; every operation
/// is a pure function of the captured judgments.
///
/// # Examples
///
/// ```ignore
/// let engine = AggregationEngine::new(&inputs, SensitivityConfig::default())?;
/// let completeness = engine.median_score(RatedProperty::Completeness, 0);
/// let metrics = engine.aggregate()?;
/// ```
pub struct AggregationEngine<'a> {
    inputs: &'a CapturedInputs,
    sensitivity: SensitivityConfig,
    /// Decision matrices with blanks replaced by 0.
    matrices: Vec<Vec<Vec<f64>>>,
}

impl<'a> AggregationEngine<'a> {
    /// Creates an engine after checking the shape of the inputs.
    pub fn new(inputs: &'a CapturedInputs, sensitivity: SensitivityConfig) -> Result<Self> {
        inputs.validate()?;
        sensitivity.validate()?;
        let matrices = inputs
            .experts
            .iter()
            .map(|e| {
                e.decision_matrix
                    .iter()
                    .map(|row| row.iter().map(|v| neutral(*v)).collect())
                    .collect()
            })
            .collect();
        Ok(Self {
            inputs,
            sensitivity,
            matrices,
        })
    }

    /// Median expert rating of `property` for criterion `criterion`.
    pub fn median_score(&self, property: RatedProperty, criterion: usize) -> f64 {
        let ratings: Vec<f64> = self
            .inputs
            .experts
            .iter()
            .map(|e| neutral(e.ratings(property).get(criterion).copied().flatten()))
            .collect();
        median(&ratings)
    }

    /// Strict-majority classification of `property` for `criterion`.
    pub fn majority_class(&self, property: VoteProperty, criterion: usize) -> bool {
        majority(&self.votes(property, criterion))
    }

    /// Whether every expert judged `criterion` monotone.
    pub fn monotonicity_unanimity(&self, criterion: usize) -> bool {
        unanimous(&self.votes(VoteProperty::Monotonicity, criterion))
    }

    /// Median over experts of the absolute correlation of columns `i` and `k`.
    pub fn pooled_correlation(&self, i: usize, k: usize) -> f64 {
        pooled_correlation(&self.matrices, i, k)
    }

    /// Monte Carlo elasticity of every criterion.
    pub fn sensitivity_elasticity(&self) -> Result<Vec<f64>> {
        estimate_elasticity(&self.matrices, &self.inputs.directions(), &self.sensitivity)
    }

    /// Runs every aggregation and assembles the result.
    pub fn aggregate(&self) -> Result<AggregatedMetrics> {
        let specs = &self.inputs.criteria;
        let elasticity = self.sensitivity_elasticity()?;

        let criteria: Vec<Criterion> = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| Criterion {
                id: spec.id.clone(),
                name: spec.name.clone(),
                direction: spec.direction,
                scores: PropertyScores {
                    completeness: self.median_score(RatedProperty::Completeness, i),
                    measurability: self.median_score(RatedProperty::Measurability, i),
                    sensitivity: elasticity[i],
                    cost_effectiveness: self.median_score(RatedProperty::CostEffectiveness, i),
                    alignment: self.median_score(RatedProperty::Alignment, i),
                    cognitive_coherence: self.median_score(RatedProperty::CognitiveCoherence, i),
                },
                objective: self.majority_class(VoteProperty::Objectivity, i),
                monotone: self.monotonicity_unanimity(i),
            })
            .collect();

        let mut pairs = Vec::with_capacity(specs.len() * specs.len().saturating_sub(1) / 2);
        for i in 0..specs.len() {
            for k in (i + 1)..specs.len() {
                pairs.push(Pair::new(
                    specs[i].id.clone(),
                    specs[k].id.clone(),
                    self.pooled_correlation(i, k),
                ));
            }
        }

        for c in &criteria {
            debug!(
                id = %c.id,
                completeness = c.scores.completeness,
                sensitivity = c.scores.sensitivity,
                objective = c.objective,
                monotone = c.monotone,
                "criterion aggregated"
            );
        }
        info!(
            criteria = criteria.len(),
            pairs = pairs.len(),
            experts = self.inputs.experts.len(),
            "aggregation complete"
        );
        Ok(AggregatedMetrics { criteria, pairs })
    }

    fn votes(&self, property: VoteProperty, criterion: usize) -> Vec<Option<bool>> {
        self.inputs
            .experts
            .iter()
            .map(|e| e.votes(property).get(criterion).copied().flatten())
            .collect()
    }
}
