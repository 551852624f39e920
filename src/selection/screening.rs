//! Pre-solve eligibility screening.

use super::config::Thresholds;
use crate::aggregation::{AggregatedMetrics, Metric};
use crate::coverage::CoverageMatrix;
use crate::error::{Result, SelectionError};

/// Gate and veto outcome for one criterion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreeningEntry {
    pub id: String,
    /// Whether each metric meets its threshold, in [`Metric::ALL`] order.
    pub gates: [bool; 6],
    /// Monotonicity unanimity.
    pub monotone: bool,
    /// Mapped to at least one objective.
    pub representative: bool,
}

impl ScreeningEntry {
    /// Whether the criterion passes its gate for `metric`.
    pub fn passes(&self, metric: Metric) -> bool {
        self.gates[metric.index()]
    }

    /// Metrics whose threshold the criterion misses.
    pub fn failed_gates(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| !self.passes(*m))
            .collect()
    }

    /// All six gates pass and neither veto applies.
    pub fn is_eligible(&self) -> bool {
        self.gates.iter().all(|&g| g) && self.monotone && self.representative
    }
}

/// Which criteria can be selected at all, and why not.
///
/// Eligibility is independent of weights, pair exclusions and bands: a
/// criterion that fails screening has `x = 0` in every feasible solution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScreeningReport {
    pub entries: Vec<ScreeningEntry>,
}

impl ScreeningReport {
    /// Screens every criterion against `thresholds` and the coverage vetoes.
    pub fn evaluate(
        metrics: &AggregatedMetrics,
        coverage: &CoverageMatrix,
        thresholds: &Thresholds,
    ) -> Result<Self> {
        if metrics.criteria.len() != coverage.criterion_count() {
            return Err(SelectionError::DimensionMismatch(format!(
                "{} criteria but {} coverage rows",
                metrics.criteria.len(),
                coverage.criterion_count()
            )));
        }
        let entries = metrics
            .criteria
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let mut gates = [false; 6];
                for metric in Metric::ALL {
                    gates[metric.index()] =
                        c.scores.get(metric) >= thresholds.for_metric(metric, c.objective);
                }
                ScreeningEntry {
                    id: c.id.clone(),
                    gates,
                    monotone: c.monotone,
                    representative: coverage.representativeness_flag(i),
                }
            })
            .collect();
        Ok(Self { entries })
    }

    /// Ids of criteria that pass every gate and veto.
    pub fn eligible_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.is_eligible())
            .map(|e| e.id.as_str())
            .collect()
    }

    pub fn eligible_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_eligible()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{Criterion, Direction, ObjectiveSpec, PropertyScores};

    fn criterion(id: &str, completeness: f64, objective: bool, monotone: bool) -> Criterion {
        Criterion {
            id: id.into(),
            name: id.into(),
            direction: Direction::Benefit,
            scores: PropertyScores {
                completeness,
                measurability: 6.0,
                sensitivity: 0.2,
                cost_effectiveness: 8.0,
                alignment: 7.0,
                cognitive_coherence: 8.0,
            },
            objective,
            monotone,
        }
    }

    #[test]
    fn test_screening_gates_and_vetoes() {
        let metrics = AggregatedMetrics {
            criteria: vec![
                criterion("A", 8.0, false, true),
                criterion("B", 5.0, false, true),
                criterion("C", 8.0, true, true),
                criterion("D", 8.0, false, false),
                criterion("E", 8.0, false, true),
            ],
            pairs: vec![],
        };
        let specs = vec![ObjectiveSpec::new("O1", "Cost", 1, 3)];
        let rows = vec![vec![true], vec![true], vec![true], vec![true], vec![false]];
        let coverage = CoverageMatrix::from_consolidated(rows, &specs).unwrap();

        let report =
            ScreeningReport::evaluate(&metrics, &coverage, &Thresholds::default()).unwrap();
        assert!(report.entries[0].is_eligible());
        assert_eq!(report.entries[1].failed_gates(), vec![Metric::Completeness]);
        // Measurability 6.0 misses the objective threshold 6.5 only.
        assert_eq!(report.entries[2].failed_gates(), vec![Metric::Measurability]);
        assert!(!report.entries[3].is_eligible());
        assert!(report.entries[3].failed_gates().is_empty());
        assert!(!report.entries[4].representative);
        assert_eq!(report.eligible_ids(), vec!["A"]);
        assert_eq!(report.eligible_count(), 1);
    }

    #[test]
    fn test_screening_row_mismatch() {
        let metrics = AggregatedMetrics {
            criteria: vec![criterion("A", 8.0, false, true)],
            pairs: vec![],
        };
        let specs = vec![ObjectiveSpec::new("O1", "Cost", 1, 1)];
        let coverage =
            CoverageMatrix::from_consolidated(vec![vec![true], vec![true]], &specs).unwrap();
        assert!(matches!(
            ScreeningReport::evaluate(&metrics, &coverage, &Thresholds::default()),
            Err(SelectionError::DimensionMismatch(_))
        ));
    }
}
