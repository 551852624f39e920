//! Aggregated per-criterion metrics and pooled pair correlations.

use super::types::Direction;
use crate::error::{Result, SelectionError};
use std::collections::HashMap;

/// The six scalar metrics each criterion is gated and rewarded on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    Completeness,
    Measurability,
    Sensitivity,
    CostEffectiveness,
    Alignment,
    CognitiveCoherence,
}

impl Metric {
    /// All metrics, in gate order.
    pub const ALL: [Metric; 6] = [
        Metric::Completeness,
        Metric::Measurability,
        Metric::Sensitivity,
        Metric::CostEffectiveness,
        Metric::Alignment,
        Metric::CognitiveCoherence,
    ];

    /// Short lowercase name, used in variable and constraint names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Completeness => "completeness",
            Metric::Measurability => "measurability",
            Metric::Sensitivity => "sensitivity",
            Metric::CostEffectiveness => "cost_effectiveness",
            Metric::Alignment => "alignment",
            Metric::CognitiveCoherence => "cognitive_coherence",
        }
    }

    /// Position in [`Metric::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Metric::Completeness => 0,
            Metric::Measurability => 1,
            Metric::Sensitivity => 2,
            Metric::CostEffectiveness => 3,
            Metric::Alignment => 4,
            Metric::CognitiveCoherence => 5,
        }
    }
}

/// Aggregated scores of one criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyScores {
    pub completeness: f64,
    pub measurability: f64,
    /// Monte Carlo elasticity, not a rating.
    pub sensitivity: f64,
    pub cost_effectiveness: f64,
    pub alignment: f64,
    pub cognitive_coherence: f64,
}

impl PropertyScores {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Completeness => self.completeness,
            Metric::Measurability => self.measurability,
            Metric::Sensitivity => self.sensitivity,
            Metric::CostEffectiveness => self.cost_effectiveness,
            Metric::Alignment => self.alignment,
            Metric::CognitiveCoherence => self.cognitive_coherence,
        }
    }
}

/// A candidate criterion after aggregation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Criterion {
    pub id: String,
    pub name: String,
    pub direction: Direction,
    pub scores: PropertyScores,
    /// Majority-vote objectivity classification.
    pub objective: bool,
    /// Every expert judged the criterion monotone.
    pub monotone: bool,
}

/// Unordered pair of distinct criteria with a pooled correlation in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

impl Pair {
    pub fn new(first: impl Into<String>, second: impl Into<String>, correlation: f64) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
            correlation,
        }
    }
}

/// A pair resolved to criterion indices, `first < second`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedPair {
    pub first: usize,
    pub second: usize,
    pub correlation: f64,
}

/// Output of the aggregation stage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregatedMetrics {
    pub criteria: Vec<Criterion>,
    pub pairs: Vec<Pair>,
}

impl AggregatedMetrics {
    /// Index of a criterion by id.
    pub fn criterion_index(&self, id: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c.id == id)
    }

    /// Sum of one metric over the whole candidate set.
    pub fn metric_total(&self, metric: Metric) -> f64 {
        self.criteria.iter().map(|c| c.scores.get(metric)).sum()
    }

    /// Resolves pairs to canonical `(i < k)` index order.
    ///
    /// Fails on an empty criterion set, duplicate ids, dangling or
    /// self-referencing pairs, duplicate pairs, correlations outside
    /// `[0, 1]`, and pair sets that do not cover every `i < k`.
    /// The result is sorted by `(first, second)`.
    pub fn indexed_pairs(&self) -> Result<Vec<IndexedPair>> {
        let n = self.criteria.len();
        if n == 0 {
            return Err(SelectionError::EmptyCriteria);
        }
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (i, c) in self.criteria.iter().enumerate() {
            if index.insert(c.id.as_str(), i).is_some() {
                return Err(SelectionError::DuplicateCriterion(c.id.clone()));
            }
        }

        let mut seen = vec![false; n * n];
        let mut out = Vec::with_capacity(self.pairs.len());
        for pair in &self.pairs {
            let a = *index
                .get(pair.first.as_str())
                .ok_or_else(|| SelectionError::UnknownCriterion(pair.first.clone()))?;
            let b = *index
                .get(pair.second.as_str())
                .ok_or_else(|| SelectionError::UnknownCriterion(pair.second.clone()))?;
            if a == b {
                return Err(SelectionError::InvalidPairs(format!(
                    "pair references {} twice",
                    pair.first
                )));
            }
            if !(0.0..=1.0).contains(&pair.correlation) {
                return Err(SelectionError::InvalidPairs(format!(
                    "correlation of ({}, {}) outside [0, 1]: {}",
                    pair.first, pair.second, pair.correlation
                )));
            }
            let (i, k) = if a < b { (a, b) } else { (b, a) };
            if std::mem::replace(&mut seen[i * n + k], true) {
                return Err(SelectionError::InvalidPairs(format!(
                    "duplicate pair ({}, {})",
                    self.criteria[i].id, self.criteria[k].id
                )));
            }
            out.push(IndexedPair {
                first: i,
                second: k,
                correlation: pair.correlation,
            });
        }

        let expected = n * (n - 1) / 2;
        if out.len() != expected {
            return Err(SelectionError::InvalidPairs(format!(
                "{} pairs supplied, expected {expected} for {n} criteria",
                out.len()
            )));
        }
        out.sort_by_key(|p| (p.first, p.second));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criterion(id: &str) -> Criterion {
        Criterion {
            id: id.into(),
            name: id.into(),
            direction: Direction::Benefit,
            scores: PropertyScores {
                completeness: 7.0,
                ..Default::default()
            },
            objective: true,
            monotone: true,
        }
    }

    fn metrics(pairs: Vec<Pair>) -> AggregatedMetrics {
        AggregatedMetrics {
            criteria: vec![criterion("A"), criterion("B"), criterion("C")],
            pairs,
        }
    }

    #[test]
    fn test_metric_index_order() {
        for (i, m) in Metric::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn test_indexed_pairs_canonical() {
        let m = metrics(vec![
            Pair::new("C", "A", 0.2),
            Pair::new("B", "A", 0.9),
            Pair::new("B", "C", 0.1),
        ]);
        let pairs = m.indexed_pairs().unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!((pairs[0].first, pairs[0].second), (0, 1));
        assert!((pairs[0].correlation - 0.9).abs() < 1e-12);
        assert_eq!((pairs[1].first, pairs[1].second), (0, 2));
        assert_eq!((pairs[2].first, pairs[2].second), (1, 2));
        assert!((m.metric_total(Metric::Completeness) - 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_pair_id() {
        let m = metrics(vec![
            Pair::new("A", "Z", 0.2),
            Pair::new("A", "C", 0.2),
            Pair::new("B", "C", 0.2),
        ]);
        assert_eq!(
            m.indexed_pairs(),
            Err(SelectionError::UnknownCriterion("Z".into()))
        );
    }

    #[test]
    fn test_incomplete_and_duplicate_pairs() {
        let m = metrics(vec![Pair::new("A", "B", 0.2)]);
        assert!(matches!(m.indexed_pairs(), Err(SelectionError::InvalidPairs(_))));

        let m = metrics(vec![
            Pair::new("A", "B", 0.2),
            Pair::new("B", "A", 0.2),
            Pair::new("B", "C", 0.2),
        ]);
        assert!(matches!(m.indexed_pairs(), Err(SelectionError::InvalidPairs(_))));
    }

    #[test]
    fn test_correlation_out_of_range() {
        let m = metrics(vec![
            Pair::new("A", "B", 1.2),
            Pair::new("A", "C", 0.2),
            Pair::new("B", "C", 0.2),
        ]);
        assert!(matches!(m.indexed_pairs(), Err(SelectionError::InvalidPairs(_))));
    }

    #[test]
    fn test_single_criterion_has_no_pairs() {
        let m = AggregatedMetrics {
            criteria: vec![criterion("A")],
            pairs: vec![],
        };
        assert!(m.indexed_pairs().unwrap().is_empty());
    }
}
