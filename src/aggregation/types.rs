//! Raw multi-expert judgments as captured upstream.

use crate::error::{Result, SelectionError};
use std::collections::HashSet;
use std::str::FromStr;

/// Whether larger raw values of a criterion are better or worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Larger is better.
    #[default]
    Benefit,
    /// Smaller is better.
    Cost,
}

impl FromStr for Direction {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "benefit" => Ok(Direction::Benefit),
            "cost" => Ok(Direction::Cost),
            other => Err(SelectionError::InvalidConfig(format!(
                "unknown criterion type: {other:?} (expected Cost or Benefit)"
            ))),
        }
    }
}

/// Rated properties aggregated by median.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RatedProperty {
    Completeness,
    Measurability,
    CostEffectiveness,
    Alignment,
    CognitiveCoherence,
}

impl RatedProperty {
    /// All rated properties, in capture order.
    pub const ALL: [RatedProperty; 5] = [
        RatedProperty::Completeness,
        RatedProperty::Measurability,
        RatedProperty::CostEffectiveness,
        RatedProperty::Alignment,
        RatedProperty::CognitiveCoherence,
    ];
}

/// Binary properties aggregated by vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VoteProperty {
    /// Objective (1) vs. subjective (0).
    Objectivity,
    /// Monotone preference direction.
    Monotonicity,
}

/// Identity of a candidate criterion.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriterionSpec {
    pub id: String,
    pub name: String,
    pub direction: Direction,
}

impl CriterionSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, direction: Direction) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            direction,
        }
    }
}

/// An objective with its target coverage band `[lower, upper]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveSpec {
    pub id: String,
    pub name: String,
    /// Minimum number of selected criteria mapped to this objective (L).
    pub lower: u32,
    /// Maximum number of selected criteria mapped to this objective (U).
    pub upper: u32,
}

impl ObjectiveSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lower: u32, upper: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lower,
            upper,
        }
    }
}

/// One expert's complete set of judgments.
///
/// Per-criterion vectors are indexed like [`CapturedInputs::criteria`].
/// `None` marks a blank cell; aggregation treats it as 0 / "no".
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpertAssessment {
    pub completeness: Vec<Option<f64>>,
    pub measurability: Vec<Option<f64>>,
    pub cost_effectiveness: Vec<Option<f64>>,
    pub alignment: Vec<Option<f64>>,
    pub cognitive_coherence: Vec<Option<f64>>,
    pub objectivity: Vec<Option<bool>>,
    pub monotonicity: Vec<Option<bool>>,
    /// Alternative × criterion performance matrix.
    pub decision_matrix: Vec<Vec<Option<f64>>>,
    /// Criterion × objective assignment matrix.
    pub assignments: Vec<Vec<bool>>,
}

impl ExpertAssessment {
    /// Ratings for one property.
    pub fn ratings(&self, property: RatedProperty) -> &[Option<f64>] {
        match property {
            RatedProperty::Completeness => &self.completeness,
            RatedProperty::Measurability => &self.measurability,
            RatedProperty::CostEffectiveness => &self.cost_effectiveness,
            RatedProperty::Alignment => &self.alignment,
            RatedProperty::CognitiveCoherence => &self.cognitive_coherence,
        }
    }

    /// Votes for one binary property.
    pub fn votes(&self, property: VoteProperty) -> &[Option<bool>] {
        match property {
            VoteProperty::Objectivity => &self.objectivity,
            VoteProperty::Monotonicity => &self.monotonicity,
        }
    }
}

/// Everything captured from the experts for one selection run.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CapturedInputs {
    pub criteria: Vec<CriterionSpec>,
    pub alternatives: Vec<String>,
    pub objectives: Vec<ObjectiveSpec>,
    pub experts: Vec<ExpertAssessment>,
}

impl CapturedInputs {
    /// Checks that every expert's vectors and matrices match the declared
    /// criteria, alternatives and objectives.
    ///
    /// Blank cells are fine; wrong shapes are not.
    pub fn validate(&self) -> Result<()> {
        let n = self.criteria.len();
        let m = self.objectives.len();
        let a = self.alternatives.len();

        if n == 0 {
            return Err(SelectionError::EmptyCriteria);
        }
        if m == 0 {
            return Err(SelectionError::EmptyObjectives);
        }
        let mut seen = HashSet::with_capacity(n);
        for c in &self.criteria {
            if !seen.insert(c.id.as_str()) {
                return Err(SelectionError::DuplicateCriterion(c.id.clone()));
            }
        }
        if self.experts.is_empty() {
            return Err(SelectionError::InvalidConfig(
                "at least one expert assessment is required".into(),
            ));
        }

        for (e, expert) in self.experts.iter().enumerate() {
            for property in RatedProperty::ALL {
                check_len(expert.ratings(property).len(), n, e, &format!("{property:?}"))?;
            }
            check_len(expert.objectivity.len(), n, e, "objectivity")?;
            check_len(expert.monotonicity.len(), n, e, "monotonicity")?;
            check_len(expert.decision_matrix.len(), a, e, "decision matrix rows")?;
            for row in &expert.decision_matrix {
                check_len(row.len(), n, e, "decision matrix columns")?;
            }
            check_len(expert.assignments.len(), n, e, "assignment rows")?;
            for row in &expert.assignments {
                check_len(row.len(), m, e, "assignment columns")?;
            }
        }
        Ok(())
    }

    /// Criterion directions, in criterion order.
    pub fn directions(&self) -> Vec<Direction> {
        self.criteria.iter().map(|c| c.direction).collect()
    }
}

fn check_len(actual: usize, expected: usize, expert: usize, what: &str) -> Result<()> {
    if actual != expected {
        return Err(SelectionError::DimensionMismatch(format!(
            "expert {}: {what} has {actual} entries, expected {expected}",
            expert + 1
        )));
    }
    Ok(())
}
