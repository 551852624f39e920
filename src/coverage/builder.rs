//! Consolidation of per-expert criterion → objective assignments.

use crate::aggregation::{CapturedInputs, ObjectiveSpec};
use crate::error::{Result, SelectionError};
use tracing::debug;

/// An objective with its band and consolidated coverage.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    pub id: String,
    pub name: String,
    /// Target band lower bound (L).
    pub lower: u32,
    /// Target band upper bound (U).
    pub upper: u32,
    /// Number of criteria mapped to this objective after consolidation.
    pub target_coverage: u32,
    /// `max(1, target_coverage - upper)`, used to normalize band deviations.
    pub deficit_bound: u32,
}

/// Consolidated criterion × objective matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageMatrix {
    /// `rows[i][o]`: criterion `i` is mapped to objective `o`.
    pub rows: Vec<Vec<bool>>,
    pub objectives: Vec<Objective>,
}

impl CoverageMatrix {
    /// Builds a matrix from an already consolidated assignment.
    ///
    /// Target coverage and deficit bounds are derived from `rows`.
    pub fn from_consolidated(rows: Vec<Vec<bool>>, specs: &[ObjectiveSpec]) -> Result<Self> {
        check_specs(specs)?;
        if rows.is_empty() {
            return Err(SelectionError::EmptyCriteria);
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != specs.len() {
                return Err(SelectionError::DimensionMismatch(format!(
                    "coverage row {i} has {} columns, expected {}",
                    row.len(),
                    specs.len()
                )));
            }
        }
        let objectives = specs
            .iter()
            .enumerate()
            .map(|(o, spec)| {
                let target = rows.iter().filter(|row| row[o]).count() as u32;
                Objective {
                    id: spec.id.clone(),
                    name: spec.name.clone(),
                    lower: spec.lower,
                    upper: spec.upper,
                    target_coverage: target,
                    deficit_bound: deficit_bound(target, spec.upper),
                }
            })
            .collect();
        Ok(Self { rows, objectives })
    }

    pub fn criterion_count(&self) -> usize {
        self.rows.len()
    }

    pub fn objective_count(&self) -> usize {
        self.objectives.len()
    }

    /// Whether criterion `criterion` is mapped to objective `objective`.
    pub fn is_assigned(&self, criterion: usize, objective: usize) -> bool {
        self.rows
            .get(criterion)
            .and_then(|row| row.get(objective))
            .copied()
            .unwrap_or(false)
    }

    /// Whether the criterion is mapped to at least one objective.
    ///
    /// Unmapped criteria can never be selected.
    pub fn representativeness_flag(&self, criterion: usize) -> bool {
        self.rows
            .get(criterion)
            .is_some_and(|row| row.iter().any(|&a| a))
    }

    /// Indices of criteria mapped to `objective`.
    pub fn members(&self, objective: usize) -> Vec<usize> {
        (0..self.rows.len())
            .filter(|&i| self.is_assigned(i, objective))
            .collect()
    }
}

/// Majority-vote consolidation of expert assignment matrices.
pub struct CoverageBuilder<'a> {
    votes: Vec<&'a [Vec<bool>]>,
    criteria: usize,
    objectives: &'a [ObjectiveSpec],
}

impl<'a> CoverageBuilder<'a> {
    /// Creates a builder from raw per-expert assignment matrices.
    ///
    /// Each matrix must be `criteria × objectives.len()`.
    pub fn new(
        votes: Vec<&'a [Vec<bool>]>,
        criteria: usize,
        objectives: &'a [ObjectiveSpec],
    ) -> Result<Self> {
        check_specs(objectives)?;
        if criteria == 0 {
            return Err(SelectionError::EmptyCriteria);
        }
        for (e, matrix) in votes.iter().enumerate() {
            if matrix.len() != criteria || matrix.iter().any(|r| r.len() != objectives.len()) {
                return Err(SelectionError::DimensionMismatch(format!(
                    "expert {} assignment matrix is not {criteria}x{}",
                    e + 1,
                    objectives.len()
                )));
            }
        }
        Ok(Self {
            votes,
            criteria,
            objectives,
        })
    }

    /// Creates a builder from captured inputs.
    pub fn from_inputs(inputs: &'a CapturedInputs) -> Result<Self> {
        let votes = inputs
            .experts
            .iter()
            .map(|e| e.assignments.as_slice())
            .collect();
        Self::new(votes, inputs.criteria.len(), &inputs.objectives)
    }

    /// Majority (> half) of experts map `criterion` to `objective`.
    pub fn assignment_vote(&self, criterion: usize, objective: usize) -> bool {
        let yes = self
            .votes
            .iter()
            .filter(|m| {
                m.get(criterion)
                    .and_then(|row| row.get(objective))
                    .copied()
                    .unwrap_or(false)
            })
            .count();
        2 * yes > self.votes.len()
    }

    /// The consolidated row of `criterion` has at least one objective.
    pub fn representativeness_flag(&self, criterion: usize) -> bool {
        (0..self.objectives.len()).any(|o| self.assignment_vote(criterion, o))
    }

    /// Consolidated number of criteria mapped to `objective`.
    pub fn target_coverage(&self, objective: usize) -> u32 {
        (0..self.criteria)
            .filter(|&i| self.assignment_vote(i, objective))
            .count() as u32
    }

    /// `max(1, target_coverage - U)` for `objective`.
    pub fn deficit_bound(&self, objective: usize) -> u32 {
        let upper = self.objectives.get(objective).map_or(0, |o| o.upper);
        deficit_bound(self.target_coverage(objective), upper)
    }

    /// Consolidates every cell and derives objective records.
    pub fn build(&self) -> Result<CoverageMatrix> {
        let rows: Vec<Vec<bool>> = (0..self.criteria)
            .map(|i| {
                (0..self.objectives.len())
                    .map(|o| self.assignment_vote(i, o))
                    .collect()
            })
            .collect();
        let matrix = CoverageMatrix::from_consolidated(rows, self.objectives)?;
        let unmapped = (0..self.criteria)
            .filter(|&i| !matrix.representativeness_flag(i))
            .count();
        debug!(
            criteria = self.criteria,
            objectives = self.objectives.len(),
            experts = self.votes.len(),
            unmapped,
            "coverage matrix consolidated"
        );
        Ok(matrix)
    }
}

fn deficit_bound(target: u32, upper: u32) -> u32 {
    target.saturating_sub(upper).max(1)
}

fn check_specs(specs: &[ObjectiveSpec]) -> Result<()> {
    if specs.is_empty() {
        return Err(SelectionError::EmptyObjectives);
    }
    for spec in specs {
        if spec.lower > spec.upper {
            return Err(SelectionError::InvalidConfig(format!(
                "objective {}: band lower {} exceeds upper {}",
                spec.id, spec.lower, spec.upper
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ObjectiveSpec> {
        vec![
            ObjectiveSpec::new("O1", "Cost", 1, 1),
            ObjectiveSpec::new("O2", "Safety", 1, 2),
        ]
    }

    fn expert_matrices() -> Vec<Vec<Vec<bool>>> {
        vec![
            vec![vec![true, false], vec![true, false], vec![false, true], vec![false, false]],
            vec![vec![true, false], vec![false, true], vec![false, true], vec![false, false]],
            vec![vec![true, false], vec![true, false], vec![false, false], vec![true, false]],
        ]
    }

    #[test]
    fn test_assignment_vote_majority() {
        let specs = specs();
        let m = expert_matrices();
        let builder =
            CoverageBuilder::new(m.iter().map(|x| x.as_slice()).collect(), 4, &specs).unwrap();
        assert!(builder.assignment_vote(0, 0)); // 3/3
        assert!(builder.assignment_vote(1, 0)); // 2/3
        assert!(!builder.assignment_vote(1, 1)); // 1/3
        assert!(builder.assignment_vote(2, 1)); // 2/3
        assert!(!builder.assignment_vote(3, 0)); // 1/3
    }

    #[test]
    fn test_flags_and_targets() {
        let specs = specs();
        let m = expert_matrices();
        let builder =
            CoverageBuilder::new(m.iter().map(|x| x.as_slice()).collect(), 4, &specs).unwrap();
        assert!(builder.representativeness_flag(0));
        assert!(!builder.representativeness_flag(3));
        assert_eq!(builder.target_coverage(0), 2);
        assert_eq!(builder.target_coverage(1), 1);
        // 2 - 1 = 1; 1 - 2 saturates to 0 -> floor 1.
        assert_eq!(builder.deficit_bound(0), 1);
        assert_eq!(builder.deficit_bound(1), 1);
    }

    #[test]
    fn test_build_matrix() {
        let specs = specs();
        let m = expert_matrices();
        let builder =
            CoverageBuilder::new(m.iter().map(|x| x.as_slice()).collect(), 4, &specs).unwrap();
        let matrix = builder.build().unwrap();
        assert_eq!(matrix.criterion_count(), 4);
        assert_eq!(matrix.objective_count(), 2);
        assert_eq!(matrix.members(0), vec![0, 1]);
        assert_eq!(matrix.members(1), vec![2]);
        assert_eq!(matrix.objectives[0].target_coverage, 2);
        assert!(!matrix.representativeness_flag(3));
    }

    #[test]
    fn test_deficit_bound_above_band() {
        let specs = vec![ObjectiveSpec::new("O1", "Cost", 1, 1)];
        let rows = vec![vec![true]; 4];
        let matrix = CoverageMatrix::from_consolidated(rows, &specs).unwrap();
        assert_eq!(matrix.objectives[0].target_coverage, 4);
        assert_eq!(matrix.objectives[0].deficit_bound, 3);
    }

    #[test]
    fn test_exact_half_vote_rejects() {
        let specs = vec![ObjectiveSpec::new("O1", "Cost", 1, 1)];
        let a = vec![vec![true]];
        let b = vec![vec![false]];
        let builder = CoverageBuilder::new(vec![a.as_slice(), b.as_slice()], 1, &specs).unwrap();
        assert!(!builder.assignment_vote(0, 0));
        assert!(!builder.representativeness_flag(0));
    }

    #[test]
    fn test_invalid_band_and_shapes() {
        let bad = vec![ObjectiveSpec::new("O1", "Cost", 3, 1)];
        assert!(CoverageMatrix::from_consolidated(vec![vec![true]], &bad).is_err());

        let specs = specs();
        assert!(matches!(
            CoverageMatrix::from_consolidated(vec![vec![true]], &specs),
            Err(SelectionError::DimensionMismatch(_))
        ));
        assert_eq!(
            CoverageMatrix::from_consolidated(vec![vec![true]], &[]),
            Err(SelectionError::EmptyObjectives)
        );
    }
}
