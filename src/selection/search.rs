//! Exhaustive reference backend for small candidate pools.

use super::builder::{BandDeviation, DecisionModel, ModelLayout};
use crate::milp::{
    MilpModel, MilpSolution, MilpSolver, SolverConfig, SolverStatus, TimeoutFallback,
};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Enumerates every selection vector over the admissible criteria.
///
/// Auxiliary variables (gates, pair indicators, ρ, `N`, deviations) are
/// completed in closed form with their best values for a given selection,
/// so the search is exact: `Optimal` means no better assignment exists.
/// The cost is `2^k` for `k` admissible criteria; beyond
/// [`SolverConfig::max_branching`] the backend reports `Unknown`.
///
/// The backend is tied to the layout of the model it was created from.
///
/// The deadline is checked once every 1024 candidates, before the
/// candidate is evaluated. A pool with at most 10 admissible criteria is
/// therefore always enumerated in full and reported `Optimal`, whatever
/// [`SolverConfig::time_limit_ms`] says.
///
/// # Limitations
///
/// - Only solves models produced by [`DecisionModel::build`]
/// - Exponential in the number of admissible criteria
#[derive(Debug, Clone)]
pub struct SubsetSearch {
    layout: ModelLayout,
}

impl SubsetSearch {
    pub fn new(model: &DecisionModel) -> Self {
        Self {
            layout: model.layout().clone(),
        }
    }

    /// Fills every variable for the given selection.
    fn complete(&self, selected: &[bool]) -> Vec<f64> {
        let layout = &self.layout;
        let mut values = vec![0.0; layout.variable_count];
        let flag = |b: bool| if b { 1.0 } else { 0.0 };

        for (i, &x) in layout.select.iter().enumerate() {
            values[x.index()] = flag(selected[i]);
            for (g, gate) in layout.gates[i].iter().enumerate() {
                values[gate.index()] = flag(layout.screening.entries[i].gates[g]);
            }
        }
        for p in &layout.pairs {
            values[p.below.index()] = flag(p.below_allowed);
            values[p.joint.index()] = flag(selected[p.first] && selected[p.second]);
        }

        let objective_total = layout.objective_flags.iter().filter(|&&u| u).count();
        if objective_total > 0 {
            let hits = layout
                .objective_flags
                .iter()
                .zip(selected)
                .filter(|&(&u, &x)| u && x)
                .count();
            values[layout.objectivity_ratio.index()] = hits as f64 / objective_total as f64;
        }

        let count = selected.iter().filter(|&&x| x).count() as u32;
        values[layout.selected_count.index()] = f64::from(count);
        fill_deviation(&mut values, &layout.parsimony_lower, count);
        fill_deviation(&mut values, &layout.parsimony_upper, count);

        for o in &layout.objectives {
            let hits = o.members.iter().filter(|&&i| selected[i]).count() as u32;
            fill_deviation(&mut values, &o.lower, hits);
            fill_deviation(&mut values, &o.upper, hits);
        }
        values
    }
}

fn fill_deviation(values: &mut [f64], band: &BandDeviation, count: u32) {
    values[band.under.index()] = f64::from(band.target.saturating_sub(count));
    values[band.over.index()] = f64::from(count.saturating_sub(band.target));
}

impl MilpSolver for SubsetSearch {
    fn name(&self) -> &str {
        "subset-search"
    }

    fn solve(&self, model: &MilpModel, config: &SolverConfig) -> MilpSolution {
        if model.validate().is_err() || model.variable_count() != self.layout.variable_count {
            return MilpSolution::empty(SolverStatus::ModelInvalid);
        }

        let start_time = Instant::now();
        let deadline = config.time_limit_ms.map(Duration::from_millis);
        let tolerance = config.feasibility_tolerance;

        let free: Vec<usize> = (0..self.layout.select.len())
            .filter(|&i| self.layout.is_admissible(i))
            .collect();
        if free.len() > config.max_branching {
            warn!(
                admissible = free.len(),
                max_branching = config.max_branching,
                "too many admissible criteria for exhaustive search"
            );
            return MilpSolution::empty(SolverStatus::Unknown);
        }

        let Some(objective) = model.objective.as_ref() else {
            return MilpSolution::empty(SolverStatus::ModelInvalid);
        };

        let mut best: Option<(f64, Vec<f64>)> = None;
        let mut timed_out = false;
        let mut feasible = 0usize;
        let mut selected = vec![false; self.layout.select.len()];
        let total: u64 = 1 << free.len();

        for mask in 0..total {
            if mask & 0x3ff == 0 && mask > 0 {
                if let Some(limit) = deadline {
                    if start_time.elapsed() >= limit {
                        timed_out = true;
                        break;
                    }
                }
            }

            for (bit, &i) in free.iter().enumerate() {
                selected[i] = mask & (1 << bit) != 0;
            }
            let values = self.complete(&selected);
            if !model.is_feasible(&values, tolerance) {
                continue;
            }
            feasible += 1;
            let value = objective.expr.evaluate(&values);
            let better = match &best {
                Some((incumbent, _)) => objective.improves(value, *incumbent),
                None => true,
            };
            if better {
                best = Some((value, values));
            }
        }

        let elapsed = start_time.elapsed().as_millis() as u64;
        debug!(
            candidates = total,
            feasible,
            timed_out,
            elapsed_ms = elapsed,
            "subset search finished"
        );

        let status = match (&best, timed_out) {
            (Some(_), false) => SolverStatus::Optimal,
            (None, false) => SolverStatus::Infeasible,
            (Some(_), true) if config.fallback == TimeoutFallback::BestIncumbent => {
                SolverStatus::Feasible
            }
            (_, true) => SolverStatus::Timeout,
        };

        match best {
            Some((value, values))
                if matches!(status, SolverStatus::Optimal | SolverStatus::Feasible) =>
            {
                MilpSolution {
                    status,
                    objective_value: Some(value),
                    values,
                    solve_time_ms: elapsed,
                }
            }
            _ => MilpSolution {
                solve_time_ms: elapsed,
                ..MilpSolution::empty(status)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{
        AggregatedMetrics, Criterion, Direction, ObjectiveSpec, Pair, PropertyScores,
    };
    use crate::coverage::CoverageMatrix;
    use crate::selection::{ModelConfig, ParsimonyBand, Termination};

    fn criterion(id: &str, completeness: f64) -> Criterion {
        Criterion {
            id: id.into(),
            name: id.into(),
            direction: Direction::Benefit,
            scores: PropertyScores {
                completeness,
                measurability: 7.0,
                sensitivity: 0.25,
                cost_effectiveness: 8.0,
                alignment: 7.0,
                cognitive_coherence: 8.0,
            },
            objective: true,
            monotone: true,
        }
    }

    fn model(completeness: [f64; 4], band: ParsimonyBand) -> DecisionModel {
        let ids = ["A", "B", "C", "D"];
        let metrics = AggregatedMetrics {
            criteria: ids
                .iter()
                .zip(completeness)
                .map(|(id, c)| criterion(id, c))
                .collect(),
            pairs: vec![
                Pair::new("A", "B", 0.2),
                Pair::new("A", "C", 0.2),
                Pair::new("A", "D", 0.2),
                Pair::new("B", "C", 0.2),
                Pair::new("B", "D", 0.2),
                Pair::new("C", "D", 0.2),
            ],
        };
        let specs = vec![ObjectiveSpec::new("O1", "Value", 1, 4)];
        let coverage = CoverageMatrix::from_consolidated(vec![vec![true]; 4], &specs).unwrap();
        let config = ModelConfig::default().with_parsimony(band);
        DecisionModel::build(&metrics, &coverage, &config).unwrap()
    }

    #[test]
    fn test_optimal_assignment_is_feasible() {
        let model = model([9.0, 8.0, 7.0, 6.5], ParsimonyBand::new(1, 4));
        let search = SubsetSearch::new(&model);
        let solution = search.solve(model.milp(), &SolverConfig::default());

        assert_eq!(solution.status, SolverStatus::Optimal);
        assert!(model.milp().is_feasible(&solution.values, 1e-6));
        let value = model.milp().objective_value(&solution.values).unwrap();
        assert!((value - solution.objective_value.unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_gated_criterion_never_selected() {
        let model = model([9.0, 2.0, 7.0, 6.5], ParsimonyBand::new(1, 4));
        let search = SubsetSearch::new(&model);
        let result = model.solve(&search, &SolverConfig::default()).unwrap();
        assert_eq!(result.termination, Termination::Optimal);
        assert!(!result.is_selected("B"));
        assert_eq!(result.selected_ids, vec!["A", "C", "D"]);
    }

    #[test]
    fn test_infeasible_when_nothing_admissible() {
        let model = model([1.0, 1.0, 1.0, 1.0], ParsimonyBand::new(1, 4));
        let search = SubsetSearch::new(&model);
        let result = model.solve(&search, &SolverConfig::default()).unwrap();
        assert_eq!(result.termination, Termination::Infeasible);
        assert!(result.selected_ids.is_empty());
        assert!(!result.has_assignment());
    }

    #[test]
    fn test_parsimony_deviation_completion() {
        // Band [1, 2] with four attractive criteria: the search weighs the
        // excess penalty against the extra reward.
        let model = model([9.0, 8.0, 7.0, 6.5], ParsimonyBand::new(1, 2));
        let search = SubsetSearch::new(&model);
        let result = model.solve(&search, &SolverConfig::default()).unwrap();
        let n = result.selected_count;
        assert_eq!(n as usize, result.selected_ids.len());
        assert_eq!(result.parsimony_lower.under, 1u32.saturating_sub(n));
        assert_eq!(result.parsimony_lower.over, n.saturating_sub(1));
        assert_eq!(result.parsimony_upper.over, n.saturating_sub(2));
    }

    #[test]
    fn test_branching_limit_reports_unknown() {
        let model = model([9.0, 8.0, 7.0, 6.5], ParsimonyBand::new(1, 4));
        let search = SubsetSearch::new(&model);
        let config = SolverConfig::default().with_max_branching(3);
        let solution = search.solve(model.milp(), &config);
        assert_eq!(solution.status, SolverStatus::Unknown);
        assert!(!solution.is_solution_found());
    }

    #[test]
    fn test_mismatched_model_is_invalid() {
        let model = model([9.0, 8.0, 7.0, 6.5], ParsimonyBand::new(1, 4));
        let search = SubsetSearch::new(&model);
        let other = MilpModel::new("empty");
        assert_eq!(
            search.solve(&other, &SolverConfig::default()).status,
            SolverStatus::ModelInvalid
        );
    }

    fn wide_model(n: usize) -> DecisionModel {
        let ids: Vec<String> = (0..n).map(|i| format!("C{i}")).collect();
        let mut pairs = Vec::new();
        for i in 0..n {
            for k in (i + 1)..n {
                pairs.push(Pair::new(ids[i].clone(), ids[k].clone(), 0.1));
            }
        }
        let metrics = AggregatedMetrics {
            criteria: ids.iter().map(|id| criterion(id, 8.0)).collect(),
            pairs,
        };
        let specs = vec![ObjectiveSpec::new("O1", "Value", 1, n as u32)];
        let coverage = CoverageMatrix::from_consolidated(vec![vec![true]; n], &specs).unwrap();
        DecisionModel::build(&metrics, &coverage, &ModelConfig::default()).unwrap()
    }

    #[test]
    fn test_small_pool_finishes_under_zero_time_limit() {
        let model = model([9.0, 8.0, 7.0, 6.5], ParsimonyBand::new(1, 4));
        let search = SubsetSearch::new(&model);
        let config = SolverConfig::default()
            .with_time_limit_ms(0)
            .with_fallback(TimeoutFallback::Fail);
        let solution = search.solve(model.milp(), &config);
        assert_eq!(solution.status, SolverStatus::Optimal);
        assert!(model.milp().is_feasible(&solution.values, 1e-6));
    }

    #[test]
    fn test_timeout_fallback() {
        let model = wide_model(12);
        let search = SubsetSearch::new(&model);

        let config = SolverConfig::default().with_time_limit_ms(0);
        let solution = search.solve(model.milp(), &config);
        assert_eq!(solution.status, SolverStatus::Feasible);
        assert!(model.milp().is_feasible(&solution.values, 1e-6));

        let config = config.with_fallback(TimeoutFallback::Fail);
        let solution = search.solve(model.milp(), &config);
        assert_eq!(solution.status, SolverStatus::Timeout);
        assert!(!solution.is_solution_found());
    }
}
