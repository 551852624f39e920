//! Assembly of the criteria-selection MILP.

use super::config::{ModelConfig, ParsimonyBand};
use super::gate::{add_gate_family, add_indicator, family_big_m};
use super::result::SelectionResult;
use super::screening::ScreeningReport;
use crate::aggregation::{AggregatedMetrics, Metric};
use crate::coverage::CoverageMatrix;
use crate::error::{Result, SelectionError};
use crate::milp::{
    Constraint, LinearExpr, MilpModel, MilpSolver, Objective, SolverConfig, VarId, Variable,
};
use tracing::{debug, info};

/// Shortfall/excess variable pair of one goal-programming equality
/// `count + under − over = target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandDeviation {
    pub under: VarId,
    pub over: VarId,
    pub target: u32,
}

/// Indicator variables of one criterion pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairVars {
    pub first: usize,
    pub second: usize,
    pub correlation: f64,
    /// 1 only when the pair is below the distinctiveness threshold.
    pub below: VarId,
    /// Both criteria selected.
    pub joint: VarId,
    /// Whether `below` can be 1, i.e. `correlation ≤ δ − ε`.
    pub below_allowed: bool,
}

/// Representativeness variables of one objective.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveVars {
    pub id: String,
    /// Criteria mapped to the objective.
    pub members: Vec<usize>,
    /// Deviations against `L`.
    pub lower: BandDeviation,
    /// Deviations against `U`.
    pub upper: BandDeviation,
}

/// Where each modeling role lives in the variable vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelLayout {
    pub ids: Vec<String>,
    pub select: Vec<VarId>,
    /// Gate ids per criterion, in [`Metric::ALL`] order.
    pub gates: Vec<[VarId; 6]>,
    pub screening: ScreeningReport,
    /// Objectivity flag `u[i]`.
    pub objective_flags: Vec<bool>,
    pub pairs: Vec<PairVars>,
    pub objectivity_ratio: VarId,
    pub selected_count: VarId,
    pub parsimony: ParsimonyBand,
    /// Deviations against ω.
    pub parsimony_lower: BandDeviation,
    /// Deviations against ζ.
    pub parsimony_upper: BandDeviation,
    pub objectives: Vec<ObjectiveVars>,
    /// Big-M used per gate family, in [`Metric::ALL`] order.
    pub gate_big_m: [f64; 6],
    pub pair_big_m: f64,
    pub variable_count: usize,
}

impl ModelLayout {
    /// Whether criterion `i` passes every gate and veto.
    pub fn is_admissible(&self, i: usize) -> bool {
        self.screening
            .entries
            .get(i)
            .is_some_and(|e| e.is_eligible())
    }

}

/// The assembled selection model.
///
/// Built fresh from immutable inputs; building twice from the same inputs
/// yields models that compare equal.
///
/// # Examples
///
/// ```ignore
/// let model = DecisionModel::build(&metrics, &coverage, &ModelConfig::default())?;
/// let search = SubsetSearch::new(&model);
/// let result = model.solve(&search, &SolverConfig::default())?;
/// println!("{:?}", result.selected_ids);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionModel {
    milp: MilpModel,
    layout: ModelLayout,
}

impl DecisionModel {
    /// Builds the model.
    ///
    /// Fails only on structurally invalid inputs. Data that makes the
    /// model infeasible (unreachable thresholds, empty bands) still builds;
    /// the solver reports infeasibility.
    pub fn build(
        metrics: &AggregatedMetrics,
        coverage: &CoverageMatrix,
        config: &ModelConfig,
    ) -> Result<Self> {
        config.validate()?;
        let pairs = metrics.indexed_pairs()?;
        if coverage.objective_count() == 0 {
            return Err(SelectionError::EmptyObjectives);
        }
        for o in &coverage.objectives {
            if o.lower > o.upper {
                return Err(SelectionError::InvalidConfig(format!(
                    "objective {}: band lower {} exceeds upper {}",
                    o.id, o.lower, o.upper
                )));
            }
        }
        let screening = ScreeningReport::evaluate(metrics, coverage, &config.thresholds)?;

        let n = metrics.criteria.len();
        let ids: Vec<String> = metrics.criteria.iter().map(|c| c.id.clone()).collect();
        let thresholds = &config.thresholds;
        let mut milp = MilpModel::new("criteria_selection");

        // Model names use positions; ids stay in the layout.
        let select: Vec<VarId> = (0..n)
            .map(|i| milp.add_var(Variable::binary(format!("x_{i}"))))
            .collect();

        // Admissibility gates.
        let mut gates = vec![[VarId(0); 6]; n];
        let mut gate_big_m = [0.0; 6];
        for metric in Metric::ALL {
            let slacks: Vec<f64> = metrics
                .criteria
                .iter()
                .map(|c| c.scores.get(metric) - thresholds.for_metric(metric, c.objective))
                .collect();
            let big_m = resolve_big_m(
                config,
                family_big_m(slacks.iter().copied(), config.big_m_margin),
            );
            let family = add_gate_family(&mut milp, metric, &select, &slacks, big_m);
            for (i, var) in family.vars.into_iter().enumerate() {
                gates[i][metric.index()] = var;
            }
            gate_big_m[metric.index()] = family.big_m;
            debug!(
                metric = metric.as_str(),
                big_m = family.big_m,
                open = family.open.iter().filter(|&&o| o).count(),
                "gate family added"
            );
        }

        // Hard vetoes.
        for (i, entry) in screening.entries.iter().enumerate() {
            let x = LinearExpr::new().term(select[i], 1.0);
            milp.add_constraint(Constraint::le(
                format!("monotone_{i}"),
                x.clone(),
                if entry.monotone { 1.0 } else { 0.0 },
            ));
            milp.add_constraint(Constraint::le(
                format!("represented_{i}"),
                x,
                if entry.representative { 1.0 } else { 0.0 },
            ));
        }

        // Distinctiveness exclusion and joint-selection indicators.
        let delta = thresholds.distinctiveness;
        let pair_big_m = resolve_big_m(
            config,
            family_big_m(
                pairs.iter().map(|p| delta - config.epsilon - p.correlation),
                config.big_m_margin,
            ),
        );
        let mut pair_vars = Vec::with_capacity(pairs.len());
        for p in &pairs {
            let (a, b) = (p.first, p.second);
            let (xi, xk) = (select[p.first], select[p.second]);
            let slack = delta - config.epsilon - p.correlation;
            let below = milp.add_var(Variable::binary(format!("b_{a}_{b}")));
            let joint = milp.add_var(Variable::binary(format!("t_{a}_{b}")));
            add_indicator(&mut milp, format!("below_{a}_{b}"), below, slack, pair_big_m);
            milp.add_constraint(Constraint::le(
                format!("distinct_{a}_{b}"),
                LinearExpr::new().term(xi, 1.0).term(xk, 1.0).term(below, -1.0),
                1.0,
            ));
            milp.add_constraint(Constraint::le(
                format!("joint_first_{a}_{b}"),
                LinearExpr::new().term(joint, 1.0).term(xi, -1.0),
                0.0,
            ));
            milp.add_constraint(Constraint::le(
                format!("joint_second_{a}_{b}"),
                LinearExpr::new().term(joint, 1.0).term(xk, -1.0),
                0.0,
            ));
            milp.add_constraint(Constraint::ge(
                format!("joint_both_{a}_{b}"),
                LinearExpr::new().term(joint, 1.0).term(xi, -1.0).term(xk, -1.0),
                -1.0,
            ));
            pair_vars.push(PairVars {
                first: p.first,
                second: p.second,
                correlation: p.correlation,
                below,
                joint,
                below_allowed: slack >= 0.0,
            });
        }

        // Objectivity ratio.
        let objective_flags: Vec<bool> = metrics.criteria.iter().map(|c| c.objective).collect();
        let objective_total = objective_flags.iter().filter(|&&u| u).count();
        let rho = if objective_total > 0 {
            let rho = milp.add_var(Variable::continuous("rho", 0.0, 1.0));
            let mut expr = LinearExpr::new().term(rho, objective_total as f64);
            for (i, &u) in objective_flags.iter().enumerate() {
                if u {
                    expr.add_term(select[i], -1.0);
                }
            }
            milp.add_constraint(Constraint::eq("objectivity_ratio", expr, 0.0));
            rho
        } else {
            milp.add_var(Variable::continuous("rho", 0.0, 0.0))
        };

        // Parsimony band.
        let band = config.parsimony;
        let count = milp.add_var(Variable::integer("n_selected", 0, n as i64));
        let mut tally = LinearExpr::new().term(count, 1.0);
        for &x in &select {
            tally.add_term(x, -1.0);
        }
        milp.add_constraint(Constraint::eq("count", tally, 0.0));
        let parsimony_lower =
            add_band_equality(&mut milp, "parsimony_min", &[count], band.min, n as u32);
        let parsimony_upper =
            add_band_equality(&mut milp, "parsimony_max", &[count], band.max, n as u32);

        // Representativeness.
        let mut objectives = Vec::with_capacity(coverage.objective_count());
        for (o, objective) in coverage.objectives.iter().enumerate() {
            let members = coverage.members(o);
            let vars: Vec<VarId> = members.iter().map(|&i| select[i]).collect();
            milp.add_constraint(Constraint::ge(
                format!("cover_{o}"),
                LinearExpr::sum(vars.iter().copied()),
                1.0,
            ));
            let size = members.len() as u32;
            let lower = add_band_equality(
                &mut milp,
                &format!("rep_min_{o}"),
                &vars,
                objective.lower,
                size,
            );
            let upper = add_band_equality(
                &mut milp,
                &format!("rep_max_{o}"),
                &vars,
                objective.upper,
                size,
            );
            objectives.push(ObjectiveVars {
                id: objective.id.clone(),
                members,
                lower,
                upper,
            });
        }

        // Objective.
        let weights = &config.weights;
        let mut expr = LinearExpr::new();
        let totals: Vec<f64> = Metric::ALL.iter().map(|&m| metrics.metric_total(m)).collect();
        for (i, c) in metrics.criteria.iter().enumerate() {
            let reward: f64 = Metric::ALL
                .iter()
                .zip(&totals)
                .filter(|&(_, &total)| total != 0.0)
                .map(|(&m, &total)| weights.for_metric(m) * c.scores.get(m) / total)
                .sum();
            expr.add_term(select[i], reward);
        }
        expr.add_term(rho, weights.objectivity);
        let correlation_total: f64 = pairs.iter().map(|p| p.correlation).sum();
        if correlation_total > 0.0 {
            for p in &pair_vars {
                expr.add_term(
                    p.joint,
                    -weights.distinctiveness * p.correlation / correlation_total,
                );
            }
        }
        expr.add_term(
            parsimony_lower.under,
            -weights.parsimony_lower / f64::from(band.min.max(1)),
        );
        expr.add_term(
            parsimony_upper.over,
            -weights.parsimony_upper / f64::from(band.max.max(1)),
        );
        let objective_count = coverage.objective_count() as f64;
        for (vars, objective) in objectives.iter().zip(&coverage.objectives) {
            let scale = objective_count * f64::from(objective.deficit_bound.max(1));
            expr.add_term(vars.lower.under, -weights.representativeness_lower / scale);
            expr.add_term(vars.upper.over, -weights.representativeness_upper / scale);
        }
        milp.set_objective(Objective::maximize(expr));

        milp.validate()?;
        info!(
            criteria = n,
            pairs = pair_vars.len(),
            objectives = objectives.len(),
            eligible = screening.eligible_count(),
            variables = milp.variable_count(),
            constraints = milp.constraint_count(),
            "decision model built"
        );

        let layout = ModelLayout {
            ids,
            select,
            gates,
            screening,
            objective_flags,
            pairs: pair_vars,
            objectivity_ratio: rho,
            selected_count: count,
            parsimony: band,
            parsimony_lower,
            parsimony_upper,
            objectives,
            gate_big_m,
            pair_big_m,
            variable_count: milp.variable_count(),
        };
        Ok(Self { milp, layout })
    }

    /// The assembled MILP.
    pub fn milp(&self) -> &MilpModel {
        &self.milp
    }

    pub fn layout(&self) -> &ModelLayout {
        &self.layout
    }

    /// Per-criterion gate and veto outcome.
    pub fn screening(&self) -> &ScreeningReport {
        &self.layout.screening
    }

    /// Hands the model to `solver` and extracts the selection.
    ///
    /// Non-optimal termination is reported in the result, not as an error.
    pub fn solve(&self, solver: &dyn MilpSolver, config: &SolverConfig) -> Result<SelectionResult> {
        config.validate()?;
        if !solver.is_available() {
            return Err(SelectionError::NoSolverBackend);
        }
        let solution = solver.solve(&self.milp, config);
        info!(
            backend = solver.name(),
            status = ?solution.status,
            objective = ?solution.objective_value,
            elapsed_ms = solution.solve_time_ms,
            "solver finished"
        );
        SelectionResult::from_solution(self, &solution)
    }
}

/// Derived M, or the configured override when it is at least as large.
fn resolve_big_m(config: &ModelConfig, derived: f64) -> f64 {
    config.big_m.map_or(derived, |m| m.max(derived))
}

/// Adds `Σ vars + under − over = target` with non-negative integer
/// deviations.
fn add_band_equality(
    milp: &mut MilpModel,
    name: &str,
    vars: &[VarId],
    target: u32,
    size: u32,
) -> BandDeviation {
    let under = milp.add_var(Variable::integer(
        format!("{name}_under"),
        0,
        i64::from(target),
    ));
    let over = milp.add_var(Variable::integer(format!("{name}_over"), 0, i64::from(size)));
    let mut expr = LinearExpr::sum(vars.iter().copied());
    expr.add_term(under, 1.0);
    expr.add_term(over, -1.0);
    milp.add_constraint(Constraint::eq(name, expr, f64::from(target)));
    BandDeviation {
        under,
        over,
        target,
    }
}
