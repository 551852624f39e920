//! Big-M indicator constraints.
//!
//! Every admissibility gate and every below-distinctiveness indicator has
//! the same shape: a binary `z` may be 1 only when a constant slack is
//! non-negative,
//!
//! ```text
//! M·z ≤ slack + M
//! ```
//!
//! With `z = 0` the row is slack for any `M ≥ -slack`; with `z = 1` it
//! reduces to `slack ≥ 0`.

use crate::aggregation::Metric;
use crate::milp::{Constraint, LinearExpr, MilpModel, VarId, Variable};

/// Adds `M·indicator ≤ slack + M`.
pub(crate) fn add_indicator(
    model: &mut MilpModel,
    name: String,
    indicator: VarId,
    slack: f64,
    big_m: f64,
) {
    model.add_constraint(Constraint::le(
        name,
        LinearExpr::new().term(indicator, big_m),
        slack + big_m,
    ));
}

/// Smallest safe M for a family of slacks, plus `margin`.
pub(crate) fn family_big_m(slacks: impl IntoIterator<Item = f64>, margin: f64) -> f64 {
    slacks.into_iter().fold(0.0_f64, |m, s| m.max(s.abs())) + margin
}

/// One gate per criterion for `metric`, each upper-bounding its selection
/// variable.
pub(crate) struct GateFamily {
    pub vars: Vec<VarId>,
    pub open: Vec<bool>,
    pub big_m: f64,
}

/// Adds the gate variables and constraints for one metric.
///
/// `slacks[i]` is `metric_i − threshold_i`. Returns the gate ids and
/// whether each gate can be opened. Names carry the criterion position.
pub(crate) fn add_gate_family(
    model: &mut MilpModel,
    metric: Metric,
    select: &[VarId],
    slacks: &[f64],
    big_m: f64,
) -> GateFamily {
    let mut vars = Vec::with_capacity(select.len());
    let mut open = Vec::with_capacity(select.len());
    let tag = metric.as_str();
    for (i, (&x, &slack)) in select.iter().zip(slacks).enumerate() {
        let gate = model.add_var(Variable::binary(format!("g_{tag}_{i}")));
        add_indicator(
            model,
            format!("gate_{tag}_{i}"),
            gate,
            slack,
            big_m,
        );
        model.add_constraint(Constraint::le(
            format!("admit_{tag}_{i}"),
            LinearExpr::new().term(x, 1.0).term(gate, -1.0),
            0.0,
        ));
        vars.push(gate);
        open.push(slack >= 0.0);
    }
    GateFamily { vars, open, big_m }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_big_m() {
        assert!((family_big_m([2.0, -5.0, 0.5], 1.0) - 6.0).abs() < 1e-12);
        assert!((family_big_m([], 1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_gate_blocks_selection_below_threshold() {
        let mut model = MilpModel::new("gate");
        let select = vec![
            model.add_var(Variable::binary("x_0")),
            model.add_var(Variable::binary("x_1")),
        ];
        let slacks = [1.5, -0.5];
        let m = family_big_m(slacks, 1.0);
        let family = add_gate_family(&mut model, Metric::Completeness, &select, &slacks, m);

        assert_eq!(family.open, vec![true, false]);
        assert_eq!(model.variable_count(), 4);
        assert_eq!(model.constraint_count(), 4);
        // x_0 = g_0 = 1 is fine; x_1 = 1 needs g_1 = 1, which the gate forbids.
        assert!(model.is_feasible(&[1.0, 0.0, 1.0, 0.0], 1e-9));
        assert!(!model.is_feasible(&[1.0, 1.0, 1.0, 1.0], 1e-9));
        assert!(!model.is_feasible(&[1.0, 1.0, 1.0, 0.0], 1e-9));
        // Closed gate with M large enough stays feasible at 0.
        assert!(model.is_feasible(&[0.0, 0.0, 0.0, 0.0], 1e-9));
    }

    #[test]
    fn test_gate_open_at_threshold() {
        let mut model = MilpModel::new("gate");
        let select = vec![model.add_var(Variable::binary("x_0"))];
        let family = add_gate_family(&mut model, Metric::Alignment, &select, &[0.0], 1.0);
        assert_eq!(family.open, vec![true]);
        assert!(model.is_feasible(&[1.0, 1.0], 1e-9));
        assert_eq!(model.var_by_name("g_alignment_0"), Some(family.vars[0]));
    }
}
