//! MILP model definition.

use super::variables::{VarId, Variable};
use crate::error::{Result, SelectionError};
use std::collections::HashSet;

/// A linear combination `Σ coefficient · variable`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearExpr {
    /// (variable, coefficient) pairs, in insertion order.
    pub terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    /// Creates an empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_term`](Self::add_term).
    pub fn term(mut self, var: VarId, coefficient: f64) -> Self {
        self.add_term(var, coefficient);
        self
    }

    /// Appends `coefficient · var`.
    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    /// Sum of the given variables with coefficient 1.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1.0)).collect(),
        }
    }

    /// Evaluates the expression under an assignment.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(v, c)| c * values.get(v.index()).copied().unwrap_or(0.0))
            .sum()
    }

    /// Whether the expression has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Relation between a constraint's expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// `expr <= rhs`
    LessEqual,
    /// `expr >= rhs`
    GreaterEqual,
    /// `expr == rhs`
    Equal,
}

/// A named linear constraint `expr (<=|>=|==) rhs`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    /// Constraint name (used in LP export and diagnostics).
    pub name: String,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Relation.
    pub sense: Sense,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl Constraint {
    /// `expr <= rhs`
    pub fn le(name: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense: Sense::LessEqual,
            rhs,
        }
    }

    /// `expr >= rhs`
    pub fn ge(name: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense: Sense::GreaterEqual,
            rhs,
        }
    }

    /// `expr == rhs`
    pub fn eq(name: impl Into<String>, expr: LinearExpr, rhs: f64) -> Self {
        Self {
            name: name.into(),
            expr,
            sense: Sense::Equal,
            rhs,
        }
    }

    /// Whether the assignment satisfies this constraint within `tolerance`.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.sense {
            Sense::LessEqual => lhs <= self.rhs + tolerance,
            Sense::GreaterEqual => lhs >= self.rhs - tolerance,
            Sense::Equal => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

/// Linear objective function.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    /// Direction.
    pub sense: ObjectiveSense,
    /// Linear part.
    pub expr: LinearExpr,
}

impl Objective {
    /// Maximize `expr`.
    pub fn maximize(expr: LinearExpr) -> Self {
        Self {
            sense: ObjectiveSense::Maximize,
            expr,
        }
    }

    /// Minimize `expr`.
    pub fn minimize(expr: LinearExpr) -> Self {
        Self {
            sense: ObjectiveSense::Minimize,
            expr,
        }
    }

    /// Whether `candidate` is strictly better than `incumbent`.
    pub fn improves(&self, candidate: f64, incumbent: f64) -> bool {
        match self.sense {
            ObjectiveSense::Maximize => candidate > incumbent,
            ObjectiveSense::Minimize => candidate < incumbent,
        }
    }
}

/// A mixed-integer linear program.
///
/// Variables are stored densely; [`VarId`]s index into `variables`.
/// Iteration order is insertion order, so two models built by the same
/// sequence of calls compare equal.
///
/// # Examples
///
/// ```
/// use u_criteria::milp::{Constraint, LinearExpr, MilpModel, Objective, Variable};
///
/// let mut model = MilpModel::new("knapsack");
/// let a = model.add_var(Variable::binary("a"));
/// let b = model.add_var(Variable::binary("b"));
/// model.add_constraint(Constraint::le(
///     "capacity",
///     LinearExpr::new().term(a, 3.0).term(b, 4.0),
///     5.0,
/// ));
/// model.set_objective(Objective::maximize(LinearExpr::new().term(a, 1.0).term(b, 2.0)));
///
/// assert!(model.validate().is_ok());
/// assert!(model.is_feasible(&[0.0, 1.0], 1e-9));
/// assert!(!model.is_feasible(&[1.0, 1.0], 1e-9));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct MilpModel {
    /// Model name.
    pub name: String,
    /// Variables, indexed by [`VarId`].
    pub variables: Vec<Variable>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
    /// Objective function.
    pub objective: Option<Objective>,
}

impl MilpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Adds a variable and returns its id.
    pub fn add_var(&mut self, var: Variable) -> VarId {
        self.variables.push(var);
        VarId(self.variables.len() - 1)
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Sets the objective function.
    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = Some(objective);
    }

    /// Looks up a variable.
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Finds a variable id by name.
    pub fn var_by_name(&self, name: &str) -> Option<VarId> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .map(VarId)
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of integral (binary or integer) variables.
    pub fn integral_count(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integral()).count()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Validates the model for consistency.
    ///
    /// Checks unique names, well-formed bounds, finite coefficients and
    /// that every referenced variable exists.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::with_capacity(self.variables.len());
        for var in &self.variables {
            if var.name.is_empty() {
                return Err(invalid("variable with empty name".into()));
            }
            if !names.insert(var.name.as_str()) {
                return Err(invalid(format!("duplicate variable: {}", var.name)));
            }
            if var.lower.is_nan() || var.upper.is_nan() || var.lower > var.upper {
                return Err(invalid(format!(
                    "bad bounds on {}: [{}, {}]",
                    var.name, var.lower, var.upper
                )));
            }
            if var.is_integral() && !(var.lower.is_finite() && var.upper.is_finite()) {
                return Err(invalid(format!("unbounded integral variable: {}", var.name)));
            }
        }

        let n = self.variables.len();
        for c in &self.constraints {
            if !c.rhs.is_finite() {
                return Err(invalid(format!("non-finite rhs in {}", c.name)));
            }
            check_expr(&c.expr, n, &c.name)?;
        }
        if let Some(obj) = &self.objective {
            check_expr(&obj.expr, n, "objective")?;
        }
        Ok(())
    }

    /// Names of bounds and constraints violated by `values`.
    ///
    /// Bound/integrality violations are reported by variable name.
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<&str> {
        if values.len() != self.variables.len() {
            return vec!["assignment length"];
        }
        let mut out: Vec<&str> = self
            .variables
            .iter()
            .zip(values)
            .filter(|(var, v)| !var.admits(**v, tolerance))
            .map(|(var, _)| var.name.as_str())
            .collect();
        out.extend(
            self.constraints
                .iter()
                .filter(|c| !c.is_satisfied(values, tolerance))
                .map(|c| c.name.as_str()),
        );
        out
    }

    /// Whether `values` is a feasible assignment.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        values.len() == self.variables.len()
            && self
                .variables
                .iter()
                .zip(values)
                .all(|(var, &v)| var.admits(v, tolerance))
            && self
                .constraints
                .iter()
                .all(|c| c.is_satisfied(values, tolerance))
    }

    /// Objective value of `values`, if an objective is set.
    pub fn objective_value(&self, values: &[f64]) -> Option<f64> {
        self.objective.as_ref().map(|o| o.expr.evaluate(values))
    }
}

fn check_expr(expr: &LinearExpr, n: usize, owner: &str) -> Result<()> {
    for &(var, coef) in &expr.terms {
        if var.index() >= n {
            return Err(invalid(format!("{owner}: undefined variable #{}", var.index())));
        }
        if !coef.is_finite() {
            return Err(invalid(format!("{owner}: non-finite coefficient")));
        }
    }
    Ok(())
}

fn invalid(msg: String) -> SelectionError {
    SelectionError::InvalidModel(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_var_model() -> (MilpModel, VarId, VarId) {
        let mut model = MilpModel::new("test");
        let a = model.add_var(Variable::binary("a"));
        let b = model.add_var(Variable::integer("b", 0, 5));
        (model, a, b)
    }

    #[test]
    fn test_model_creation() {
        let (mut model, a, b) = two_var_model();
        model.add_constraint(Constraint::le(
            "c1",
            LinearExpr::new().term(a, 1.0).term(b, 1.0),
            4.0,
        ));
        model.set_objective(Objective::maximize(LinearExpr::sum([a, b])));

        assert_eq!(model.variable_count(), 2);
        assert_eq!(model.integral_count(), 2);
        assert_eq!(model.constraint_count(), 1);
        assert_eq!(model.var_by_name("b"), Some(b));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_duplicate_name() {
        let mut model = MilpModel::new("test");
        model.add_var(Variable::binary("x"));
        model.add_var(Variable::binary("x"));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_undefined_variable() {
        let mut model = MilpModel::new("test");
        model.add_constraint(Constraint::ge("c", LinearExpr::new().term(VarId(3), 1.0), 0.0));
        assert!(matches!(
            model.validate(),
            Err(SelectionError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_bad_bounds() {
        let mut model = MilpModel::new("test");
        model.add_var(Variable::integer("n", 5, 1));
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_feasibility_and_violations() {
        let (mut model, a, b) = two_var_model();
        model.add_constraint(Constraint::eq(
            "balance",
            LinearExpr::new().term(a, 2.0).term(b, -1.0),
            0.0,
        ));

        assert!(model.is_feasible(&[1.0, 2.0], 1e-9));
        assert!(!model.is_feasible(&[1.0, 3.0], 1e-9));
        assert_eq!(model.violations(&[1.0, 3.0], 1e-9), vec!["balance"]);
        assert_eq!(model.violations(&[0.5, 2.0], 1e-9), vec!["a", "balance"]);
        assert_eq!(model.violations(&[1.0], 1e-9), vec!["assignment length"]);
    }

    #[test]
    fn test_objective_value() {
        let (mut model, a, b) = two_var_model();
        assert_eq!(model.objective_value(&[1.0, 1.0]), None);
        model.set_objective(Objective::minimize(LinearExpr::new().term(a, 0.5).term(b, 2.0)));
        let value = model.objective_value(&[1.0, 3.0]).unwrap();
        assert!((value - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_objective_improves() {
        let max = Objective::maximize(LinearExpr::new());
        let min = Objective::minimize(LinearExpr::new());
        assert!(max.improves(2.0, 1.0));
        assert!(min.improves(1.0, 2.0));
        assert!(!max.improves(1.0, 1.0));
    }
}
