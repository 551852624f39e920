//! CPLEX LP text export.
//!
//! External MILP solvers (CBC, HiGHS, GLPK) all read this format, so it is
//! the hand-off point when the assembled model is solved out of process.

use super::model::{LinearExpr, MilpModel, ObjectiveSense, Sense};
use super::variables::VarKind;
use std::collections::HashSet;
use std::fmt::Write;

impl MilpModel {
    /// Renders the model in CPLEX LP format.
    ///
    /// Names are sanitized to `[A-Za-z0-9_]`; a leading digit is prefixed
    /// with `_`. A sanitized name that collides with an earlier one gets
    /// its position appended, so distinct variables stay distinct.
    pub fn to_lp_format(&self) -> String {
        let names = unique_names(self.variables.iter().map(|v| v.name.as_str()));
        let rows = unique_names(self.constraints.iter().map(|c| c.name.as_str()));
        let mut out = String::new();

        let _ = writeln!(out, "\\ Model: {}", self.name);
        match &self.objective {
            Some(obj) => {
                let header = match obj.sense {
                    ObjectiveSense::Maximize => "Maximize",
                    ObjectiveSense::Minimize => "Minimize",
                };
                let _ = writeln!(out, "{header}");
                let _ = writeln!(out, " obj: {}", render_expr(&obj.expr, &names));
            }
            None => {
                let _ = writeln!(out, "Minimize");
                let _ = writeln!(out, " obj: {}", render_expr(&LinearExpr::new(), &names));
            }
        }

        let _ = writeln!(out, "Subject To");
        for (c, row) in self.constraints.iter().zip(&rows) {
            let op = match c.sense {
                Sense::LessEqual => "<=",
                Sense::GreaterEqual => ">=",
                Sense::Equal => "=",
            };
            let _ = writeln!(
                out,
                " {row}: {} {op} {}",
                render_expr(&c.expr, &names),
                c.rhs
            );
        }

        let _ = writeln!(out, "Bounds");
        for (var, name) in self.variables.iter().zip(&names) {
            if var.kind == VarKind::Binary {
                continue;
            }
            if var.upper.is_infinite() {
                let _ = writeln!(out, " {name} >= {}", var.lower);
            } else {
                let _ = writeln!(out, " {} <= {name} <= {}", var.lower, var.upper);
            }
        }

        let general: Vec<&str> = section(self, &names, VarKind::Integer);
        if !general.is_empty() {
            let _ = writeln!(out, "General");
            let _ = writeln!(out, " {}", general.join(" "));
        }
        let binary: Vec<&str> = section(self, &names, VarKind::Binary);
        if !binary.is_empty() {
            let _ = writeln!(out, "Binary");
            let _ = writeln!(out, " {}", binary.join(" "));
        }
        let _ = writeln!(out, "End");
        out
    }
}

fn section<'a>(model: &MilpModel, names: &'a [String], kind: VarKind) -> Vec<&'a str> {
    model
        .variables
        .iter()
        .zip(names)
        .filter(|(v, _)| v.kind == kind)
        .map(|(_, n)| n.as_str())
        .collect()
}

fn render_expr(expr: &LinearExpr, names: &[String]) -> String {
    if expr.is_empty() {
        // LP requires at least one term.
        return match names.first() {
            Some(n) => format!("0 {n}"),
            None => "0".to_string(),
        };
    }
    let mut s = String::new();
    for (pos, &(var, coef)) in expr.terms.iter().enumerate() {
        let sign = if coef < 0.0 { "-" } else { "+" };
        if pos > 0 || coef < 0.0 {
            let _ = write!(s, "{sign} ");
        }
        let name = names.get(var.index()).map(String::as_str).unwrap_or("_undef");
        let _ = write!(s, "{} {name} ", coef.abs());
    }
    s.trim_end().to_string()
}

fn unique_names<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for (index, r) in raw.enumerate() {
        let base = lp_name(r);
        let mut name = base.clone();
        let mut suffix = index;
        while !seen.insert(name.clone()) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn lp_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) || name.is_empty() {
        name.insert(0, '_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::{Constraint, Objective, Variable};

    #[test]
    fn test_lp_export_sections() {
        let mut model = MilpModel::new("demo");
        let x = model.add_var(Variable::binary("x[C1]"));
        let n = model.add_var(Variable::integer("N", 0, 3));
        let r = model.add_var(Variable::continuous("rho", 0.0, 1.0));
        model.add_constraint(Constraint::eq(
            "count",
            LinearExpr::new().term(n, 1.0).term(x, -1.0),
            0.0,
        ));
        model.set_objective(Objective::maximize(
            LinearExpr::new().term(x, 0.5).term(r, 0.25),
        ));

        let lp = model.to_lp_format();
        assert!(lp.contains("Maximize"));
        assert!(lp.contains(" obj: 0.5 x_C1_ + 0.25 rho"));
        assert!(lp.contains(" count: 1 N - 1 x_C1_ = 0"));
        assert!(lp.contains(" 0 <= N <= 3"));
        assert!(lp.contains(" 0 <= rho <= 1"));
        assert!(lp.contains("General\n N"));
        assert!(lp.contains("Binary\n x_C1_"));
        assert!(lp.trim_end().ends_with("End"));
    }

    #[test]
    fn test_lp_name_sanitize() {
        assert_eq!(lp_name("g[completeness,C1]"), "g_completeness_C1_");
        assert_eq!(lp_name("1abc"), "_1abc");
    }

    #[test]
    fn test_sanitized_collisions_stay_distinct() {
        let mut model = MilpModel::new("clash");
        let a = model.add_var(Variable::binary("x_C-1"));
        let b = model.add_var(Variable::binary("x_C.1"));
        let c = model.add_var(Variable::binary("x_C_1_1"));
        model.add_constraint(Constraint::le(
            "pick",
            LinearExpr::new().term(a, 1.0).term(b, 1.0).term(c, 1.0),
            1.0,
        ));
        model.add_constraint(Constraint::le("pick", LinearExpr::new().term(a, 1.0), 1.0));

        let names = unique_names(model.variables.iter().map(|v| v.name.as_str()));
        assert_eq!(names, vec!["x_C_1", "x_C_1_1", "x_C_1_1_2"]);
        let lp = model.to_lp_format();
        assert!(lp.contains(" pick: 1 x_C_1 + 1 x_C_1_1 + 1 x_C_1_1_2 <= 1"));
        assert!(lp.contains(" pick_1: 1 x_C_1 <= 1"));
        assert!(lp.contains("Binary\n x_C_1 x_C_1_1 x_C_1_1_2\n"));
    }

    #[test]
    fn test_leading_negative_term() {
        let mut model = MilpModel::new("neg");
        let a = model.add_var(Variable::binary("a"));
        model.add_constraint(Constraint::le("c", LinearExpr::new().term(a, -2.0), 0.0));
        assert!(model.to_lp_format().contains(" c: - 2 a <= 0"));
    }
}
