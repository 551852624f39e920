//! MILP variable types.

/// Index of a variable inside a [`MilpModel`](super::MilpModel).
///
/// Ids are assigned densely in insertion order, so an assignment is a
/// plain `Vec<f64>` indexed by `VarId::index()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarId(pub usize);

impl VarId {
    /// Position of the variable in the model's variable list.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain class of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarKind {
    /// 0/1 variable.
    Binary,
    /// Integer variable within finite bounds.
    Integer,
    /// Real variable; the upper bound may be infinite.
    Continuous,
}

/// A decision variable with domain `[lower, upper]`.
///
/// # Examples
///
/// ```
/// use u_criteria::milp::{Variable, VarKind};
///
/// let x = Variable::binary("x_C1");
/// assert_eq!(x.kind, VarKind::Binary);
/// assert!(x.admits(1.0, 1e-9));
/// assert!(!x.admits(0.5, 1e-9));
///
/// let rho = Variable::continuous("rho", 0.0, 1.0);
/// assert!(rho.admits(0.5, 1e-9));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    /// Variable name (unique within a model).
    pub name: String,
    /// Domain class.
    pub kind: VarKind,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl Variable {
    /// Creates a binary variable.
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: 1.0,
        }
    }

    /// Creates an integer variable with bounds `[lower, upper]`.
    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Integer,
            lower: lower as f64,
            upper: upper as f64,
        }
    }

    /// Creates a continuous variable with bounds `[lower, upper]`.
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Continuous,
            lower,
            upper,
        }
    }

    /// Whether the variable must take integral values.
    pub fn is_integral(&self) -> bool {
        !matches!(self.kind, VarKind::Continuous)
    }

    /// Whether the domain is a single value.
    pub fn is_fixed(&self) -> bool {
        self.lower == self.upper
    }

    /// Whether `value` lies inside the domain (bounds and integrality).
    pub fn admits(&self, value: f64, tolerance: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if value < self.lower - tolerance || value > self.upper + tolerance {
            return false;
        }
        !self.is_integral() || (value - value.round()).abs() <= tolerance
    }
}
