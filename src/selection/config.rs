//! Selection model configuration.
//!
//! [`ModelConfig`] bundles the nine admissibility thresholds, the parsimony
//! band, the twelve objective weights and the numeric constants used by
//! the big-M linearization.

use crate::aggregation::Metric;
use crate::error::{Result, SelectionError};

/// Admissibility thresholds.
///
/// Measurability and cost-effectiveness use separate thresholds for
/// objective and subjective criteria.
///
/// # Defaults
///
/// ```
/// use u_criteria::selection::Thresholds;
///
/// let t = Thresholds::default();
/// assert_eq!(t.completeness, 6.0);
/// assert_eq!(t.distinctiveness, 0.75);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Thresholds {
    /// α
    pub completeness: f64,
    /// γ_O
    pub measurability_objective: f64,
    /// γ_S
    pub measurability_subjective: f64,
    /// δ: pairs at or above this pooled correlation are mutually exclusive.
    pub distinctiveness: f64,
    /// θ
    pub sensitivity: f64,
    /// τ_O
    pub cost_effectiveness_objective: f64,
    /// τ_S
    pub cost_effectiveness_subjective: f64,
    /// λ
    pub alignment: f64,
    /// μ
    pub cognitive_coherence: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            completeness: 6.0,
            measurability_objective: 6.5,
            measurability_subjective: 5.5,
            distinctiveness: 0.75,
            sensitivity: 0.035,
            cost_effectiveness_objective: 7.0,
            cost_effectiveness_subjective: 6.0,
            alignment: 6.5,
            cognitive_coherence: 7.0,
        }
    }
}

impl Thresholds {
    /// Thresholds that every non-negative metric passes and no pair hits.
    pub fn permissive() -> Self {
        Self {
            completeness: 0.0,
            measurability_objective: 0.0,
            measurability_subjective: 0.0,
            distinctiveness: 1.0,
            sensitivity: 0.0,
            cost_effectiveness_objective: 0.0,
            cost_effectiveness_subjective: 0.0,
            alignment: 0.0,
            cognitive_coherence: 0.0,
        }
    }

    pub fn with_completeness(mut self, alpha: f64) -> Self {
        self.completeness = alpha;
        self
    }

    pub fn with_measurability(mut self, objective: f64, subjective: f64) -> Self {
        self.measurability_objective = objective;
        self.measurability_subjective = subjective;
        self
    }

    pub fn with_distinctiveness(mut self, delta: f64) -> Self {
        self.distinctiveness = delta;
        self
    }

    pub fn with_sensitivity(mut self, theta: f64) -> Self {
        self.sensitivity = theta;
        self
    }

    pub fn with_cost_effectiveness(mut self, objective: f64, subjective: f64) -> Self {
        self.cost_effectiveness_objective = objective;
        self.cost_effectiveness_subjective = subjective;
        self
    }

    pub fn with_alignment(mut self, lambda: f64) -> Self {
        self.alignment = lambda;
        self
    }

    pub fn with_cognitive_coherence(mut self, mu: f64) -> Self {
        self.cognitive_coherence = mu;
        self
    }

    /// Gate threshold of `metric` for a criterion of the given objectivity.
    pub fn for_metric(&self, metric: Metric, objective: bool) -> f64 {
        match metric {
            Metric::Completeness => self.completeness,
            Metric::Measurability if objective => self.measurability_objective,
            Metric::Measurability => self.measurability_subjective,
            Metric::Sensitivity => self.sensitivity,
            Metric::CostEffectiveness if objective => self.cost_effectiveness_objective,
            Metric::CostEffectiveness => self.cost_effectiveness_subjective,
            Metric::Alignment => self.alignment,
            Metric::CognitiveCoherence => self.cognitive_coherence,
        }
    }

    /// Validates the thresholds.
    ///
    /// Conflicting but finite thresholds are allowed: they make the model
    /// infeasible, which the solver reports.
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("completeness", self.completeness),
            ("measurability_objective", self.measurability_objective),
            ("measurability_subjective", self.measurability_subjective),
            ("distinctiveness", self.distinctiveness),
            ("sensitivity", self.sensitivity),
            ("cost_effectiveness_objective", self.cost_effectiveness_objective),
            ("cost_effectiveness_subjective", self.cost_effectiveness_subjective),
            ("alignment", self.alignment),
            ("cognitive_coherence", self.cognitive_coherence),
        ];
        for (name, value) in all {
            if !value.is_finite() {
                return Err(SelectionError::InvalidConfig(format!(
                    "threshold {name} must be finite, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.distinctiveness) {
            return Err(SelectionError::InvalidConfig(format!(
                "distinctiveness must be in [0, 1], got {}",
                self.distinctiveness
            )));
        }
        Ok(())
    }
}

/// Target range `[min, max]` (ω, ζ) for the number of selected criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsimonyBand {
    /// ω
    pub min: u32,
    /// ζ
    pub max: u32,
}

impl Default for ParsimonyBand {
    fn default() -> Self {
        Self { min: 5, max: 9 }
    }
}

impl ParsimonyBand {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Validates `ω <= ζ`.
    pub fn validate(&self) -> Result<()> {
        if self.min > self.max {
            return Err(SelectionError::InvalidConfig(format!(
                "parsimony min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// The twelve objective weights.
///
/// Eight reward a selected criterion's benefit share or the objectivity
/// ratio; four penalize band deviations; `distinctiveness` penalizes
/// realized redundancy.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weights {
    /// w1
    pub completeness: f64,
    /// w2
    pub objectivity: f64,
    /// w3
    pub measurability: f64,
    /// w4
    pub distinctiveness: f64,
    /// w5⁻
    pub parsimony_lower: f64,
    /// w5⁺
    pub parsimony_upper: f64,
    /// w6
    pub sensitivity: f64,
    /// w7
    pub cost_effectiveness: f64,
    /// w8
    pub alignment: f64,
    /// w9
    pub cognitive_coherence: f64,
    /// w11⁻
    pub representativeness_lower: f64,
    /// w11⁺
    pub representativeness_upper: f64,
}

/// Tolerance on `Σ weights == 1`.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl Default for Weights {
    /// 0.1 for each reward and redundancy component, 0.05 for each band
    /// penalty, normalized.
    fn default() -> Self {
        Self::from_raw(Self {
            completeness: 0.1,
            objectivity: 0.1,
            measurability: 0.1,
            distinctiveness: 0.1,
            parsimony_lower: 0.05,
            parsimony_upper: 0.05,
            sensitivity: 0.1,
            cost_effectiveness: 0.1,
            alignment: 0.1,
            cognitive_coherence: 0.1,
            representativeness_lower: 0.05,
            representativeness_upper: 0.05,
        })
    }
}

impl Weights {
    /// Normalizes raw swing weights to sum to 1.
    ///
    /// Negative or non-finite raw values are treated as 0. An all-zero
    /// input is returned unchanged (and fails [`validate`](Self::validate)).
    ///
    /// ```
    /// use u_criteria::selection::Weights;
    ///
    /// let mut raw = Weights::zero();
    /// raw.completeness = 3.0;
    /// raw.objectivity = 1.0;
    /// let w = Weights::from_raw(raw);
    /// assert!((w.completeness - 0.75).abs() < 1e-12);
    /// assert!(w.validate().is_ok());
    /// ```
    pub fn from_raw(raw: Weights) -> Self {
        let mut values = raw.to_array().map(|v| if v.is_finite() && v > 0.0 { v } else { 0.0 });
        let total: f64 = values.iter().sum();
        if total > 0.0 {
            values.iter_mut().for_each(|v| *v /= total);
        }
        Self::from_array(values)
    }

    /// All weights zero.
    pub fn zero() -> Self {
        Self::from_array([0.0; 12])
    }

    /// Weights in canonical order (w1, w2, w3, w4, w5⁻, w5⁺, w6 … w9, w11⁻, w11⁺).
    pub fn to_array(&self) -> [f64; 12] {
        [
            self.completeness,
            self.objectivity,
            self.measurability,
            self.distinctiveness,
            self.parsimony_lower,
            self.parsimony_upper,
            self.sensitivity,
            self.cost_effectiveness,
            self.alignment,
            self.cognitive_coherence,
            self.representativeness_lower,
            self.representativeness_upper,
        ]
    }

    fn from_array(v: [f64; 12]) -> Self {
        Self {
            completeness: v[0],
            objectivity: v[1],
            measurability: v[2],
            distinctiveness: v[3],
            parsimony_lower: v[4],
            parsimony_upper: v[5],
            sensitivity: v[6],
            cost_effectiveness: v[7],
            alignment: v[8],
            cognitive_coherence: v[9],
            representativeness_lower: v[10],
            representativeness_upper: v[11],
        }
    }

    /// Sum of all twelve weights.
    pub fn total(&self) -> f64 {
        self.to_array().iter().sum()
    }

    /// Reward weight attached to a per-criterion metric share.
    pub fn for_metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Completeness => self.completeness,
            Metric::Measurability => self.measurability,
            Metric::Sensitivity => self.sensitivity,
            Metric::CostEffectiveness => self.cost_effectiveness,
            Metric::Alignment => self.alignment,
            Metric::CognitiveCoherence => self.cognitive_coherence,
        }
    }

    /// Validates non-negativity and `Σ = 1 ± 1e-9`.
    pub fn validate(&self) -> Result<()> {
        if self.to_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SelectionError::InvalidConfig(
                "weights must be finite and non-negative".into(),
            ));
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SelectionError::InvalidConfig(format!(
                "weights must sum to 1, got {total}"
            )));
        }
        Ok(())
    }
}

/// Configuration for building a [`DecisionModel`](super::DecisionModel).
///
/// ```
/// use u_criteria::selection::{ModelConfig, ParsimonyBand, Thresholds};
///
/// let config = ModelConfig::default()
///     .with_thresholds(Thresholds::default().with_completeness(5.0))
///     .with_parsimony(ParsimonyBand::new(3, 6))
///     .with_epsilon(1e-4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModelConfig {
    pub thresholds: Thresholds,
    pub parsimony: ParsimonyBand,
    pub weights: Weights,

    /// Strictness margin ε: a pair is "below" the distinctiveness threshold
    /// only when `correlation <= δ - ε`.
    pub epsilon: f64,

    /// Global big-M override. `None` derives M per gate family from the
    /// largest metric/threshold gap. An override below the derived value
    /// is raised to it, so a closed gate never forbids `x = 0`.
    pub big_m: Option<f64>,

    /// Margin added to derived big-M values.
    pub big_m_margin: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            parsimony: ParsimonyBand::default(),
            weights: Weights::default(),
            epsilon: 1e-4,
            big_m: None,
            big_m_margin: 1.0,
        }
    }
}

impl ModelConfig {
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_parsimony(mut self, parsimony: ParsimonyBand) -> Self {
        self.parsimony = parsimony;
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.big_m = Some(big_m);
        self
    }

    pub fn with_big_m_margin(mut self, margin: f64) -> Self {
        self.big_m_margin = margin;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.parsimony.validate()?;
        self.weights.validate()?;
        if !(self.epsilon > 0.0 && self.epsilon < 1.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "epsilon must be in (0, 1), got {}",
                self.epsilon
            )));
        }
        if let Some(m) = self.big_m {
            if !(m.is_finite() && m > 0.0) {
                return Err(SelectionError::InvalidConfig(format!(
                    "big_m must be positive and finite, got {m}"
                )));
            }
        }
        if !(self.big_m_margin.is_finite() && self.big_m_margin > 0.0) {
            return Err(SelectionError::InvalidConfig(format!(
                "big_m_margin must be positive, got {}",
                self.big_m_margin
            )));
        }
        Ok(())
    }
}
