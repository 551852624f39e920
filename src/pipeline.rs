//! End-to-end selection run.
//!
//! Stages pass immutable value objects:
//! `CapturedInputs → (AggregatedMetrics, CoverageMatrix) → DecisionModel →
//! SelectionResult`. Nothing is cached between runs, so what-if reweighting
//! is a second call with a different [`ModelConfig`].

use crate::aggregation::{AggregatedMetrics, AggregationEngine, CapturedInputs, SensitivityConfig};
use crate::coverage::{CoverageBuilder, CoverageMatrix};
use crate::error::Result;
use crate::milp::{select_backend, MilpSolver, SolverConfig};
use crate::selection::{DecisionModel, ModelConfig, ScreeningReport, SelectionResult, SubsetSearch};
use tracing::info;

/// Which backend solves the assembled model.
#[derive(Clone, Copy)]
pub enum Backend<'a> {
    /// The exhaustive [`SubsetSearch`].
    Reference,
    /// First available backend, in preference order.
    External(&'a [&'a dyn MilpSolver]),
}

/// Configuration of every stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub sensitivity: SensitivityConfig,
    pub model: ModelConfig,
    pub solver: SolverConfig,
}

impl PipelineConfig {
    pub fn with_sensitivity(mut self, sensitivity: SensitivityConfig) -> Self {
        self.sensitivity = sensitivity;
        self
    }

    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.sensitivity.validate()?;
        self.model.validate()?;
        self.solver.validate()
    }
}

/// Everything a presentation layer needs from one run.
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub metrics: AggregatedMetrics,
    pub coverage: CoverageMatrix,
    pub screening: ScreeningReport,
    pub result: SelectionResult,
}

/// Runs aggregation, coverage, model assembly and solving.
///
/// # Examples
///
/// ```ignore
/// let pipeline = SelectionPipeline::new(PipelineConfig::default())?;
/// let outcome = pipeline.run(&inputs, Backend::Reference)?;
/// if outcome.result.is_optimal() {
///     println!("{:?}", outcome.result.selected_ids);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SelectionPipeline {
    config: PipelineConfig,
}

impl SelectionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Aggregates judgments and consolidates the coverage matrix.
    pub fn prepare(&self, inputs: &CapturedInputs) -> Result<(AggregatedMetrics, CoverageMatrix)> {
        let engine = AggregationEngine::new(inputs, self.config.sensitivity.clone())?;
        let metrics = engine.aggregate()?;
        let coverage = CoverageBuilder::from_inputs(inputs)?.build()?;
        Ok((metrics, coverage))
    }

    /// Builds a fresh model from prepared inputs.
    pub fn build(
        &self,
        metrics: &AggregatedMetrics,
        coverage: &CoverageMatrix,
    ) -> Result<DecisionModel> {
        DecisionModel::build(metrics, coverage, &self.config.model)
    }

    /// Runs every stage.
    ///
    /// Fails on structurally invalid inputs and when no backend is
    /// available. Infeasible or non-optimal solves are returned in
    /// [`SelectionResult::termination`].
    pub fn run(&self, inputs: &CapturedInputs, backend: Backend<'_>) -> Result<SelectionOutcome> {
        let (metrics, coverage) = self.prepare(inputs)?;
        let model = self.build(&metrics, &coverage)?;

        let result = match backend {
            Backend::Reference => {
                let search = SubsetSearch::new(&model);
                model.solve(&search, &self.config.solver)?
            }
            Backend::External(candidates) => {
                let solver = select_backend(candidates)?;
                model.solve(solver, &self.config.solver)?
            }
        };
        info!(
            selected = result.selected_ids.len(),
            termination = ?result.termination,
            "selection run complete"
        );

        Ok(SelectionOutcome {
            metrics,
            coverage,
            screening: model.screening().clone(),
            result,
        })
    }
}
