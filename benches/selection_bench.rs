//! Criterion benchmarks for u-criteria.
//!
//! Uses synthetic candidate pools to measure model assembly, Monte Carlo
//! sensitivity and the exhaustive reference backend.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_criteria::aggregation::{
    estimate_elasticity, AggregatedMetrics, Criterion as Candidate, Direction, ObjectiveSpec,
    Pair, PropertyScores, SensitivityConfig,
};
use u_criteria::coverage::CoverageMatrix;
use u_criteria::milp::SolverConfig;
use u_criteria::selection::{DecisionModel, ModelConfig, ParsimonyBand, SubsetSearch};

// ===========================================================================
// Synthetic pools
// ===========================================================================

fn pool(n: usize) -> (AggregatedMetrics, CoverageMatrix) {
    let ids: Vec<String> = (0..n).map(|i| format!("C{i}")).collect();
    let criteria = ids
        .iter()
        .enumerate()
        .map(|(i, id)| Candidate {
            id: id.clone(),
            name: id.clone(),
            direction: if i % 3 == 0 {
                Direction::Cost
            } else {
                Direction::Benefit
            },
            scores: PropertyScores {
                completeness: 6.0 + (i % 4) as f64,
                measurability: 7.0 + (i % 3) as f64,
                sensitivity: 1.0 / n as f64,
                cost_effectiveness: 7.0 + (i % 2) as f64,
                alignment: 7.0,
                cognitive_coherence: 7.5,
            },
            objective: i % 2 == 0,
            monotone: true,
        })
        .collect();
    let mut pairs = Vec::new();
    for i in 0..n {
        for k in (i + 1)..n {
            let corr = ((i * 7 + k * 13) % 100) as f64 / 100.0;
            pairs.push(Pair::new(ids[i].clone(), ids[k].clone(), corr));
        }
    }
    let specs = vec![
        ObjectiveSpec::new("O1", "Cost", 1, 3),
        ObjectiveSpec::new("O2", "Quality", 1, 3),
        ObjectiveSpec::new("O3", "Service", 1, 3),
    ];
    let rows = (0..n).map(|i| (0..3).map(|o| i % 3 == o).collect()).collect();
    let coverage = CoverageMatrix::from_consolidated(rows, &specs).expect("valid pool");
    (AggregatedMetrics { criteria, pairs }, coverage)
}

fn config(n: usize) -> ModelConfig {
    ModelConfig::default().with_parsimony(ParsimonyBand::new(3, (n as u32 / 2).max(3)))
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_model_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_build");
    for n in [10usize, 30, 60] {
        let (metrics, coverage) = pool(n);
        let cfg = config(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let model = DecisionModel::build(black_box(&metrics), black_box(&coverage), &cfg);
                black_box(model)
            })
        });
    }
    group.finish();
}

fn bench_sensitivity(c: &mut Criterion) {
    let mut group = c.benchmark_group("sensitivity");
    group.sample_size(10);

    for (criteria, alternatives, experts) in [(5usize, 4usize, 3usize), (15, 8, 5)] {
        let matrices: Vec<Vec<Vec<f64>>> = (0..experts)
            .map(|e| {
                (0..alternatives)
                    .map(|a| {
                        (0..criteria)
                            .map(|j| ((a * 31 + j * 17 + e * 7) % 10) as f64)
                            .collect()
                    })
                    .collect()
            })
            .collect();
        let directions = vec![Direction::Benefit; criteria];
        let cfg = SensitivityConfig::default().with_simulations(1000);
        group.bench_with_input(
            BenchmarkId::new(format!("c{criteria}_a{alternatives}_e{experts}"), criteria),
            &(matrices, directions),
            |b, (m, d)| {
                b.iter(|| {
                    let result = estimate_elasticity(black_box(m), black_box(d), &cfg);
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

fn bench_subset_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("subset_search");
    group.sample_size(10);

    for n in [8usize, 12] {
        let (metrics, coverage) = pool(n);
        let model = DecisionModel::build(&metrics, &coverage, &config(n)).expect("valid model");
        let search = SubsetSearch::new(&model);
        let solver = SolverConfig::default().without_time_limit();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let result = model.solve(black_box(&search), &solver);
                black_box(result)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_model_build, bench_sensitivity, bench_subset_search);
criterion_main!(benches);
