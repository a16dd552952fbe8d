//! Criterion benchmarks for the TSP genetic algorithm.
//!
//! Uses random symmetric instances so the numbers measure operator and
//! evaluation overhead rather than any particular geometry.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tsp_ga::ga::operators::{cycle_crossover, order_crossover, pmx_crossover};
use tsp_ga::ga::{Cost, Tour};
use tsp_ga::{CrossoverStrategy, DistanceMatrix, FitnessEvaluator, GaConfig, GaRunner};

fn random_matrix(n: usize, seed: u64) -> DistanceMatrix {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rows = vec![vec![0 as Cost; n]; n];
    for i in 0..n {
        for j in 0..i {
            let d = rng.random_range(1..1000);
            rows[i][j] = d;
            rows[j][i] = d;
        }
    }
    DistanceMatrix::from_rows(rows).expect("valid matrix")
}

fn bench_crossover(c: &mut Criterion) {
    let mut group = c.benchmark_group("crossover");

    for &n in &[20usize, 100, 500] {
        let mut rng = StdRng::seed_from_u64(42);
        let p1 = Tour::random(n, &mut rng);
        let p2 = Tour::random(n, &mut rng);
        let (a, b) = (p1.cities(), p2.cities());

        group.bench_with_input(BenchmarkId::new("pmx", n), &n, |bench, _| {
            bench.iter(|| pmx_crossover(black_box(a), black_box(b), &mut rng))
        });
        group.bench_with_input(BenchmarkId::new("ox", n), &n, |bench, _| {
            bench.iter(|| order_crossover(black_box(a), black_box(b), &mut rng))
        });
        group.bench_with_input(BenchmarkId::new("cx", n), &n, |bench, _| {
            bench.iter(|| cycle_crossover(black_box(a), black_box(b), &mut rng))
        });
    }
    group.finish();
}

fn bench_fitness(c: &mut Criterion) {
    let mut group = c.benchmark_group("fitness");

    for &n in &[50usize, 200] {
        let matrix = random_matrix(n, 7);
        let evaluator = FitnessEvaluator::new(&matrix);
        let mut rng = StdRng::seed_from_u64(1);
        let population: Vec<Tour> = (0..200).map(|_| Tour::random(n, &mut rng)).collect();

        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, n), &population, |bench, pop| {
                bench.iter_batched(
                    || pop.clone(),
                    |mut pop| evaluator.evaluate_population(&mut pop, parallel),
                    criterion::BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("ga_run");
    group.sample_size(10);

    for (n, pop, gen) in [(20usize, 50usize, 100usize), (50, 100, 50), (100, 100, 30)] {
        let matrix = random_matrix(n, 3);
        for strategy in CrossoverStrategy::ALL {
            let config = GaConfig::new(pop, gen)
                .with_strategy(strategy)
                .with_seed(42)
                .with_report_interval(gen);
            group.bench_with_input(
                BenchmarkId::new(format!("{strategy}_n{n}_p{pop}_g{gen}"), n),
                &(&matrix, config),
                |b, (m, c)| {
                    b.iter(|| {
                        let result = GaRunner::run(black_box(m), black_box(c));
                        black_box(result)
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_crossover, bench_fitness, bench_run);
criterion_main!(benches);
