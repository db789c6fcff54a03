use banditsim::prelude::*;
use banditsim::{RewardSource, run_policy};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::SeedableRng;
use std::hint::black_box;

fn skewed_means(n: usize) -> Vec<f64> {
    let mut means = vec![0.5; n];
    means[n - 2] += 0.1;
    means[n - 1] -= 0.1;
    means
}

fn bench_reward_sampling(c: &mut Criterion) {
    let mut group = c.benchmark_group("reward_sampling");

    for n_arms in [10, 25, 50].iter() {
        let means = skewed_means(*n_arms);
        let arms = banditsim::ArmMeans::new(means.clone()).unwrap();
        for distribution in [RewardDistribution::Bernoulli, RewardDistribution::gaussian()] {
            let source = RewardSource::new(distribution, &arms).unwrap();
            let mut rng = rand::rngs::StdRng::seed_from_u64(42);
            group.bench_with_input(
                BenchmarkId::new(distribution.to_string(), n_arms),
                &means,
                |b, means| b.iter(|| black_box(source.sample(means, &mut rng))),
            );
        }
    }

    group.finish();
}

fn bench_policy_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("policy_step");

    for n_arms in [10, 25, 50].iter() {
        for variant in Exp3Variant::ALL {
            group.bench_with_input(BenchmarkId::new(variant.name(), n_arms), n_arms, |b, &n| {
                let config = Exp3Config::new(skewed_means(n), 0.01).variant(variant);
                let mut policy = Exp3::new(config).unwrap();
                let mut rng = rand::rngs::StdRng::seed_from_u64(42);
                b.iter(|| black_box(policy.step(&mut rng).unwrap()));
            });
        }

        group.bench_with_input(BenchmarkId::new("etc", n_arms), n_arms, |b, &n| {
            let mut policy = Etc::new(EtcConfig::new(skewed_means(n), 20)).unwrap();
            let mut rng = rand::rngs::StdRng::seed_from_u64(42);
            b.iter(|| black_box(policy.step(&mut rng).unwrap()));
        });
    }

    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");

    for horizon in [1_000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("exp3", horizon), horizon, |b, &h| {
            let config = PolicyConfig::from(Exp3Config::new(skewed_means(10), 0.01));
            b.iter_batched(
                || (config.build().unwrap(), rand::rngs::StdRng::seed_from_u64(0)),
                |(mut policy, mut rng)| {
                    run_policy(policy.as_mut(), h, &mut rng).unwrap();
                    black_box(policy.regret().total())
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn bench_simulation(c: &mut Criterion) {
    c.bench_function("simulation_8x2000", |b| {
        let config =
            Exp3Config::new(skewed_means(10), 0.01).variant(Exp3Variant::ImplicitExploration);
        let simulation = Simulation::builder()
            .policy(config)
            .horizon(2_000)
            .repeats(8)
            .build()
            .unwrap();
        b.iter(|| black_box(simulation.run().unwrap().summary()));
    });
}

criterion_group!(
    benches,
    bench_reward_sampling,
    bench_policy_step,
    bench_full_run,
    bench_simulation
);
criterion_main!(benches);
