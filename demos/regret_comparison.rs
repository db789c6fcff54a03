use banditsim::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("banditsim: EXP3 variant comparison\n");
    println!("{}", "=".repeat(60));

    // Ten arms at 0.5, one nudged up by delta and one down.
    let delta = 0.1;
    let mut means = vec![0.5; 10];
    means[8] += delta;
    means[9] -= delta;

    let horizon = 20_000;
    let repeats = 16;
    let learning_rate = 0.01;

    println!("True means: {:?}", means);
    println!("Horizon: {horizon}, repeats: {repeats}, eta: {learning_rate}");
    println!(
        "Arm 9 jumps to {:.2} after round {}\n",
        0.5 + 4.0 * delta,
        horizon / 2
    );
    println!("{}", "=".repeat(60));

    for distribution in [RewardDistribution::Bernoulli, RewardDistribution::gaussian()] {
        println!("\nRewards: {distribution}");
        println!("{}", "-".repeat(60));
        println!(
            "{:<16} {:>14} {:>14} {:>12}",
            "algorithm", "final regret", "final std", "mean std"
        );

        for variant in Exp3Variant::ALL {
            let config = Exp3Config::new(means.clone(), learning_rate)
                .variant(variant)
                .distribution(distribution)
                .shift(MeanShift {
                    after_round: horizon / 2,
                    arm: 9,
                    delta: 5.0 * delta,
                });

            let matrix = Simulation::builder()
                .policy(config)
                .horizon(horizon)
                .repeats(repeats)
                .build()?
                .run()?;

            if let Some(summary) = matrix.summary() {
                println!(
                    "{:<16} {:>14.2} {:>14.2} {:>12.2}",
                    variant.name(),
                    summary.final_mean,
                    summary.final_std,
                    summary.mean_std
                );
            }
        }
    }

    Ok(())
}
