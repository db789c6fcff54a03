use banditsim::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("banditsim: Explore-Then-Commit budgets\n");

    let means = vec![0.6, 0.9, 0.95, 0.8, 0.7, 0.3];
    let horizon = 10_000;
    let repeats = 30;

    println!("True means: {:?} (best arm 2)", means);
    println!("{}", "=".repeat(60));
    println!(
        "{:>8} {:>10} {:>14} {:>14}",
        "m", "explore", "final regret", "final std"
    );

    for explore_steps in [0, 5, 25, 100, 400] {
        let config = EtcConfig::new(means.clone(), explore_steps)
            .distribution(RewardDistribution::gaussian());
        let matrix = Simulation::builder()
            .policy(config)
            .horizon(horizon)
            .repeats(repeats)
            .build()?
            .run()?;

        if let Some(summary) = matrix.summary() {
            println!(
                "{:>8} {:>10} {:>14.2} {:>14.2}",
                explore_steps,
                explore_steps * means.len(),
                summary.final_mean,
                summary.final_std
            );
        }
    }

    Ok(())
}
