use agora_core::{run_trial, Algorithm, SimConfig, TrialResult};
use anyhow::{bail, Result};
use clap::Parser;
use serde_json::json;
use tracing::info;

/// Run batches of collective decision trials and report step and resource
/// costs per orchestration policy.
#[derive(Debug, Parser)]
#[command(name = "agora", version, about)]
struct Cli {
    /// Number of agents in the population
    #[arg(long, default_value_t = 100)]
    agents: usize,

    /// Number of problems
    #[arg(long, default_value_t = 100)]
    problems: usize,

    /// Expertise skew exponent k (expertise = uniform^k)
    #[arg(long, default_value_t = 4.0)]
    exponent: f64,

    /// Competence threshold for expert panels
    #[arg(long, default_value_t = 0.5)]
    threshold: f64,

    /// Solve re-attempts allowed per problem after the first
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Seed of the first trial; trial i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Trials to run per algorithm
    #[arg(long, default_value_t = 100)]
    trials: u64,

    /// Algorithm to run: two-layered, experts-only, direct-democracy, or all
    #[arg(long, default_value = "all")]
    algorithm: String,

    /// Emit results as JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Aggregated statistics over one algorithm's batch of trials.
#[derive(Debug)]
struct BatchStats {
    algorithm: Algorithm,
    trials: u64,
    mean_steps: f64,
    min_steps: u64,
    max_steps: u64,
    mean_resources: f64,
    mean_solve_rate: f64,
    /// Trials that left at least one attempted problem unsolved
    incomplete_trials: u64,
}

impl BatchStats {
    fn from_results(algorithm: Algorithm, results: &[TrialResult]) -> Self {
        let trials = results.len() as u64;
        let steps: Vec<u64> = results.iter().map(|r| r.steps_used).collect();
        let mean = |total: u64| total as f64 / trials as f64;

        Self {
            algorithm,
            trials,
            mean_steps: mean(steps.iter().sum()),
            min_steps: steps.iter().copied().min().unwrap_or(0),
            max_steps: steps.iter().copied().max().unwrap_or(0),
            mean_resources: mean(results.iter().map(|r| r.resources_used).sum()),
            mean_solve_rate: results.iter().map(|r| r.solve_rate()).sum::<f64>()
                / trials as f64,
            incomplete_trials: results
                .iter()
                .filter(|r| r.outcomes.iter().any(|o| !o.solved_correctly))
                .count() as u64,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    if cli.trials == 0 {
        bail!("--trials must be at least 1");
    }

    let algorithms: Vec<Algorithm> = if cli.algorithm == "all" {
        Algorithm::ALL.to_vec()
    } else {
        vec![cli.algorithm.parse()?]
    };

    let base = SimConfig::new(cli.agents, cli.problems)
        .with_expertise_exponent(cli.exponent)
        .with_competence_threshold(cli.threshold)
        .with_max_retries(cli.retries);

    let mut batches = Vec::new();
    for algorithm in algorithms {
        info!(%algorithm, trials = cli.trials, "running batch");
        let results: Vec<TrialResult> = (0..cli.trials)
            .map(|i| run_trial(&base.clone().with_seed(cli.seed + i), algorithm))
            .collect::<agora_core::Result<_>>()?;
        batches.push(BatchStats::from_results(algorithm, &results));
    }

    if cli.json {
        let payload: Vec<_> = batches
            .iter()
            .map(|b| {
                json!({
                    "algorithm": b.algorithm.as_str(),
                    "trials": b.trials,
                    "mean_steps": b.mean_steps,
                    "min_steps": b.min_steps,
                    "max_steps": b.max_steps,
                    "mean_resources": b.mean_resources,
                    "mean_solve_rate": b.mean_solve_rate,
                    "incomplete_trials": b.incomplete_trials,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for b in &batches {
            println!(
                "{:<17} trials {:>5}  steps mean {:>9.1} (min {}, max {})  \
                 resources mean {:>7.1}  solve rate {:>5.1}%  incomplete {}",
                b.algorithm,
                b.trials,
                b.mean_steps,
                b.min_steps,
                b.max_steps,
                b.mean_resources,
                b.mean_solve_rate * 100.0,
                b.incomplete_trials,
            );
        }
    }

    Ok(())
}
