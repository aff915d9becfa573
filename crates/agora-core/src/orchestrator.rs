//! The three orchestration policies and the trial entry point.
//!
//! Each policy drives a [`Session`] through a sequence of query primitives
//! and records a per-problem outcome for everything it attempts. Recoverable
//! conditions (exhausted agents, blown retry budgets) shape the outcomes;
//! only invalid configuration aborts a trial.

use crate::config::SimConfig;
use crate::discovery::discover_top_problems;
use crate::session::Session;
use crate::solving::{expert_panel, resolve_problem};
use crate::types::{Algorithm, ProblemOutcome, Result, TrialResult, TOP_PROBLEM_COUNT};
use crate::world::World;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Run one complete trial of `algorithm` under `config`.
///
/// The world, every vote, and therefore the whole result are determined by
/// `config.seed`; trials with different seeds share no state and can run in
/// parallel freely.
pub fn run_trial(config: &SimConfig, algorithm: Algorithm) -> Result<TrialResult> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let world = World::generate(config, &mut rng)?;
    let mut session = Session::new(world, rng);

    let outcomes = match algorithm {
        Algorithm::TwoLayered => two_layered(&mut session, config),
        Algorithm::ExpertsOnly => experts_only(&mut session, config),
        Algorithm::DirectDemocracy => direct_democracy(&mut session, config),
    };

    let result = TrialResult {
        algorithm,
        steps_used: session.steps_used(),
        resources_used: session.resources_used(),
        outcomes,
    };
    info!(
        algorithm = %result.algorithm,
        steps = result.steps_used,
        resources = result.resources_used,
        solve_rate = result.solve_rate(),
        "trial finished"
    );
    Ok(result)
}

/// Discover the top problems, then hand each one to its expert panel.
pub(crate) fn two_layered(session: &mut Session, config: &SimConfig) -> Vec<ProblemOutcome> {
    let targets = discover_top_problems(session, TOP_PROBLEM_COUNT);
    debug!(?targets, "entering expert solving phase");

    targets
        .into_iter()
        .map(|problem| {
            let panel = expert_panel(session.world(), problem, config.competence_threshold);
            let solved = resolve_problem(session, problem, &panel, config.max_retries).is_ok();
            ProblemOutcome {
                problem,
                solved_correctly: solved,
            }
        })
        .collect()
}

/// Ignore preferences entirely and work through every problem in index
/// order with its expert panel.
pub(crate) fn experts_only(session: &mut Session, config: &SimConfig) -> Vec<ProblemOutcome> {
    let problems = session.world().problem_count();

    (0..problems)
        .map(|problem| {
            let panel = expert_panel(session.world(), problem, config.competence_threshold);
            let solved = resolve_problem(session, problem, &panel, config.max_retries).is_ok();
            ProblemOutcome {
                problem,
                solved_correctly: solved,
            }
        })
        .collect()
}

/// Discover the top problems, then put each to a vote of the entire
/// population. Failing to solve some or all of them is an expected,
/// reportable outcome under a skewed expertise distribution.
pub(crate) fn direct_democracy(session: &mut Session, config: &SimConfig) -> Vec<ProblemOutcome> {
    let targets = discover_top_problems(session, TOP_PROBLEM_COUNT);
    let everyone: Vec<_> = (0..session.world().agent_count()).collect();
    debug!(?targets, voters = everyone.len(), "entering whole-population voting phase");

    targets
        .into_iter()
        .map(|problem| {
            let solved = resolve_problem(session, problem, &everyone, config.max_retries).is_ok();
            ProblemOutcome {
                problem,
                solved_correctly: solved,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn scenario() -> SimConfig {
        SimConfig::new(20, 15)
            .with_expertise_exponent(4.0)
            .with_competence_threshold(0.5)
            .with_max_retries(3)
            .with_seed(42)
    }

    fn true_top_set(config: &SimConfig) -> HashSet<usize> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let world = World::generate(config, &mut rng).unwrap();
        world.top_problems(TOP_PROBLEM_COUNT).into_iter().collect()
    }

    #[test]
    fn test_two_layered_touches_only_the_true_top_problems() {
        let config = scenario();
        let result = run_trial(&config, Algorithm::TwoLayered).unwrap();

        assert_eq!(result.resources_used, 10);
        assert_eq!(result.outcomes.len(), 10);

        let attempted: HashSet<usize> = result.outcomes.iter().map(|o| o.problem).collect();
        assert_eq!(attempted, true_top_set(&config));
    }

    #[test]
    fn test_experts_only_touches_every_problem() {
        let config = scenario();
        let result = run_trial(&config, Algorithm::ExpertsOnly).unwrap();

        assert_eq!(result.resources_used, 15);
        let attempted: Vec<usize> = result.outcomes.iter().map(|o| o.problem).collect();
        assert_eq!(attempted, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn test_experts_only_issues_no_reveals() {
        let config = scenario();
        let mut rng = StdRng::seed_from_u64(config.seed);
        let world = World::generate(&config, &mut rng).unwrap();
        let mut session = Session::new(world, rng);

        let outcomes = experts_only(&mut session, &config);

        for agent in 0..config.agent_count {
            assert_eq!(session.revealed_count(agent), 0);
        }
        // Every step was a solve attempt, bounded by the retry budget.
        assert!(session.steps_used() >= 15);
        assert!(session.steps_used() <= 15 * (1 + config.max_retries as u64));
        assert_eq!(outcomes.len(), 15);
    }

    #[test]
    fn test_direct_democracy_failures_are_outcomes_not_errors() {
        let config = scenario();
        let result = run_trial(&config, Algorithm::DirectDemocracy).unwrap();

        assert_eq!(result.outcomes.len(), 10);
        assert_eq!(result.resources_used, 10);
        // Unsolved problems are recorded, never raised.
        for outcome in &result.outcomes {
            assert!(outcome.problem < 15);
        }
    }

    #[test]
    fn test_trials_are_deterministic_given_seed() {
        let config = scenario();
        for algorithm in Algorithm::ALL {
            let first = run_trial(&config, algorithm).unwrap();
            let second = run_trial(&config, algorithm).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_invalid_configuration_aborts_before_simulation() {
        let config = scenario().with_competence_threshold(1.5);
        assert!(run_trial(&config, Algorithm::TwoLayered).is_err());
    }

    #[test]
    fn test_single_agent_population() {
        let config = SimConfig::new(1, 15).with_seed(7);
        let result = run_trial(&config, Algorithm::TwoLayered).unwrap();
        assert_eq!(result.resources_used, 10);

        // The global ranking is the lone agent's own ranking.
        let mut rng = StdRng::seed_from_u64(7);
        let world = World::generate(&config, &mut rng).unwrap();
        let attempted: HashSet<usize> = result.outcomes.iter().map(|o| o.problem).collect();
        let own_top: HashSet<usize> = world.top_problems(10).into_iter().collect();
        assert_eq!(attempted, own_top);
    }

    #[test]
    fn test_expert_panels_outvote_direct_democracy() {
        // Statistical property: under x^4 expertise, whole-population
        // majorities almost never answer correctly, while expert panels
        // usually do. Averaged over many seeds the gap is wide.
        let trials = 30;
        let mut expert_rate = 0.0;
        let mut democracy_rate = 0.0;

        for seed in 0..trials {
            let config = SimConfig::new(30, 12).with_max_retries(2).with_seed(seed);
            expert_rate += run_trial(&config, Algorithm::TwoLayered).unwrap().solve_rate();
            democracy_rate += run_trial(&config, Algorithm::DirectDemocracy)
                .unwrap()
                .solve_rate();
        }
        expert_rate /= trials as f64;
        democracy_rate /= trials as f64;

        assert!(
            expert_rate > democracy_rate + 0.3,
            "expected a wide gap, got experts {expert_rate:.2} vs democracy {democracy_rate:.2}"
        );
    }
}
