//! Query primitives and cost accounting for one trial.
//!
//! A session owns everything mutable about a running trial: the reveal
//! cursors, the trial RNG, and the step/resource counters. Worlds stay
//! untouched; two sessions over clones of the same world share nothing.

use crate::types::{AgentId, ProblemId, Result, SimError};
use crate::world::World;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashSet;

/// Mutable per-trial state around an immutable [`World`].
#[derive(Debug)]
pub struct Session {
    world: World,
    rng: StdRng,

    /// Per-agent count of problems already revealed
    cursors: Vec<usize>,

    /// Problems a solve attempt has been issued for
    attempted: HashSet<ProblemId>,

    steps: u64,
    resources: u64,
}

impl Session {
    pub fn new(world: World, rng: StdRng) -> Self {
        let cursors = vec![0; world.agent_count()];
        Self {
            world,
            rng,
            cursors,
            attempted: HashSet::new(),
            steps: 0,
            resources: 0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Ask `agent` for its most preferred problem it has not yet revealed,
    /// together with the preference value. Costs one step.
    ///
    /// Returns [`SimError::ExhaustedAgent`] once the agent has revealed
    /// every problem; callers route around the agent rather than retry.
    pub fn reveal(&mut self, agent: AgentId) -> Result<(ProblemId, f64)> {
        let cursor = self.cursors[agent];
        if cursor >= self.world.problem_count() {
            return Err(SimError::ExhaustedAgent(agent));
        }
        self.cursors[agent] = cursor + 1;
        self.steps += 1;

        let problem = self.world.reveal_order(agent)[cursor];
        Ok((problem, self.world.preference(agent, problem)))
    }

    /// Put `problem` to a vote of `voters` and report whether the majority
    /// answered correctly. Ties count as incorrect, since a non-majority
    /// cannot be asserted as correct.
    ///
    /// Costs one step per call and one resource unit the first time the
    /// problem is attempted in this trial.
    pub fn solve_attempt(&mut self, problem: ProblemId, voters: &[AgentId]) -> bool {
        self.steps += 1;
        if self.attempted.insert(problem) {
            self.resources += 1;
        }

        let mut correct = 0usize;
        let mut incorrect = 0usize;
        for &voter in voters {
            if self.rng.gen_bool(self.world.expertise(voter, problem)) {
                correct += 1;
            } else {
                incorrect += 1;
            }
        }
        correct > incorrect
    }

    /// How many problems `agent` has revealed so far.
    pub fn revealed_count(&self, agent: AgentId) -> usize {
        self.cursors[agent]
    }

    pub fn is_exhausted(&self, agent: AgentId) -> bool {
        self.cursors[agent] >= self.world.problem_count()
    }

    pub fn was_attempted(&self, problem: ProblemId) -> bool {
        self.attempted.contains(&problem)
    }

    pub fn steps_used(&self) -> u64 {
        self.steps
    }

    pub fn resources_used(&self) -> u64 {
        self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use rand::SeedableRng;

    fn session(agents: usize, problems: usize, seed: u64) -> Session {
        let config = SimConfig::new(agents, problems);
        let mut rng = StdRng::seed_from_u64(seed);
        let world = World::generate(&config, &mut rng).unwrap();
        Session::new(world, rng)
    }

    #[test]
    fn test_reveal_descends_without_repeats() {
        let mut session = session(4, 12, 1);
        let mut seen = HashSet::new();
        let mut previous = f64::INFINITY;
        for _ in 0..12 {
            let (problem, value) = session.reveal(2).unwrap();
            assert!(seen.insert(problem), "problem revealed twice");
            assert!(value < previous, "reveal values must strictly decrease");
            previous = value;
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn test_reveal_exhaustion_is_terminal() {
        let mut session = session(2, 10, 8);
        for _ in 0..10 {
            session.reveal(0).unwrap();
        }
        assert!(session.is_exhausted(0));
        assert!(matches!(session.reveal(0), Err(SimError::ExhaustedAgent(0))));
        // A failed reveal yields no information and costs nothing.
        assert_eq!(session.steps_used(), 10);
        assert!(!session.is_exhausted(1));
    }

    #[test]
    fn test_each_reveal_costs_one_step() {
        let mut session = session(3, 10, 4);
        session.reveal(0).unwrap();
        session.reveal(1).unwrap();
        session.reveal(0).unwrap();
        assert_eq!(session.steps_used(), 3);
        assert_eq!(session.revealed_count(0), 2);
        assert_eq!(session.revealed_count(1), 1);
        assert_eq!(session.revealed_count(2), 0);
    }

    #[test]
    fn test_resources_count_distinct_problems_only() {
        let mut session = session(6, 10, 2);
        let voters: Vec<AgentId> = (0..6).collect();

        session.solve_attempt(3, &voters);
        assert_eq!(session.resources_used(), 1);

        // Repeat attempts cost steps but never another resource unit.
        session.solve_attempt(3, &voters);
        session.solve_attempt(3, &voters);
        assert_eq!(session.resources_used(), 1);
        assert_eq!(session.steps_used(), 3);

        session.solve_attempt(7, &voters);
        assert_eq!(session.resources_used(), 2);
        assert!(session.was_attempted(3));
        assert!(session.was_attempted(7));
        assert!(!session.was_attempted(5));
    }

    #[test]
    fn test_empty_panel_never_carries_a_vote() {
        let mut session = session(3, 10, 6);
        assert!(!session.solve_attempt(0, &[]));
    }
}
