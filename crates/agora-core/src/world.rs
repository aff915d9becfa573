//! Ground-truth world generation.
//!
//! A world is the immutable data model a trial runs against: a preference
//! matrix and an expertise matrix over the full agent-by-problem space.
//! Orchestrators never read it directly; they only see it through the query
//! primitives in [`crate::session`] and the expert-membership query below.

use crate::config::{SimConfig, MIN_AGENTS, MIN_PROBLEMS};
use crate::types::{AgentId, ProblemId, Result, SimError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Immutable ground truth for one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    /// `preferences[agent][problem]`, strictly positive, globally unique
    preferences: Vec<Vec<f64>>,

    /// `expertise[agent][problem]` in `[0, 1)`, the probability of a
    /// correct vote
    expertise: Vec<Vec<f64>>,

    /// Per-agent problem indices in descending preference order; drives
    /// the reveal primitive
    reveal_order: Vec<Vec<ProblemId>>,
}

impl World {
    /// Generate a world from the given configuration.
    ///
    /// Each problem is assigned one of the distinct totals `1.0..=P` and
    /// that total is split across agents by random fractions, so global
    /// preference scores are unique by construction. Individual entries
    /// are re-drawn on the (measure-zero) chance of a collision, keeping
    /// the reveal order a strict total order.
    pub fn generate(config: &SimConfig, rng: &mut StdRng) -> Result<World> {
        let agents = config.agent_count;
        let problems = config.problem_count;

        if agents < MIN_AGENTS {
            return Err(SimError::Generation(format!(
                "population must hold at least {MIN_AGENTS} agent, got {agents}"
            )));
        }
        if problems < MIN_PROBLEMS {
            return Err(SimError::Generation(format!(
                "at least {MIN_PROBLEMS} problems are needed for a top-{MIN_PROBLEMS} to exist, got {problems}"
            )));
        }

        let mut totals: Vec<f64> = (1..=problems).map(|t| t as f64).collect();
        totals.shuffle(rng);

        let mut preferences = vec![vec![0.0; problems]; agents];
        let mut seen = HashSet::with_capacity(agents * problems);
        for (problem, &total) in totals.iter().enumerate() {
            let shares = loop {
                let fractions: Vec<f64> = (0..agents).map(|_| rng.gen::<f64>()).collect();
                let denom: f64 = fractions.iter().sum();
                if denom == 0.0 {
                    continue;
                }
                let shares: Vec<f64> = fractions.iter().map(|f| f / denom * total).collect();
                if unique_positive(&shares, &seen) {
                    break shares;
                }
            };
            for (agent, &share) in shares.iter().enumerate() {
                seen.insert(share.to_bits());
                preferences[agent][problem] = share;
            }
        }

        let k = config.expertise_exponent;
        let expertise: Vec<Vec<f64>> = (0..agents)
            .map(|_| (0..problems).map(|_| rng.gen::<f64>().powf(k)).collect())
            .collect();

        let reveal_order = preferences
            .iter()
            .map(|prefs| {
                let mut order: Vec<ProblemId> = (0..problems).collect();
                order.sort_by(|&x, &y| prefs[y].total_cmp(&prefs[x]));
                order
            })
            .collect();

        let world = World {
            preferences,
            expertise,
            reveal_order,
        };

        let scores: HashSet<u64> = world.global_scores().iter().map(|s| s.to_bits()).collect();
        if scores.len() != problems {
            return Err(SimError::Generation(
                "global preference scores collided; ranking would be ambiguous".into(),
            ));
        }

        Ok(world)
    }

    pub fn agent_count(&self) -> usize {
        self.preferences.len()
    }

    pub fn problem_count(&self) -> usize {
        self.reveal_order[0].len()
    }

    /// An agent's preference for a problem. Ground truth; reachable by
    /// orchestrators only through the reveal primitive.
    pub fn preference(&self, agent: AgentId, problem: ProblemId) -> f64 {
        self.preferences[agent][problem]
    }

    /// An agent's probability of voting correctly on a problem.
    pub(crate) fn expertise(&self, agent: AgentId, problem: ProblemId) -> f64 {
        self.expertise[agent][problem]
    }

    pub(crate) fn reveal_order(&self, agent: AgentId) -> &[ProblemId] {
        &self.reveal_order[agent]
    }

    /// Global preference score per problem: the column sums of the
    /// preference matrix.
    pub fn global_scores(&self) -> Vec<f64> {
        let mut scores = vec![0.0; self.problem_count()];
        for prefs in &self.preferences {
            for (problem, &value) in prefs.iter().enumerate() {
                scores[problem] += value;
            }
        }
        scores
    }

    /// All problems ranked by descending global preference score.
    pub fn ranking(&self) -> Vec<ProblemId> {
        let scores = self.global_scores();
        let mut order: Vec<ProblemId> = (0..self.problem_count()).collect();
        order.sort_by(|&x, &y| scores[y].total_cmp(&scores[x]));
        order
    }

    /// The `n` most preferred problems, best first.
    pub fn top_problems(&self, n: usize) -> Vec<ProblemId> {
        let mut order = self.ranking();
        order.truncate(n);
        order
    }

    /// Agents whose expertise in `problem` meets the threshold.
    ///
    /// This is the one expertise query the engine exposes: policies learn
    /// panel membership, never the underlying values.
    pub fn experts_for(&self, problem: ProblemId, threshold: f64) -> Vec<AgentId> {
        (0..self.agent_count())
            .filter(|&agent| self.expertise[agent][problem] >= threshold)
            .collect()
    }
}

fn unique_positive(shares: &[f64], seen: &HashSet<u64>) -> bool {
    let mut local = HashSet::with_capacity(shares.len());
    shares
        .iter()
        .all(|&s| s > 0.0 && !seen.contains(&s.to_bits()) && local.insert(s.to_bits()))
}
