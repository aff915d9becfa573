//! Common types used across the simulation engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable index identifying an agent within a trial's population.
pub type AgentId = usize;

/// Stable index identifying a problem.
pub type ProblemId = usize;

/// Number of globally preferred problems a trial must resolve.
pub const TOP_PROBLEM_COUNT: usize = 10;

/// The orchestration policy driving a trial.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Survey preferences first, then ask only the experts in the
    /// discovered top problems to solve them.
    TwoLayered,
    /// Skip preference discovery and ask the experts in every problem.
    ExpertsOnly,
    /// Survey preferences first, then put each top problem to a vote of
    /// the whole population.
    DirectDemocracy,
}

impl Algorithm {
    /// All policies, in comparison order.
    pub const ALL: [Algorithm; 3] = [
        Algorithm::TwoLayered,
        Algorithm::ExpertsOnly,
        Algorithm::DirectDemocracy,
    ];

    /// Canonical name, as reported in trial results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::TwoLayered => "two-layered",
            Algorithm::ExpertsOnly => "experts-only",
            Algorithm::DirectDemocracy => "direct-democracy",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "two-layered" => Ok(Algorithm::TwoLayered),
            "experts-only" => Ok(Algorithm::ExpertsOnly),
            "direct-democracy" => Ok(Algorithm::DirectDemocracy),
            other => Err(SimError::Config(format!("unknown algorithm: {other}"))),
        }
    }
}

/// Recorded result of resolving (or failing to resolve) one problem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProblemOutcome {
    /// The problem that was put to a vote
    pub problem: ProblemId,

    /// Whether a majority answered correctly within the retry budget
    pub solved_correctly: bool,
}

/// Result of one complete trial.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrialResult {
    /// The policy that produced this result
    pub algorithm: Algorithm,

    /// Query primitive invocations issued over the whole trial
    pub steps_used: u64,

    /// Distinct problems a solve attempt was issued for
    pub resources_used: u64,

    /// Per-problem outcomes, in the order the policy attempted them
    pub outcomes: Vec<ProblemOutcome>,
}

impl TrialResult {
    /// Fraction of attempted problems that were solved correctly.
    pub fn solve_rate(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        let solved = self.outcomes.iter().filter(|o| o.solved_correctly).count();
        solved as f64 / self.outcomes.len() as f64
    }
}

/// Error types for simulation operations.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("world generation failed: {0}")]
    Generation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("agent {0} has no unrevealed problems left")]
    ExhaustedAgent(AgentId),

    #[error("problem {problem} not solved within {budget} retries")]
    RetryBudgetExceeded { problem: ProblemId, budget: u32 },
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_names_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.as_str().parse::<Algorithm>().unwrap(), algorithm);
        }
        assert!("oligarchy".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_solve_rate() {
        let result = TrialResult {
            algorithm: Algorithm::TwoLayered,
            steps_used: 12,
            resources_used: 4,
            outcomes: vec![
                ProblemOutcome { problem: 3, solved_correctly: true },
                ProblemOutcome { problem: 7, solved_correctly: false },
                ProblemOutcome { problem: 1, solved_correctly: true },
                ProblemOutcome { problem: 9, solved_correctly: true },
            ],
        };
        assert_eq!(result.solve_rate(), 0.75);
    }
}
