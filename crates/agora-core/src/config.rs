//! Trial configuration and validation.

use crate::types::{Result, SimError, TOP_PROBLEM_COUNT};
use serde::{Deserialize, Serialize};

/// Configuration for a single trial.
///
/// A trial is fully determined by its configuration: the same config always
/// produces the same world, the same votes, and the same result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimConfig {
    /// Number of agents in the population (at least 1)
    pub agent_count: usize,

    /// Number of problems (at least `TOP_PROBLEM_COUNT`)
    pub problem_count: usize,

    /// Skew exponent `k` for expertise draws `uniform(0,1)^k`; higher
    /// values make experts rarer
    pub expertise_exponent: f64,

    /// Minimum expertise for an agent to count as an expert in a problem
    pub competence_threshold: f64,

    /// Additional solve attempts allowed per problem after the first
    pub max_retries: u32,

    /// Seed for the trial's random number generator
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agent_count: 100,
            problem_count: 100,
            expertise_exponent: 4.0,
            competence_threshold: 0.5,
            max_retries: 3,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Create a configuration for the given population and problem count,
    /// with default policy parameters.
    pub fn new(agent_count: usize, problem_count: usize) -> Self {
        Self {
            agent_count,
            problem_count,
            ..Self::default()
        }
    }

    /// Set the expertise skew exponent.
    pub fn with_expertise_exponent(mut self, exponent: f64) -> Self {
        self.expertise_exponent = exponent;
        self
    }

    /// Set the competence threshold for expert selection.
    pub fn with_competence_threshold(mut self, threshold: f64) -> Self {
        self.competence_threshold = threshold;
        self
    }

    /// Set the retry budget for solve attempts.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the trial seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that all policy parameters are usable.
    ///
    /// Population and problem-count bounds are checked at world generation,
    /// since they decide whether a well-formed world exists at all.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.competence_threshold) {
            return Err(SimError::Config(format!(
                "competence_threshold must be within [0, 1], got {}",
                self.competence_threshold
            )));
        }
        if !self.expertise_exponent.is_finite() || self.expertise_exponent <= 0.0 {
            return Err(SimError::Config(format!(
                "expertise_exponent must be finite and positive, got {}",
                self.expertise_exponent
            )));
        }
        Ok(())
    }
}

/// Minimum population size for a well-formed world.
pub(crate) const MIN_AGENTS: usize = 1;

/// Minimum problem count for the top problems to be defined.
pub(crate) const MIN_PROBLEMS: usize = TOP_PROBLEM_COUNT;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = SimConfig::default().with_competence_threshold(1.5);
        assert!(matches!(config.validate(), Err(SimError::Config(_))));

        let config = SimConfig::default().with_competence_threshold(-0.1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exponent_must_be_positive() {
        let config = SimConfig::default().with_expertise_exponent(0.0);
        assert!(config.validate().is_err());

        let config = SimConfig::default().with_expertise_exponent(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = SimConfig::new(20, 15)
            .with_competence_threshold(0.5)
            .with_max_retries(3)
            .with_seed(42);
        assert_eq!(config.agent_count, 20);
        assert_eq!(config.problem_count, 15);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.seed, 42);
    }
}
