//! Simulation engine for decentralized collective decision processes.
//!
//! A population of agents holds private per-problem preference and expertise
//! values. The population's goal is to identify its ten most preferred
//! problems and solve them correctly while spending as few query steps
//! (time) and touching as few distinct problems (resources) as possible.
//! This crate provides:
//!
//! - **World generation**: per-agent preference vectors with a unique global
//!   ranking, and power-law-skewed expertise so true experts are rare
//! - **Query primitives**: reveal an agent's next-highest preference, or put
//!   a problem to a probabilistic majority vote
//! - **Orchestration policies**: two-layered, experts-only, and
//!   direct-democracy controllers competing on step and resource cost
//! - **Accounting**: step and resource counters read off a finished trial
//!
//! # Usage
//!
//! ```
//! use agora_core::{run_trial, Algorithm, SimConfig};
//!
//! let config = SimConfig::new(20, 15).with_seed(42);
//! let result = run_trial(&config, Algorithm::TwoLayered).unwrap();
//! assert_eq!(result.resources_used, 10);
//! ```
//!
//! Trials are deterministic given their seed and own all of their state, so
//! independent trials may run concurrently without coordination.

pub mod config;
pub mod discovery;
pub mod orchestrator;
pub mod session;
pub mod solving;
pub mod types;
pub mod world;

// Re-export main types for convenience
pub use config::SimConfig;
pub use orchestrator::run_trial;
pub use session::Session;
pub use types::{
    AgentId, Algorithm, ProblemId, ProblemOutcome, Result, SimError, TrialResult,
    TOP_PROBLEM_COUNT,
};
pub use world::World;
