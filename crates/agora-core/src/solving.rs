//! Phase-2 solving: voter panel selection and the bounded-retry vote loop.

use crate::session::Session;
use crate::types::{AgentId, ProblemId, Result, SimError};
use crate::world::World;
use tracing::debug;

/// Voters for a problem under an expert-restricted policy: every agent at
/// or above the competence threshold, or the whole population when the
/// problem has no expert at all, so no problem is left without a panel.
pub fn expert_panel(world: &World, problem: ProblemId, threshold: f64) -> Vec<AgentId> {
    let experts = world.experts_for(problem, threshold);
    if experts.is_empty() {
        (0..world.agent_count()).collect()
    } else {
        experts
    }
}

/// Put `problem` to repeated votes of `voters` until a majority answers
/// correctly, allowing `max_retries` re-attempts after the first.
///
/// Exceeding the budget is a per-problem outcome, not a trial failure;
/// callers record it and move on.
pub fn resolve_problem(
    session: &mut Session,
    problem: ProblemId,
    voters: &[AgentId],
    max_retries: u32,
) -> Result<()> {
    for attempt in 0..=max_retries {
        if session.solve_attempt(problem, voters) {
            return Ok(());
        }
        debug!(problem, attempt, "majority vote came back incorrect");
    }
    Err(SimError::RetryBudgetExceeded {
        problem,
        budget: max_retries,
    })
}
