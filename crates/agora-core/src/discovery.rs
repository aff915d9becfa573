//! Phase-1 preference discovery, shared by the two-layered and
//! direct-democracy policies.
//!
//! Discovery round-robins reveal queries across the population, always
//! asking the agent that has revealed the fewest problems so far (lowest id
//! on ties), and accumulates per-problem partial preference sums. It stops
//! as soon as the provisional top set is provably stable, or once every
//! agent is exhausted and the sums are exact.

use crate::session::Session;
use crate::types::ProblemId;
use tracing::debug;

/// Survey preferences until the `slots` most preferred problems are known,
/// returning them best first.
///
/// The result is always the true top set: the early exit below only fires
/// when no outsider problem can still overtake the provisional cut, and
/// otherwise the survey runs to exhaustion, where partial sums equal the
/// global scores.
pub fn discover_top_problems(session: &mut Session, slots: usize) -> Vec<ProblemId> {
    let agents = session.world().agent_count();
    let problems = session.world().problem_count();

    let mut partial = vec![0.0f64; problems];
    let mut revealed = vec![vec![false; problems]; agents];
    let mut last_value: Vec<Option<f64>> = vec![None; agents];
    let mut exhausted = vec![false; agents];
    let mut reveals_since_check = 0usize;

    loop {
        let next = (0..agents)
            .filter(|&agent| !exhausted[agent])
            .min_by_key(|&agent| (session.revealed_count(agent), agent));
        let Some(agent) = next else {
            // Everyone is exhausted; partial sums are now exact.
            break;
        };

        match session.reveal(agent) {
            Ok((problem, value)) => {
                partial[problem] += value;
                revealed[agent][problem] = true;
                last_value[agent] = Some(value);
            }
            Err(_) => {
                // ExhaustedAgent: route around this agent from now on.
                exhausted[agent] = true;
                continue;
            }
        }

        // A single reveal rarely settles anything; checking the bound once
        // per full round keeps the survey linear in the matrix size.
        reveals_since_check += 1;
        if reveals_since_check >= agents {
            reveals_since_check = 0;
            if top_is_stable(&partial, &revealed, &last_value, &exhausted, slots) {
                debug!(
                    steps = session.steps_used(),
                    "provisional top set is provably stable"
                );
                break;
            }
        }
    }

    debug!(steps = session.steps_used(), "preference discovery complete");
    ranked_prefix(&partial, slots)
}

/// Check whether no problem outside the provisional top `slots` can still
/// reach the cut.
///
/// Reveals arrive in strictly decreasing order per agent, so an agent's
/// unrevealed contribution to any problem is bounded by its last revealed
/// value. An agent that has revealed nothing admits no bound at all.
fn top_is_stable(
    partial: &[f64],
    revealed: &[Vec<bool>],
    last_value: &[Option<f64>],
    exhausted: &[bool],
    slots: usize,
) -> bool {
    if partial.len() <= slots {
        return true;
    }
    if last_value
        .iter()
        .zip(exhausted)
        .any(|(value, &done)| value.is_none() && !done)
    {
        return false;
    }

    let order = ranked_prefix(partial, partial.len());
    let cut = partial[order[slots - 1]];

    for &outsider in &order[slots..] {
        let mut reachable = partial[outsider];
        for (agent, seen) in revealed.iter().enumerate() {
            if !seen[outsider] && !exhausted[agent] {
                reachable += last_value[agent].unwrap_or(f64::INFINITY);
            }
        }
        if reachable >= cut {
            return false;
        }
    }
    true
}

/// Problems ranked by descending partial sum, truncated to `n`.
fn ranked_prefix(partial: &[f64], n: usize) -> Vec<ProblemId> {
    let mut order: Vec<ProblemId> = (0..partial.len()).collect();
    order.sort_by(|&x, &y| partial[y].total_cmp(&partial[x]).then(x.cmp(&y)));
    order.truncate(n);
    order
}
