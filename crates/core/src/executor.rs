//! The interleaving executor: one pure transition over the script.
//!
//! `step()` is a small interpreter over the scenario's data. The script
//! says which operations happen; the checkpoint table says which values a
//! read can observe; the policy table says which of the two it does. The
//! executor itself carries no per-scenario knowledge.

use alloc::format;
use alloc::string::{String, ToString};

use crate::policy::manifests;
use crate::run::{ReadRecord, RunState};
use crate::scenario::{profile, Checkpoint, Op, Profile, Scenario};

/// Advance a run by one script position.
///
/// Deterministic and total: stepping a completed run returns it unchanged.
/// Lifecycle transitions the script should never request (see
/// [`Violation`](crate::run::Violation)) are asserted in debug builds and
/// degraded to a no-op in release, leaving the rest of the step intact.
#[must_use]
pub fn step(mut state: RunState) -> RunState {
    let profile = profile(state.scenario);

    if state.cursor >= profile.steps.len() {
        tracing::trace!(cursor = state.cursor, "run completed, step is a no-op");
        return state;
    }

    let current = &profile.steps[state.cursor];
    tracing::debug!(
        cursor = state.cursor,
        op_a = ?current.op_a,
        op_b = ?current.op_b,
        "executing step",
    );

    if let Some(op) = current.op_a {
        match state.tx_a.apply(op) {
            Ok(next) => state.tx_a = next,
            Err(violation) => {
                debug_assert!(false, "invalid lifecycle transition: {violation:?}");
                tracing::warn!(?violation, "ignoring invalid lifecycle transition");
            }
        }
    }
    if let Some(op) = current.op_b {
        match state.tx_b.apply(op) {
            Ok(next) => state.tx_b = next,
            Err(violation) => {
                debug_assert!(false, "invalid lifecycle transition: {violation:?}");
                tracing::warn!(?violation, "ignoring invalid lifecycle transition");
            }
        }
    }

    state.store.apply(state.scenario, current);

    if let Some(op) = current.op_a.filter(|op| op.is_read()) {
        observe_read(&mut state, profile, op);
    }

    state.cursor += 1;
    state
}

/// Record what A observes at the current read, and raise the anomaly
/// verdict if this is the observation point and the policy lets the
/// anomaly through.
fn observe_read(state: &mut RunState, profile: &Profile, op: Op) {
    let leaks = manifests(state.level, state.scenario);
    let checkpoint = profile
        .checkpoints
        .iter()
        .find(|c| c.step == state.cursor);

    let value = match checkpoint {
        Some(checkpoint) if leaks => checkpoint.anomalous,
        Some(checkpoint) => checkpoint.stable,
        // A read the checkpoint table does not cover observes committed
        // ground truth.
        None if op == Op::SelectCount => state.store.row_count(),
        None => state.store.committed_balance(),
    };

    state.reads.push(ReadRecord {
        step: state.cursor + 1,
        query: profile.query.to_string(),
        value,
    });
    tracing::debug!(value, step = state.cursor, "read observed");

    if let Some(checkpoint) = checkpoint {
        if leaks && checkpoint.is_observation_point() && state.anomaly.is_none() {
            let message = anomaly_message(state, checkpoint);
            tracing::info!(%message, "anomaly observed");
            state.anomaly = Some(message);
        }
    }
}

fn anomaly_message(state: &RunState, checkpoint: &Checkpoint) -> String {
    let label = state.scenario.label();
    let stable = checkpoint.stable;
    let anomalous = checkpoint.anomalous;
    match state.scenario {
        Scenario::DirtyRead => format!(
            "{label}: A observed the uncommitted balance {anomalous}; \
             B's rollback makes it invalid (the first read saw {stable})",
        ),
        Scenario::NonRepeatableRead => format!(
            "{label}: the same query returned {stable} and then {anomalous} \
             within one transaction",
        ),
        Scenario::PhantomRead => format!(
            "{label}: the row count changed from {stable} to {anomalous} \
             under the same predicate",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::IsolationLevel;
    use crate::run::{TxAState, TxBState};

    fn run_to_completion(scenario: Scenario, level: IsolationLevel) -> RunState {
        let mut state = RunState::new(scenario, level);
        while !state.is_completed() {
            state = step(state);
        }
        state
    }

    #[test]
    fn lifecycles_settle_at_script_end() {
        let done = run_to_completion(Scenario::DirtyRead, IsolationLevel::ReadUncommitted);
        assert_eq!(done.tx_a, TxAState::Committed);
        assert_eq!(done.tx_b, TxBState::RolledBack);

        let done = run_to_completion(Scenario::PhantomRead, IsolationLevel::Serializable);
        assert_eq!(done.tx_a, TxAState::Committed);
        assert_eq!(done.tx_b, TxBState::Committed);
    }

    #[test]
    fn step_past_end_is_identity() {
        let done = run_to_completion(Scenario::NonRepeatableRead, IsolationLevel::ReadCommitted);
        let again = step(done.clone());
        assert_eq!(done, again);
    }

    #[test]
    fn anomaly_is_set_once_and_kept() {
        let mut state = RunState::new(Scenario::DirtyRead, IsolationLevel::ReadUncommitted);
        let mut first_seen_at = None;
        for i in 0..state.total_steps() {
            state = step(state);
            if state.anomaly.is_some() && first_seen_at.is_none() {
                first_seen_at = Some(i);
            }
        }
        // Raised at the second read (script position 4) and never retracted.
        assert_eq!(first_seen_at, Some(4));
        assert!(state.anomaly.is_some());
    }

    #[test]
    fn read_records_carry_query_and_position() {
        let done = run_to_completion(Scenario::PhantomRead, IsolationLevel::ReadUncommitted);
        assert_eq!(done.reads.len(), 2);
        assert_eq!(done.reads[0].step, 2);
        assert_eq!(done.reads[1].step, 6);
        assert!(done.reads.iter().all(|r| r.query.contains("COUNT")));
    }
}
