//! The aggregate run state and per-transaction lifecycles.

use alloc::string::String;
use alloc::vec::Vec;

use crate::policy::IsolationLevel;
use crate::scenario::{profile, Op, Scenario};
use crate::store::Store;

/// Lifecycle of transaction A. A only ever begins and commits.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TxAState {
    Idle,
    Active,
    Committed,
}

/// Lifecycle of transaction B, which may also roll back.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TxBState {
    Idle,
    Active,
    Committed,
    RolledBack,
}

/// A lifecycle transition that the script data must never request:
/// committing or rolling back a transaction that is not active, beginning
/// one twice, or rolling back A at all.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Violation {
    TxA { from: TxAState, op: Op },
    TxB { from: TxBState, op: Op },
}

impl TxAState {
    /// Apply a script operation to A's lifecycle. Reads and writes leave
    /// the lifecycle untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`Violation`] for a lifecycle operation that is invalid in
    /// the current state.
    pub fn apply(self, op: Op) -> Result<Self, Violation> {
        match (self, op) {
            (Self::Idle, Op::Begin) => Ok(Self::Active),
            (Self::Active, Op::Commit) => Ok(Self::Committed),
            (from, Op::Begin | Op::Commit | Op::Rollback) => Err(Violation::TxA { from, op }),
            (state, _) => Ok(state),
        }
    }
}

impl TxBState {
    /// Apply a script operation to B's lifecycle. Reads and writes leave
    /// the lifecycle untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`Violation`] for a lifecycle operation that is invalid in
    /// the current state.
    pub fn apply(self, op: Op) -> Result<Self, Violation> {
        match (self, op) {
            (Self::Idle, Op::Begin) => Ok(Self::Active),
            (Self::Active, Op::Commit) => Ok(Self::Committed),
            (Self::Active, Op::Rollback) => Ok(Self::RolledBack),
            (from, Op::Begin | Op::Commit | Op::Rollback) => Err(Violation::TxB { from, op }),
            (state, _) => Ok(state),
        }
    }
}

/// One observed read on transaction A.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRecord {
    /// 1-based script position of the read.
    pub step: usize,
    pub query: String,
    pub value: i64,
}

/// Where a script position stands relative to the cursor. Presentation
/// layers use this to paint the timeline.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Current,
    Pending,
}

/// The full state of one run: selection, cursor, transaction lifecycles,
/// store, read log, and the anomaly verdict.
///
/// A `RunState` is a plain value. The executor's [`step()`](crate::step)
/// consumes one and returns the successor; nothing in this crate holds one
/// behind the caller's back, so a run can be snapshotted, serialized, or
/// replayed from any point.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub scenario: Scenario,
    pub level: IsolationLevel,
    /// Next script position to execute, `0..=total_steps()`.
    pub cursor: usize,
    pub tx_a: TxAState,
    pub tx_b: TxBState,
    pub store: Store,
    pub reads: Vec<ReadRecord>,
    /// Human-readable anomaly explanation. Set at most once per run, never
    /// retracted until the run is discarded.
    pub anomaly: Option<String>,
}

impl RunState {
    /// A fresh run at the start of the scenario's script.
    #[must_use]
    pub fn new(scenario: Scenario, level: IsolationLevel) -> Self {
        Self {
            scenario,
            level,
            cursor: 0,
            tx_a: TxAState::Idle,
            tx_b: TxBState::Idle,
            store: Store::new(),
            reads: Vec::new(),
            anomaly: None,
        }
    }

    #[must_use]
    pub fn total_steps(&self) -> usize {
        profile(self.scenario).steps.len()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.cursor >= self.total_steps()
    }

    /// Timeline status of the script position `index`.
    #[must_use]
    pub const fn step_status(&self, index: usize) -> StepStatus {
        if index < self.cursor {
            StepStatus::Completed
        } else if index == self.cursor {
            StepStatus::Current
        } else {
            StepStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_run_matches_documented_snapshot() {
        let run = RunState::new(Scenario::DirtyRead, IsolationLevel::ReadCommitted);
        assert_eq!(run.cursor, 0);
        assert_eq!(run.tx_a, TxAState::Idle);
        assert_eq!(run.tx_b, TxBState::Idle);
        assert!(run.reads.is_empty());
        assert_eq!(run.anomaly, None);
        assert_eq!(run.store, Store::new());
        assert_eq!(run.total_steps(), 7);
        assert!(!run.is_completed());
    }

    #[test]
    fn tx_a_lifecycle() {
        let active = TxAState::Idle.apply(Op::Begin).expect("begin from idle");
        assert_eq!(active, TxAState::Active);
        let committed = active.apply(Op::Commit).expect("commit from active");
        assert_eq!(committed, TxAState::Committed);
    }

    #[test]
    fn tx_a_rejects_commit_before_begin() {
        assert_eq!(
            TxAState::Idle.apply(Op::Commit),
            Err(Violation::TxA {
                from: TxAState::Idle,
                op: Op::Commit,
            }),
        );
    }

    #[test]
    fn tx_a_rejects_rollback_entirely() {
        assert!(TxAState::Active.apply(Op::Rollback).is_err());
    }

    #[test]
    fn tx_a_is_terminal_after_commit() {
        assert!(TxAState::Committed.apply(Op::Begin).is_err());
        assert!(TxAState::Committed.apply(Op::Commit).is_err());
    }

    #[test]
    fn tx_b_can_roll_back() {
        let active = TxBState::Idle.apply(Op::Begin).expect("begin from idle");
        assert_eq!(active.apply(Op::Rollback), Ok(TxBState::RolledBack));
    }

    #[test]
    fn tx_b_is_terminal_after_rollback() {
        assert!(TxBState::RolledBack.apply(Op::Begin).is_err());
        assert!(TxBState::RolledBack.apply(Op::Commit).is_err());
    }

    #[test]
    fn reads_do_not_move_lifecycles() {
        assert_eq!(TxAState::Active.apply(Op::Select), Ok(TxAState::Active));
        assert_eq!(TxBState::Active.apply(Op::Update), Ok(TxBState::Active));
    }

    #[test]
    fn step_status_tracks_cursor() {
        let mut run = RunState::new(Scenario::DirtyRead, IsolationLevel::Serializable);
        run.cursor = 2;
        assert_eq!(run.step_status(1), StepStatus::Completed);
        assert_eq!(run.step_status(2), StepStatus::Current);
        assert_eq!(run.step_status(3), StepStatus::Pending);
    }
}
