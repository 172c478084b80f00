//! The simulated account table.
//!
//! Ground truth only: committed balances, one uncommitted shadow value, and
//! the rows themselves. What a read *observes* is never answered here --
//! that is the executor's job, conditioned on the anomaly policy.

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use crate::scenario::{Op, Scenario, Step};

/// Balance B's in-flight UPDATE writes over Alice's 1000.
pub const UPDATED_BALANCE: i64 = 1500;

/// The row B INSERTs in the phantom scenario.
pub const PHANTOM_ROW: (&str, i64) = ("Charlie", 300);

/// One committed account row.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub name: String,
    pub balance: i64,
}

/// The account table plus one uncommitted shadow value.
///
/// The shadow is B's in-flight UPDATE over the first row (Alice). It exists
/// alongside the committed balance until B commits (promoting it) or rolls
/// back (discarding it). Dirty-read-capable levels are the only ones that
/// ever surface it.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    pub rows: Vec<Row>,
    pub shadow: Option<i64>,
}

impl Store {
    /// The initial snapshot every scenario starts from: Alice at 1000,
    /// Bob at 500, no uncommitted work.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rows: vec![
                Row {
                    name: "Alice".to_string(),
                    balance: 1000,
                },
                Row {
                    name: "Bob".to_string(),
                    balance: 500,
                },
            ],
            shadow: None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn row_count(&self) -> i64 {
        self.rows.len() as i64
    }

    /// Alice's committed balance.
    ///
    /// The scripts only ever update the first row, so this is total over
    /// every state the executor can produce.
    #[must_use]
    pub fn committed_balance(&self) -> i64 {
        self.rows.first().map_or(0, |row| row.balance)
    }

    /// Apply the step's effect on ground truth. Only B mutates the store:
    /// UPDATE writes the shadow, COMMIT promotes it in the scenario where
    /// B's update is meant to stick, ROLLBACK discards it, INSERT appends
    /// the phantom row.
    pub fn apply(&mut self, scenario: Scenario, step: &Step) {
        match step.op_b {
            Some(Op::Update) => {
                self.shadow = Some(UPDATED_BALANCE);
            }
            Some(Op::Commit) if scenario == Scenario::NonRepeatableRead => {
                if let (Some(shadow), Some(row)) = (self.shadow.take(), self.rows.first_mut()) {
                    row.balance = shadow;
                }
            }
            Some(Op::Rollback) => {
                self.shadow = None;
            }
            Some(Op::Insert) => {
                self.rows.push(Row {
                    name: PHANTOM_ROW.0.to_string(),
                    balance: PHANTOM_ROW.1,
                });
            }
            _ => {}
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
