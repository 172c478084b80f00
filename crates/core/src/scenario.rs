//! The scenario catalog: scripts as data.
//!
//! Every anomaly scenario is a fixed, hand-authored interleaving of two
//! transactions. The script says only *what happens when*; what a read
//! actually observes is decided by the executor, which interprets the
//! scenario's [`Checkpoint`] table against the anomaly policy.

/// The anomaly a script is built to demonstrate.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// A reads a value B has updated but not committed.
    DirtyRead,
    /// A repeats a read and sees a different value after B commits in between.
    NonRepeatableRead,
    /// A repeats a predicate query and sees a row B inserted in between.
    PhantomRead,
}

impl Scenario {
    pub const ALL: [Self; 3] = [Self::DirtyRead, Self::NonRepeatableRead, Self::PhantomRead];

    /// Stable kebab-case name, used by the CLI and wasm boundaries.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DirtyRead => "dirty-read",
            Self::NonRepeatableRead => "non-repeatable-read",
            Self::PhantomRead => "phantom-read",
        }
    }

    /// Human-readable label, e.g. `"dirty read"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DirtyRead => "dirty read",
            Self::NonRepeatableRead => "non-repeatable read",
            Self::PhantomRead => "phantom read",
        }
    }
}

/// A single operation one transaction performs in a step.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Op {
    Begin,
    Select,
    SelectCount,
    Update,
    Insert,
    Commit,
    Rollback,
}

impl Op {
    /// Whether this operation observes a value (and so appends a read record).
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Select | Self::SelectCount)
    }

    /// SQL-ish spelling for timelines and traces.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Begin => "BEGIN",
            Self::Select => "SELECT",
            Self::SelectCount => "SELECT COUNT",
            Self::Update => "UPDATE",
            Self::Insert => "INSERT",
            Self::Commit => "COMMIT",
            Self::Rollback => "ROLLBACK",
        }
    }
}

/// The two narrative transactions.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tx {
    A,
    B,
}

impl Tx {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

/// One position in a script. Exactly one side is populated in every shipped
/// script; the other transaction sits idle for that step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Step {
    pub op_a: Option<Op>,
    pub op_b: Option<Op>,
    pub description: &'static str,
}

impl Step {
    /// The acting transaction and its operation, A first when both sides
    /// are (unexpectedly) populated. `None` for a fully idle step.
    #[must_use]
    pub const fn actor(&self) -> Option<(Tx, Op)> {
        match (self.op_a, self.op_b) {
            (Some(op), _) => Some((Tx::A, op)),
            (None, Some(op)) => Some((Tx::B, op)),
            (None, None) => None,
        }
    }
}

/// Expected read values at one script position.
///
/// `stable` is what A observes when the isolation level holds the anomaly
/// off; `anomalous` is what leaks through when it does not. The checkpoint
/// where the two differ is the scenario's anomaly observation point.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// 0-based script position of the read this checkpoint describes.
    pub step: usize,
    pub stable: i64,
    pub anomalous: i64,
}

impl Checkpoint {
    /// Whether this checkpoint is where the anomaly becomes observable.
    #[must_use]
    pub const fn is_observation_point(&self) -> bool {
        self.stable != self.anomalous
    }
}

/// A scenario's full protocol: the script, the query A runs, and the
/// checkpoint table the executor interprets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub steps: &'static [Step],
    /// The query text attached to every read record of the scenario.
    pub query: &'static str,
    pub checkpoints: &'static [Checkpoint],
}

const fn a(op: Op, description: &'static str) -> Step {
    Step {
        op_a: Some(op),
        op_b: None,
        description,
    }
}

const fn b(op: Op, description: &'static str) -> Step {
    Step {
        op_a: None,
        op_b: Some(op),
        description,
    }
}

static DIRTY_READ: Profile = Profile {
    steps: &[
        a(Op::Begin, "transaction A starts"),
        b(Op::Begin, "transaction B starts"),
        a(Op::Select, "A reads Alice's balance: 1000"),
        b(Op::Update, "B updates Alice's balance to 1500 without committing"),
        a(Op::Select, "A reads again -- does it see the uncommitted write?"),
        b(Op::Rollback, "B rolls back, discarding the update"),
        a(Op::Commit, "A commits"),
    ],
    query: "SELECT balance FROM accounts WHERE name = 'Alice'",
    checkpoints: &[
        Checkpoint {
            step: 2,
            stable: 1000,
            anomalous: 1000,
        },
        Checkpoint {
            step: 4,
            stable: 1000,
            anomalous: 1500,
        },
    ],
};

static NON_REPEATABLE_READ: Profile = Profile {
    steps: &[
        a(Op::Begin, "transaction A starts"),
        a(Op::Select, "A reads Alice's balance: 1000"),
        b(Op::Begin, "transaction B starts"),
        b(Op::Update, "B updates Alice's balance to 1500"),
        b(Op::Commit, "B commits"),
        a(Op::Select, "A reads again -- has the value changed?"),
        a(Op::Commit, "A commits"),
    ],
    query: "SELECT balance FROM accounts WHERE name = 'Alice'",
    checkpoints: &[
        Checkpoint {
            step: 1,
            stable: 1000,
            anomalous: 1000,
        },
        Checkpoint {
            step: 5,
            stable: 1000,
            anomalous: 1500,
        },
    ],
};

static PHANTOM_READ: Profile = Profile {
    steps: &[
        a(Op::Begin, "transaction A starts"),
        a(Op::SelectCount, "A counts the accounts: 2"),
        b(Op::Begin, "transaction B starts"),
        b(Op::Insert, "B inserts a new account, Charlie"),
        b(Op::Commit, "B commits"),
        a(Op::SelectCount, "A counts again -- did a row appear?"),
        a(Op::Commit, "A commits"),
    ],
    query: "SELECT COUNT(*) FROM accounts",
    checkpoints: &[
        Checkpoint {
            step: 1,
            stable: 2,
            anomalous: 2,
        },
        Checkpoint {
            step: 5,
            stable: 2,
            anomalous: 3,
        },
    ],
};

/// Look up the protocol for a scenario. Pure and total; the catalog is
/// closed.
#[must_use]
pub const fn profile(scenario: Scenario) -> &'static Profile {
    match scenario {
        Scenario::DirtyRead => &DIRTY_READ,
        Scenario::NonRepeatableRead => &NON_REPEATABLE_READ,
        Scenario::PhantomRead => &PHANTOM_READ,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_step_has_exactly_one_side() {
        for scenario in Scenario::ALL {
            for (i, step) in profile(scenario).steps.iter().enumerate() {
                assert!(
                    step.op_a.is_some() != step.op_b.is_some(),
                    "{scenario:?} step {i} must have exactly one side",
                );
            }
        }
    }

    #[test]
    fn checkpoints_land_on_a_reads() {
        for scenario in Scenario::ALL {
            let profile = profile(scenario);
            for checkpoint in profile.checkpoints {
                let step = &profile.steps[checkpoint.step];
                assert!(
                    step.op_a.is_some_and(Op::is_read),
                    "{scenario:?} checkpoint at {} must be a read by A",
                    checkpoint.step,
                );
            }
        }
    }

    #[test]
    fn every_a_read_has_a_checkpoint() {
        for scenario in Scenario::ALL {
            let profile = profile(scenario);
            for (i, step) in profile.steps.iter().enumerate() {
                if step.op_a.is_some_and(Op::is_read) {
                    assert!(
                        profile.checkpoints.iter().any(|c| c.step == i),
                        "{scenario:?} read at step {i} has no checkpoint",
                    );
                }
            }
        }
    }

    #[test]
    fn exactly_one_observation_point_per_scenario() {
        for scenario in Scenario::ALL {
            let observation_points = profile(scenario)
                .checkpoints
                .iter()
                .filter(|c| c.is_observation_point())
                .count();
            assert_eq!(observation_points, 1, "{scenario:?}");
        }
    }

    #[test]
    fn scripts_end_with_a_commit() {
        for scenario in Scenario::ALL {
            let last = profile(scenario).steps.last().expect("non-empty script");
            assert_eq!(last.op_a, Some(Op::Commit), "{scenario:?}");
        }
    }
}
