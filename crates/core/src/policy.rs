//! The anomaly policy table.
//!
//! A fixed 4x3 matrix encoding standard SQL isolation semantics. This is
//! the single source of truth the executor consults; the step interpreter
//! never encodes level semantics of its own.

use crate::scenario::Scenario;

/// ANSI isolation levels, ordered from weakest to strongest.
///
/// Each level prevents everything the previous one prevents:
/// Read Uncommitted lets all three anomalies through; Read Committed stops
/// dirty reads; Repeatable Read additionally stops non-repeatable reads;
/// Serializable stops all three, phantoms included.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub const ALL: [Self; 4] = [
        Self::ReadUncommitted,
        Self::ReadCommitted,
        Self::RepeatableRead,
        Self::Serializable,
    ];

    /// Stable kebab-case name, used by the CLI and wasm boundaries.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "read-uncommitted",
            Self::ReadCommitted => "read-committed",
            Self::RepeatableRead => "repeatable-read",
            Self::Serializable => "serializable",
        }
    }

    /// SQL spelling, e.g. `"READ UNCOMMITTED"`.
    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// Whether running `scenario` under `level` lets the anomaly manifest.
#[must_use]
pub const fn manifests(level: IsolationLevel, scenario: Scenario) -> bool {
    match (level, scenario) {
        (IsolationLevel::ReadUncommitted, _) => true,
        (IsolationLevel::ReadCommitted, Scenario::DirtyRead)
        | (IsolationLevel::Serializable, _) => false,
        (IsolationLevel::ReadCommitted, _) => true,
        (IsolationLevel::RepeatableRead, scenario) => {
            matches!(scenario, Scenario::PhantomRead)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The canonical matrix, row by row.
    #[test]
    fn read_uncommitted_manifests_everything() {
        for scenario in Scenario::ALL {
            assert!(manifests(IsolationLevel::ReadUncommitted, scenario));
        }
    }

    #[test]
    fn read_committed_prevents_dirty_read_only() {
        assert!(!manifests(IsolationLevel::ReadCommitted, Scenario::DirtyRead));
        assert!(manifests(
            IsolationLevel::ReadCommitted,
            Scenario::NonRepeatableRead
        ));
        assert!(manifests(IsolationLevel::ReadCommitted, Scenario::PhantomRead));
    }

    #[test]
    fn repeatable_read_additionally_prevents_non_repeatable_read() {
        assert!(!manifests(IsolationLevel::RepeatableRead, Scenario::DirtyRead));
        assert!(!manifests(
            IsolationLevel::RepeatableRead,
            Scenario::NonRepeatableRead
        ));
        assert!(manifests(
            IsolationLevel::RepeatableRead,
            Scenario::PhantomRead
        ));
    }

    #[test]
    fn serializable_prevents_everything() {
        for scenario in Scenario::ALL {
            assert!(!manifests(IsolationLevel::Serializable, scenario));
        }
    }
}
