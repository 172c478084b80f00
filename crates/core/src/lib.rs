//! Deterministic replay of transaction isolation anomalies.
//!
//! `isolab_core` reproduces the three classic read anomalies -- dirty read,
//! non-repeatable read, and phantom read -- under the four ANSI isolation
//! levels, without a database and without real concurrency. Two logical
//! transactions, A and B, are a narrative over a single scripted timeline;
//! the engine's job is to show which of A's reads observe what, and when
//! that constitutes an anomaly.
//!
//! The crate is organized as data plus a small interpreter:
//!
//! - [`scenario`] -- the script catalog. Each [`Scenario`] maps to a fixed,
//!   hand-authored sequence of [`scenario::Step`]s plus the read checkpoints
//!   the executor interprets.
//! - [`policy`] -- the 4x3 anomaly matrix: [`manifests()`] answers whether
//!   a given [`IsolationLevel`] lets a given scenario's anomaly through.
//! - [`store`] -- a tiny account table with one uncommitted shadow value,
//!   mutated only by script effects. Ground truth, never read values.
//! - [`run`] -- the aggregate [`RunState`]: cursor, per-transaction run
//!   states, store, read log, anomaly verdict.
//! - [`executor`] -- [`step()`], the pure transition function advancing a
//!   [`RunState`] by one script position.
//!
//! # Entry point
//!
//! Build a [`RunState`] for a (scenario, level) pair and fold [`step()`]
//! over it:
//!
//! ```rust,ignore
//! use isolab_core::{step, IsolationLevel, RunState, Scenario};
//!
//! let mut run = RunState::new(Scenario::DirtyRead, IsolationLevel::ReadUncommitted);
//! while !run.is_completed() {
//!     run = step(run);
//! }
//! assert!(run.anomaly.is_some());
//! ```
//!
//! Stepping a completed run returns it unchanged, so driving the loop on a
//! timer needs no end-of-script bookkeeping. Playback (manual stepping,
//! auto-play on a cadence, cancellation) lives in the `isolab_player` crate.
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` derives on all state
//!   types (`RunState`, `Store`, `ReadRecord`, the enums), so a run can be
//!   snapshotted and shipped to a presentation layer as-is.
//!
//! This crate is `no_std` compatible (requires `alloc`).

#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod executor;
pub mod policy;
pub mod run;
pub mod scenario;
pub mod store;

pub use executor::step;
pub use policy::{manifests, IsolationLevel};
pub use run::RunState;
pub use scenario::Scenario;
