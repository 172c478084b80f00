//! Playback control for isolation anomaly replays.
//!
//! [`Player`] owns a [`RunState`] and drives `isolab_core`'s pure
//! [`step()`](isolab_core::step) either on demand (single step) or on a
//! fixed cadence (auto-play). The executor stays a value-in/value-out
//! function; everything stateful -- the current run, the auto-play flag,
//! the ticker -- lives here.
//!
//! Auto-play is a cancellable repeating task, not an ambient interval: a
//! background thread steps the run every tick, and an epoch counter guards
//! every advance. Resetting, toggling, or changing the selection bumps the
//! epoch, so a ticker that wakes up late finds its epoch stale and exits
//! without touching the run. At most one ticker ever holds the live epoch,
//! and each advance happens under the state lock, so ticks can neither
//! overlap nor outlive a reset.
//!
//! While auto-play is running, the manual controls ([`Player::step`],
//! [`Player::set_scenario`], [`Player::set_level`]) refuse with
//! [`Error::AutoPlayActive`]; pause first. Completion always switches
//! auto-play off, and toggling on a completed run replays it from the top.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use isolab_core::{IsolationLevel, RunState, Scenario};
use typed_builder::TypedBuilder;

/// The reference cadence between auto-play steps.
pub const DEFAULT_TICK: Duration = Duration::from_millis(1500);

/// Initial selection and cadence for a [`Player`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct PlayerConfig {
    pub scenario: Scenario,
    pub level: IsolationLevel,
    #[builder(default = DEFAULT_TICK)]
    pub tick: Duration,
}

/// A control was invoked while it is unavailable.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// Manual stepping and selection changes are locked while auto-play
    /// is running; pause first.
    AutoPlayActive,
}

#[derive(Debug)]
struct Shared {
    run: RunState,
    auto_playing: bool,
    /// Bumped on every reset, toggle, and selection change. A ticker only
    /// advances the run while its captured epoch is still the live one.
    epoch: u64,
}

/// Drives a run manually or on a fixed cadence. Cheap to share behind the
/// presentation layer; all methods take `&self`.
#[derive(Debug)]
pub struct Player {
    shared: Arc<Mutex<Shared>>,
    tick: Duration,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // The executor is pure, so a panic can never leave the run
    // half-written; recover the guard instead of propagating poison.
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Player {
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                run: RunState::new(config.scenario, config.level),
                auto_playing: false,
                epoch: 0,
            })),
            tick: config.tick,
        }
    }

    /// Advance the run by one step and return the new snapshot.
    ///
    /// Stepping a completed run is a no-op returning the unchanged state.
    ///
    /// # Errors
    ///
    /// [`Error::AutoPlayActive`] while the ticker is running.
    pub fn step(&self) -> Result<RunState, Error> {
        let mut guard = lock(&self.shared);
        if guard.auto_playing {
            return Err(Error::AutoPlayActive);
        }
        guard.run = isolab_core::step(guard.run.clone());
        Ok(guard.run.clone())
    }

    /// Discard the run and start over from the current selection. Cancels
    /// any pending ticker.
    pub fn reset(&self) {
        let mut guard = lock(&self.shared);
        guard.epoch += 1;
        guard.auto_playing = false;
        guard.run = RunState::new(guard.run.scenario, guard.run.level);
        tracing::debug!(epoch = guard.epoch, "run reset");
    }

    /// Flip auto-play. On a completed run this replays: the run is reset
    /// and the ticker starts from the top.
    pub fn toggle_auto_play(&self) {
        let mut guard = lock(&self.shared);
        guard.epoch += 1;
        if guard.auto_playing {
            guard.auto_playing = false;
            tracing::debug!("auto-play paused");
            return;
        }
        if guard.run.is_completed() {
            guard.run = RunState::new(guard.run.scenario, guard.run.level);
        }
        guard.auto_playing = true;
        let epoch = guard.epoch;
        drop(guard);

        tracing::debug!(tick = ?self.tick, "auto-play started");
        self.spawn_ticker(epoch);
    }

    /// Select a different scenario and reset.
    ///
    /// # Errors
    ///
    /// [`Error::AutoPlayActive`] while the ticker is running; the previous
    /// run is retained unchanged.
    pub fn set_scenario(&self, scenario: Scenario) -> Result<(), Error> {
        let mut guard = lock(&self.shared);
        if guard.auto_playing {
            return Err(Error::AutoPlayActive);
        }
        guard.epoch += 1;
        let level = guard.run.level;
        guard.run = RunState::new(scenario, level);
        Ok(())
    }

    /// Select a different isolation level and reset.
    ///
    /// # Errors
    ///
    /// [`Error::AutoPlayActive`] while the ticker is running; the previous
    /// run is retained unchanged.
    pub fn set_level(&self, level: IsolationLevel) -> Result<(), Error> {
        let mut guard = lock(&self.shared);
        if guard.auto_playing {
            return Err(Error::AutoPlayActive);
        }
        guard.epoch += 1;
        let scenario = guard.run.scenario;
        guard.run = RunState::new(scenario, level);
        Ok(())
    }

    /// A clone of the current run state: cursor, lifecycles, store, read
    /// log, anomaly verdict.
    #[must_use]
    pub fn snapshot(&self) -> RunState {
        lock(&self.shared).run.clone()
    }

    #[must_use]
    pub fn is_auto_playing(&self) -> bool {
        lock(&self.shared).auto_playing
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        lock(&self.shared).run.is_completed()
    }

    #[must_use]
    pub const fn tick(&self) -> Duration {
        self.tick
    }

    fn spawn_ticker(&self, epoch: u64) {
        let shared = Arc::clone(&self.shared);
        let tick = self.tick;
        thread::spawn(move || loop {
            thread::sleep(tick);
            let mut guard = lock(&shared);
            if guard.epoch != epoch || !guard.auto_playing {
                tracing::trace!(epoch, "ticker cancelled");
                return;
            }
            guard.run = isolab_core::step(guard.run.clone());
            if guard.run.is_completed() {
                guard.auto_playing = false;
                guard.epoch += 1;
                tracing::debug!("run completed, auto-play stopped");
                return;
            }
        });
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        // Invalidate any ticker so nothing steps a run whose controller
        // is gone.
        let mut guard = lock(&self.shared);
        guard.auto_playing = false;
        guard.epoch += 1;
    }
}
