//! wasm boundary for isolab
//! a web page drives the replay and renders the returned JSON

#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use isolab_core::run::RunState;
use isolab_core::scenario::profile;
use isolab_core::{manifests, IsolationLevel, Scenario};
use wasm_bindgen::prelude::*;

fn parse_scenario(scenario: &str) -> Option<Scenario> {
    match scenario {
        "dirty-read" => Some(Scenario::DirtyRead),
        "non-repeatable-read" => Some(Scenario::NonRepeatableRead),
        "phantom-read" => Some(Scenario::PhantomRead),
        _ => None,
    }
}

fn parse_level(level: &str) -> Option<IsolationLevel> {
    match level {
        "read-uncommitted" => Some(IsolationLevel::ReadUncommitted),
        "read-committed" => Some(IsolationLevel::ReadCommitted),
        "repeatable-read" => Some(IsolationLevel::RepeatableRead),
        "serializable" => Some(IsolationLevel::Serializable),
        _ => None,
    }
}

fn step_json(index: usize, scenario: Scenario) -> serde_json::Value {
    let step = &profile(scenario).steps[index];
    let (side, keyword) = step
        .actor()
        .map_or(("-", "IDLE"), |(tx, op)| (tx.name(), op.keyword()));
    serde_json::json!({
        "index": index,
        "transaction": side,
        "op": keyword,
        "description": step.description,
    })
}

/// Replay a scenario under a level and return the full trace as JSON.
///
/// The trace carries one frame per step -- the `RunState` after that step
/// executed -- so a web UI can animate the run on its own cadence without
/// re-implementing the engine.
///
/// On success:
/// ```json
/// {
///   "ok": true,
///   "scenario": "dirty-read",
///   "level": "read-uncommitted",
///   "manifests": true,
///   "query": "SELECT balance FROM accounts WHERE name = 'Alice'",
///   "steps": [{"index":0,"transaction":"A","op":"BEGIN","description":...},...],
///   "frames": [{...RunState...}, ...],
///   "reads": [1000, 1500],
///   "anomaly": "dirty read: ..."
/// }
/// ```
///
/// On invalid input: `{"ok": false, "error": "<description>"}`
#[must_use]
#[wasm_bindgen]
pub fn replay(scenario: &str, level: &str) -> String {
    let Some(scenario) = parse_scenario(scenario) else {
        return serde_json::json!({"ok": false, "error": "unknown scenario"}).to_string();
    };
    let Some(level) = parse_level(level) else {
        return serde_json::json!({"ok": false, "error": "unknown isolation level"}).to_string();
    };

    let steps: Vec<serde_json::Value> = (0..profile(scenario).steps.len())
        .map(|index| step_json(index, scenario))
        .collect();

    let mut state = RunState::new(scenario, level);
    let mut frames: Vec<serde_json::Value> = Vec::with_capacity(state.total_steps());
    while !state.is_completed() {
        state = isolab_core::step(state);
        frames.push(serde_json::json!(&state));
    }

    let reads: Vec<i64> = state.reads.iter().map(|r| r.value).collect();

    serde_json::json!({
        "ok": true,
        "scenario": scenario.name(),
        "level": level.name(),
        "manifests": manifests(level, scenario),
        "query": profile(scenario).query,
        "steps": steps,
        "frames": frames,
        "reads": reads,
        "anomaly": state.anomaly,
    })
    .to_string()
}

/// Return a scenario's step script as JSON, for rendering the timeline
/// before anything has run.
///
/// On invalid input: `{"ok": false, "error": "<description>"}`
#[must_use]
#[wasm_bindgen]
pub fn script(scenario: &str) -> String {
    let Some(scenario) = parse_scenario(scenario) else {
        return serde_json::json!({"ok": false, "error": "unknown scenario"}).to_string();
    };

    let steps: Vec<serde_json::Value> = (0..profile(scenario).steps.len())
        .map(|index| step_json(index, scenario))
        .collect();

    serde_json::json!({
        "ok": true,
        "scenario": scenario.name(),
        "query": profile(scenario).query,
        "steps": steps,
    })
    .to_string()
}

/// Return the isolation level / anomaly reference matrix as JSON:
/// `{"read-uncommitted": {"dirty-read": true, ...}, ...}`.
#[must_use]
#[wasm_bindgen]
pub fn anomaly_matrix() -> String {
    let mut levels = serde_json::Map::new();
    for level in IsolationLevel::ALL {
        let mut row = serde_json::Map::new();
        for scenario in Scenario::ALL {
            row.insert(scenario.name().to_string(), manifests(level, scenario).into());
        }
        levels.insert(level.name().to_string(), serde_json::Value::Object(row));
    }
    serde_json::Value::Object(levels).to_string()
}
