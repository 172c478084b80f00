use std::thread;
use std::time::Duration;

use clap::Parser;
use isolab_cli::{App, Command, MatrixArgs, RunArgs, ScriptArgs};
use isolab_core::run::RunState;
use isolab_core::scenario::{profile, Step};
use isolab_core::{manifests, IsolationLevel, Scenario};
use isolab_player::{Player, PlayerConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let app = App::parse();
    match &app.command {
        Command::Run(args) => run(args),
        Command::Matrix(args) => matrix(args),
        Command::Script(args) => script(args),
    }
}

/// One timeline line: position, transaction side, operation, description,
/// and the observed value when the step was a read.
fn step_line(index: usize, step: &Step, state: &RunState) -> String {
    let (side, keyword) = step
        .actor()
        .map_or(("-", "IDLE"), |(tx, op)| (tx.name(), op.keyword()));
    let observed = state
        .reads
        .iter()
        .find(|r| r.step == index + 1)
        .map(|r| format!("  -> {}", r.value))
        .unwrap_or_default();
    format!(
        "{:>2}  {side} {keyword:<12} {}{observed}",
        index + 1,
        step.description,
    )
}

fn print_verdict(state: &RunState) {
    match &state.anomaly {
        Some(message) => println!("\nanomaly: {message}"),
        None => println!(
            "\nclean: {} prevented the {}",
            state.level.sql(),
            state.scenario.label(),
        ),
    }
}

fn run(args: &RunArgs) {
    let scenario = Scenario::from(args.scenario);
    let level = IsolationLevel::from(args.level);

    if args.json {
        let mut state = RunState::new(scenario, level);
        while !state.is_completed() {
            state = isolab_core::step(state);
        }
        let result = serde_json::json!({
            "scenario": scenario.name(),
            "level": level.name(),
            "manifests": manifests(level, scenario),
            "state": state,
        });
        println!("{}", serde_json::to_string(&result).unwrap());
        return;
    }

    println!("{} under {}", scenario.label(), level.sql());
    println!();

    if args.watch {
        watch(scenario, level, args.tick_ms);
    } else {
        let steps = profile(scenario).steps;
        let mut state = RunState::new(scenario, level);
        for (index, step) in steps.iter().enumerate() {
            state = isolab_core::step(state);
            println!("{}", step_line(index, step, &state));
        }
        print_verdict(&state);
    }
}

/// Drive the run through the player on the real cadence, printing each
/// step as the ticker reaches it.
fn watch(scenario: Scenario, level: IsolationLevel, tick_ms: u64) {
    let steps = profile(scenario).steps;
    let player = Player::new(
        PlayerConfig::builder()
            .scenario(scenario)
            .level(level)
            .tick(Duration::from_millis(tick_ms))
            .build(),
    );
    player.toggle_auto_play();

    let mut printed = 0;
    while printed < steps.len() {
        let snapshot = player.snapshot();
        while printed < snapshot.cursor {
            println!("{}", step_line(printed, &steps[printed], &snapshot));
            printed += 1;
        }
        thread::sleep(Duration::from_millis(tick_ms.max(20) / 4));
    }
    print_verdict(&player.snapshot());
}

fn matrix(args: &MatrixArgs) {
    if args.json {
        let mut levels = serde_json::Map::new();
        for level in IsolationLevel::ALL {
            let mut row = serde_json::Map::new();
            for scenario in Scenario::ALL {
                row.insert(scenario.name().to_string(), manifests(level, scenario).into());
            }
            levels.insert(level.name().to_string(), serde_json::Value::Object(row));
        }
        println!(
            "{}",
            serde_json::to_string(&serde_json::Value::Object(levels)).unwrap(),
        );
        return;
    }

    println!(
        "{:<18} {:<12} {:<21} {}",
        "level", "dirty read", "non-repeatable read", "phantom read",
    );
    for level in IsolationLevel::ALL {
        let cell = |s: Scenario| if manifests(level, s) { "yes" } else { "no" };
        println!(
            "{:<18} {:<12} {:<21} {}",
            level.sql(),
            cell(Scenario::DirtyRead),
            cell(Scenario::NonRepeatableRead),
            cell(Scenario::PhantomRead),
        );
    }
}

fn script(args: &ScriptArgs) {
    let scenario = Scenario::from(args.scenario);
    let profile = profile(scenario);

    if args.json {
        let steps: Vec<serde_json::Value> = profile
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let (side, keyword) = step
                    .actor()
                    .map_or(("-", "IDLE"), |(tx, op)| (tx.name(), op.keyword()));
                serde_json::json!({
                    "index": index,
                    "transaction": side,
                    "op": keyword,
                    "description": step.description,
                })
            })
            .collect();
        let result = serde_json::json!({
            "scenario": scenario.name(),
            "query": profile.query,
            "steps": steps,
        });
        println!("{}", serde_json::to_string(&result).unwrap());
        return;
    }

    println!("{}: {}", scenario.name(), profile.query);
    for (index, step) in profile.steps.iter().enumerate() {
        let (side, keyword) = step
            .actor()
            .map_or(("-", "IDLE"), |(tx, op)| (tx.name(), op.keyword()));
        println!("{:>2}  {side} {keyword:<12} {}", index + 1, step.description);
    }
}
