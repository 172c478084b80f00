//! isolab CLI -- replay isolation anomaly scenarios in the terminal.

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "isolab",
    about = "Deterministic replay of transaction isolation anomalies"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Replay a scenario under an isolation level
    Run(RunArgs),
    /// Print the isolation level / anomaly reference matrix
    Matrix(MatrixArgs),
    /// Print a scenario's step script
    Script(ScriptArgs),
}

#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Anomaly scenario to replay
    #[arg(long)]
    pub scenario: ScenarioArg,
    /// Isolation level to replay under
    #[arg(long)]
    pub level: LevelArg,
    /// Play on the real cadence instead of replaying instantly
    #[arg(long)]
    pub watch: bool,
    /// Milliseconds between steps in watch mode
    #[arg(long, default_value_t = 1500)]
    pub tick_ms: u64,
    /// Output the final run state as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct MatrixArgs {
    /// Output the matrix as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Parser)]
pub struct ScriptArgs {
    /// Scenario whose script to print
    #[arg(long)]
    pub scenario: ScenarioArg,
    /// Output the script as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScenarioArg {
    DirtyRead,
    NonRepeatableRead,
    PhantomRead,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl From<ScenarioArg> for isolab_core::Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::DirtyRead => Self::DirtyRead,
            ScenarioArg::NonRepeatableRead => Self::NonRepeatableRead,
            ScenarioArg::PhantomRead => Self::PhantomRead,
        }
    }
}

impl From<LevelArg> for isolab_core::IsolationLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::ReadUncommitted => Self::ReadUncommitted,
            LevelArg::ReadCommitted => Self::ReadCommitted,
            LevelArg::RepeatableRead => Self::RepeatableRead,
            LevelArg::Serializable => Self::Serializable,
        }
    }
}
