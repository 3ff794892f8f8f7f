//! Command-line interface orchestration for linkdrift.
//!
//! `simulate` replays the link-recommendation loop over the prefix of a
//! contact log; `evaluate` trains on the prefix and scores the suffix.

mod commands;

pub use commands::{
    Cli, CliError, Command, EvaluateCommand, EvaluationSummary, ExecutionSummary, LogArgs,
    PartitionChoice, SimulateCommand, SimulationSummary, render_summary, run_cli,
};
