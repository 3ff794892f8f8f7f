//! Command implementations and argument parsing for the linkdrift CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use linkdrift_core::{
    EdgeSource, FeatureBuilder, HoldoutReport, LinkDriftError, LogisticRegression, Partition,
    SimulationReport, SimulatorBuilder, evaluate_holdout, load_graph,
};
use linkdrift_providers_contacts::{ContactLog, ContactLogError};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_ITERATIONS: usize = 10;
const DEFAULT_REMOVALS: usize = 5;
const DEFAULT_SEED: u64 = 0;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "linkdrift",
    about = "Simulate how link recommendations reshape a contact network."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Rewire the contact graph with a link predictor and track its structure.
    Simulate(SimulateCommand),
    /// Train on a prefix of the log and report ROC-AUC on the suffix.
    Evaluate(EvaluateCommand),
}

/// Arguments shared by every command that reads a contact log.
#[derive(Debug, Args, Clone)]
pub struct LogArgs {
    /// Path to a tab-separated `time, source, target, class1, class2` log.
    pub path: PathBuf,

    /// Override name for the contact log (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,

    /// How node communities are obtained.
    #[arg(long, value_enum, default_value_t = PartitionChoice::Detected)]
    pub partition: PartitionChoice,

    /// Seed for every random choice.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

/// Options accepted by the `simulate` command.
#[derive(Debug, Args, Clone)]
pub struct SimulateCommand {
    /// Contact log and shared options.
    #[command(flatten)]
    pub log: LogArgs,

    /// Use only the first `offset` events (defaults to the whole log).
    #[arg(long)]
    pub offset: Option<usize>,

    /// Number of rewiring iterations.
    #[arg(
        long,
        default_value_t = DEFAULT_ITERATIONS,
        value_parser = clap::value_parser!(usize),
    )]
    pub iterations: usize,

    /// Edges removed and added per iteration.
    #[arg(
        long,
        default_value_t = DEFAULT_REMOVALS,
        value_parser = clap::value_parser!(usize),
    )]
    pub removals: usize,
}

/// Options accepted by the `evaluate` command.
#[derive(Debug, Args, Clone)]
pub struct EvaluateCommand {
    /// Contact log and shared options.
    #[command(flatten)]
    pub log: LogArgs,

    /// Number of leading events used for training.
    #[arg(long)]
    pub offset: usize,
}

/// Community sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PartitionChoice {
    /// Detect communities on the training graph with Louvain.
    Detected,
    /// Use the first class each person was observed with.
    Classes,
}

impl PartitionChoice {
    const fn label(self) -> &'static str {
        match self {
            Self::Detected => "detected",
            Self::Classes => "classes",
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while opening the contact log.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Contact log ingestion failed.
    #[error(transparent)]
    Contacts(#[from] ContactLogError),
    /// Graph construction, simulation or evaluation failed.
    #[error(transparent)]
    Core(#[from] LinkDriftError),
}

/// Outcome of a `simulate` run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    /// Name of the edge source the graph was loaded from.
    pub data_source: String,
    /// Nodes in the simulated graph.
    pub nodes: usize,
    /// Edges in the simulated graph.
    pub edges: usize,
    /// Communities in the fixed partition.
    pub communities: usize,
    /// Baseline and per-iteration metrics.
    pub report: SimulationReport,
}

/// Outcome of an `evaluate` run.
#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    /// Name of the contact log.
    pub data_source: String,
    /// Events used for training.
    pub offset: usize,
    /// Hold-out scores.
    pub report: HoldoutReport,
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub enum ExecutionSummary {
    /// Result of `simulate`.
    Simulation(SimulationSummary),
    /// Result of `evaluate`.
    Evaluation(EvaluationSummary),
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading the log or running the command fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use linkdrift_cli::cli::{
/// #     Cli, Command, ExecutionSummary, LogArgs, PartitionChoice, SimulateCommand, run_cli,
/// # };
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(
///     file.path(),
///     "0\t1\t2\tA\tA\n20\t1\t3\tA\tA\n40\t2\t3\tA\tA\n60\t3\t4\tA\tB\n\
///      80\t4\t5\tB\tB\n100\t4\t6\tB\tB\n120\t5\t6\tB\tB\n",
/// )?;
/// let cli = Cli {
///     command: Command::Simulate(SimulateCommand {
///         log: LogArgs {
///             path: file.path().to_path_buf(),
///             name: Some("demo".into()),
///             partition: PartitionChoice::Classes,
///             seed: 7,
///         },
///         offset: None,
///         iterations: 2,
///         removals: 1,
///     }),
/// };
/// let ExecutionSummary::Simulation(summary) = run_cli(cli)? else {
///     panic!("simulate yields a simulation summary");
/// };
/// assert_eq!(summary.report.iterations().len(), 2);
/// assert_eq!(summary.edges, 7);
/// # Ok(())
/// # }
/// ```
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Simulate(command) => {
            span.record("command", field::display("simulate"));
            run_simulate(command).map(ExecutionSummary::Simulation)
        }
        Command::Evaluate(command) => {
            span.record("command", field::display("evaluate"));
            run_evaluate(command).map(ExecutionSummary::Evaluation)
        }
    }
}

#[instrument(
    name = "cli.simulate",
    err,
    skip(command),
    fields(
        iterations = command.iterations,
        removals = command.removals,
        seed = command.log.seed,
        partition = command.log.partition.label(),
        offset = field::Empty,
    ),
)]
pub(super) fn run_simulate(command: SimulateCommand) -> Result<SimulationSummary, CliError> {
    let SimulateCommand {
        log: args,
        offset,
        iterations,
        removals,
    } = command;
    let log = read_log(&args)?;

    let (graph, data_source) = match offset {
        Some(offset) => {
            Span::current().record("offset", offset);
            let (training, _) = log.split_at(offset);
            (load_graph(&training)?, training.name().to_owned())
        }
        None => (load_graph(&log)?, log.name().to_owned()),
    };

    let mut builder = SimulatorBuilder::new()
        .with_iterations(iterations)
        .with_removal_count(removals)
        .with_seed(args.seed);
    if args.partition == PartitionChoice::Classes {
        builder = builder.with_partition(log.class_partition());
    }
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let mut simulator = builder.build(graph)?;
    let communities = simulator.partition().community_count();
    let report = simulator.run()?;

    let last = report.final_metrics();
    info!(
        data_source = data_source.as_str(),
        iterations = report.iterations().len(),
        modularity = last.modularity,
        degree_inequality = last.degree_inequality,
        components = last.components,
        "command completed"
    );
    Ok(SimulationSummary {
        data_source,
        nodes,
        edges,
        communities,
        report,
    })
}

#[instrument(
    name = "cli.evaluate",
    err,
    skip(command),
    fields(
        offset = command.offset,
        seed = command.log.seed,
        partition = command.log.partition.label(),
    ),
)]
pub(super) fn run_evaluate(command: EvaluateCommand) -> Result<EvaluationSummary, CliError> {
    let EvaluateCommand { log: args, offset } = command;
    let log = read_log(&args)?;
    let (training, test) = log.split_at(offset);
    let training_edges = load_graph(&training)?.edges().clone();
    let test_edges = load_graph(&test)?.edges().clone();

    let features = FeatureBuilder::new().with_seed(args.seed);
    let partition: Option<Partition> =
        (args.partition == PartitionChoice::Classes).then(|| log.class_partition());
    let mut scorer = LogisticRegression::default();
    let report = evaluate_holdout(
        &training_edges,
        &test_edges,
        &features,
        partition.as_ref(),
        &mut scorer,
    )?;

    info!(
        data_source = log.name(),
        auc = report.auc,
        "command completed"
    );
    Ok(EvaluationSummary {
        data_source: log.name().to_owned(),
        offset: training.len(),
        report,
    })
}

fn read_log(args: &LogArgs) -> Result<ContactLog, CliError> {
    let chosen_name = derive_data_source_name(&args.path, args.name.as_deref());
    let reader = open_log_reader(&args.path)?;
    Ok(ContactLog::try_from_reader(chosen_name, reader)?)
}

#[instrument(name = "cli.open_log_reader", err, fields(path = field::Empty))]
pub(super) fn open_log_reader(path: &Path) -> Result<BufReader<File>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map_or_else(|| "contacts".to_owned(), ToOwned::to_owned)
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// Simulations print one tab-separated row per iteration, preceded by the
/// baseline as iteration `0`.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use linkdrift_cli::cli::{EvaluationSummary, ExecutionSummary, render_summary};
/// # use linkdrift_core::HoldoutReport;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary::Evaluation(EvaluationSummary {
///     data_source: "demo".into(),
///     offset: 100,
///     report: HoldoutReport {
///         auc: 0.75,
///         training_rows: 45,
///         training_positive_rate: 0.2,
///         test_positive_rate: 0.1,
///         dropped_test_edges: 0,
///     },
/// });
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert!(String::from_utf8(buffer)?.contains("roc auc: 0.7500"));
/// # Ok(())
/// # }
/// ```
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Simulation(simulation) => render_simulation(simulation, writer),
        ExecutionSummary::Evaluation(evaluation) => {
            let report = &evaluation.report;
            writeln!(writer, "data source: {}", evaluation.data_source)?;
            writeln!(writer, "training events: {}", evaluation.offset)?;
            writeln!(writer, "candidate pairs: {}", report.training_rows)?;
            writeln!(
                writer,
                "training positive rate: {:.4}",
                report.training_positive_rate
            )?;
            writeln!(writer, "test positive rate: {:.4}", report.test_positive_rate)?;
            writeln!(writer, "dropped test edges: {}", report.dropped_test_edges)?;
            writeln!(writer, "roc auc: {:.4}", report.auc)
        }
    }
}

fn render_simulation(summary: &SimulationSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "nodes: {}", summary.nodes)?;
    writeln!(writer, "edges: {}", summary.edges)?;
    writeln!(writer, "communities: {}", summary.communities)?;
    writeln!(
        writer,
        "iteration\tpositive_rate\tremoved\tadded\treadded\tmodularity\tdegree_inequality\tcomponents"
    )?;
    let baseline = summary.report.baseline();
    writeln!(
        writer,
        "0\t-\t-\t-\t-\t{:.4}\t{:.4}\t{}",
        baseline.modularity, baseline.degree_inequality, baseline.components
    )?;
    for row in summary.report.iterations() {
        writeln!(
            writer,
            "{}\t{:.4}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{}",
            row.iteration,
            row.positive_rate,
            row.removed.len(),
            row.added.len(),
            row.readded(),
            row.modularity,
            row.degree_inequality,
            row.components
        )?;
    }
    Ok(())
}
