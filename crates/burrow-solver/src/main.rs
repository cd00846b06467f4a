//! CLI entry point for the burrow solver.
//!
//! Usage:
//!   burrow-solver solve <diagram.txt> [options]
//!   burrow-solver solve --stdin [options]
//!
//! Options:
//!   --json                Input is a JSON layout instead of a diagram
//!   --unfold              Insert the two hidden rows (depth 2 becomes 4)
//!   --timeout <seconds>   Give up after this long (default: no limit)
//!   --parallel            Explore the first moves on a thread pool
//!   --no-bound-pruning    Do not prune on the best known cost
//!   --no-transposition    Do not prune repeated layouts
//!   --show-moves          Print every board of the solution to stderr
//!   -v, --verbose         Raise the log level (repeatable)

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use burrow_solver::{
    parse_diagram, parse_json, solve, Board, BoardError, Layout, Move, Outcome, SearchConfig,
    SearchResult, SearchStats,
};

#[derive(Parser)]
#[command(name = "burrow-solver")]
#[command(about = "Find the cheapest way to sort an amphipod burrow")]
#[command(version)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for the minimum-energy solution of a burrow
    Solve {
        /// Path to the burrow file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read the burrow from stdin instead of a file
        #[arg(long)]
        stdin: bool,

        /// Input is a JSON layout rather than a text diagram
        #[arg(long)]
        json: bool,

        /// Insert the two hidden rows after the first room level
        #[arg(long)]
        unfold: bool,

        /// Maximum search time in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Explore each first move on its own worker thread
        #[arg(long)]
        parallel: bool,

        /// Disable pruning on the best known solution cost
        #[arg(long)]
        no_bound_pruning: bool,

        /// Disable pruning of layouts already reached more cheaply
        #[arg(long)]
        no_transposition: bool,

        /// Print every intermediate board of the solution to stderr
        #[arg(long)]
        show_moves: bool,
    },
}

/// Output format for a search
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<Vec<Move>>,
    #[serde(flatten)]
    stats: SearchStats,
    time_elapsed_ms: u64,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("burrow_solver={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Returns whether the burrow was solved to optimality.
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Solve {
            file,
            stdin,
            json,
            unfold,
            timeout,
            parallel,
            no_bound_pruning,
            no_transposition,
            show_moves,
        } => {
            let input = read_input(file, stdin)?;

            let mut layout = if json {
                parse_json(&input).context("invalid JSON layout")?
            } else {
                parse_diagram(&input).context("invalid burrow diagram")?
            };
            if unfold {
                layout = burrow_solver::unfold(&layout);
            }

            let config = SearchConfig {
                bound_pruning: !no_bound_pruning,
                transposition: !no_transposition,
                parallel,
                timeout: timeout.map(Duration::from_secs),
            };

            match layout.depth() {
                1 => solve_layout::<1>(&layout, &config, show_moves),
                2 => solve_layout::<2>(&layout, &config, show_moves),
                3 => solve_layout::<3>(&layout, &config, show_moves),
                4 => solve_layout::<4>(&layout, &config, show_moves),
                depth => Err(BoardError::UnsupportedDepth(depth).into()),
            }
        }
    }
}

fn read_input(file: Option<PathBuf>, stdin: bool) -> Result<String> {
    if stdin {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read from stdin")?;
        Ok(buffer)
    } else if let Some(path) = file {
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        bail!("must provide either a file path or --stdin")
    }
}

fn solve_layout<const D: usize>(
    layout: &Layout,
    config: &SearchConfig,
    show_moves: bool,
) -> Result<bool> {
    let board = Board::<D>::try_from(layout).context("invalid burrow")?;
    let result = solve(&board, config).context("search aborted")?;

    if show_moves {
        if let Some(solution) = result.outcome.solution() {
            let boards = board.replay(&solution.moves);
            eprintln!("{}\n", boards[0]);
            for (mv, after) in solution.moves.iter().zip(&boards[1..]) {
                eprintln!("{mv}\n{after}\n");
            }
        }
    }

    let output = format_result(&result);
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(matches!(result.outcome, Outcome::Solved(_)))
}

fn format_result(result: &SearchResult) -> SolveOutput {
    let status = match result.outcome {
        Outcome::Solved(_) => "solved",
        Outcome::Unsolvable => "unsolvable",
        Outcome::Undetermined { .. } => "undetermined",
    };
    let solution = result.outcome.solution();

    SolveOutput {
        status,
        cost: solution.map(|s| s.cost),
        moves: solution.map(|s| s.moves.clone()),
        stats: result.stats,
        time_elapsed_ms: result.time_elapsed_ms,
    }
}
