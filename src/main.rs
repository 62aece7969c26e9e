//! Triangular Peg Solitaire Solver
//!
//! Finds the longest chain of jumps on a triangular peg solitaire board with
//! `rows` rows and prints the starting hole, the number of pegs left, and the
//! moves. Every starting hole worth trying is searched in parallel.
//!
//! Invalid arguments print an error and the usage text to stdout and exit
//! with status 0 without searching.

use std::io::{self, Write};

use clap::error::ErrorKind;
use clap::Parser;
use log::{error, info};

use pegjump::{format_solution, solve, SolverConfig};

/// Smallest board the command line accepts.
const MIN_ROWS: i64 = 5;
/// Largest board the command line accepts.
const MAX_ROWS: i64 = 10;

const USAGE: &str =
    "Usage: pegjump -s <rows>\n<rows> must be an integer between 5 and 10 inclusive";

/// Finds the longest jump sequence in triangular peg solitaire.
#[derive(Parser)]
#[command(name = "pegjump")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of rows on the board.
    #[arg(short = 's', value_name = "ROWS", allow_negative_numbers = true)]
    rows: i64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = run(std::env::args_os(), &mut out) {
        error!("{e:#}");
    }
}

/// Parses the arguments, runs the search, and writes the report to `out`.
fn run<I, T>(args: I, out: &mut impl Write) -> anyhow::Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let rows = match parse_rows(args) {
        Ok(rows) => rows,
        Err(Rejection::Info(text)) => {
            write!(out, "{text}")?;
            return Ok(());
        }
        Err(Rejection::Invalid(message)) => {
            writeln!(out, "Error: {message}")?;
            writeln!(out, "{USAGE}")?;
            return Ok(());
        }
    };

    let config = SolverConfig::default();
    match solve(rows, &config)? {
        Some(solution) => {
            info!(
                "best start is hole {} with {} captures",
                solution.start + 1,
                solution.captures()
            );
            write!(out, "{}", format_solution(&solution))?;
        }
        None => info!("no result to report"),
    }
    Ok(())
}

/// Why the arguments did not produce a row count.
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    /// `--help` or `--version` text to print as-is.
    Info(String),
    /// A validation failure, reported with the usage text.
    Invalid(&'static str),
}

/// Validates `-s <rows>` and returns the row count.
fn parse_rows<I, T>(args: I) -> Result<usize, Rejection>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args: Vec<std::ffi::OsString> = args.into_iter().map(Into::into).collect();
    let cli = Cli::try_parse_from(&args).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            Rejection::Info(e.render().to_string())
        }
        _ => reject_shape(&args),
    })?;

    if !(MIN_ROWS..=MAX_ROWS).contains(&cli.rows) {
        return Err(Rejection::Invalid("Invalid arguments"));
    }
    Ok(cli.rows as usize)
}

/// Picks the message for arguments clap refused, checking count, then flag,
/// then value.
fn reject_shape(args: &[std::ffi::OsString]) -> Rejection {
    let given = args.get(1..).unwrap_or_default();
    if given.len() != 2 {
        Rejection::Invalid("Expected 2 arguments.")
    } else if given[0] != "-s" {
        Rejection::Invalid("First argument should be -s.")
    } else {
        Rejection::Invalid("Expected -s arg to be an integer")
    }
}
