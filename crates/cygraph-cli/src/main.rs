#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::process::ExitCode;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::output::{CliError, OutputMode, render_error, resolve_output_mode};

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "CYGRAPH_LOG";
/// Environment variable selecting `json` or `compact` log lines.
const LOG_FORMAT_ENV: &str = "CYGRAPH_LOG_FORMAT";

#[derive(Parser, Debug)]
#[command(
    name = "cygraph",
    version,
    about = "Dependency metrics for cycling workflow graphs",
    long_about = "Expand a suite's cycling graph over a window of cycle points and \
                  report how densely its tasks depend on each other."
)]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Output format [default: $CYGRAPH_FORMAT, then json]"
    )]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Report graph metrics for a suite",
        long_about = "Count edges, nodes, and per-task dependencies in the suite graph \
                      between START and STOP.",
        after_help = "EXAMPLES:\n    # Metrics over the suite's own initial and final points\n    cygraph metrics my.suite\n\n    # A fixed window, without suicide triggers\n    cygraph metrics my.suite 20200101T00Z 20200103T00Z --exclude-suicide\n\n    # A suite with no initial point of its own\n    cygraph metrics ./suite.toml --icp 1"
    )]
    Metrics(cmd::metrics::MetricsArgs),

    #[command(
        about = "Show the cycle-point window a metrics run would use",
        after_help = "EXAMPLES:\n    cygraph bounds my.suite\n    cygraph bounds my.suite 2 1 --format text"
    )]
    Bounds(cmd::bounds::BoundsArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    cygraph completions bash > ~/.local/share/bash-completion/completions/cygraph"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn default_filter(verbose: bool) -> &'static str {
    if verbose || env::var("DEBUG").is_ok() {
        "cygraph=debug,info"
    } else {
        "cygraph=info,warn"
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Metrics(args) => cmd::metrics::run_metrics(args, output),
        Commands::Bounds(args) => cmd::bounds::run_bounds(args, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let output = resolve_output_mode(cli.format);
    debug!(?output, "starting cygraph");

    match run(&cli, output) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            let cli_error = CliError::from_error(&err);
            error!(code = cli_error.error_code.as_deref(), "{}", cli_error.message);
            render_error(output, &cli_error)?;
            Ok(ExitCode::FAILURE)
        }
    }
}
