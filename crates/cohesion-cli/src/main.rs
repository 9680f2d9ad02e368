#![forbid(unsafe_code)]

mod cmd;
mod output;
mod render;

use clap::{CommandFactory, Parser, Subcommand};
use cohesion_core::config::{self, Config};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "coh: cohesive-subgraph statistics and spatiotemporal binning",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./cohesion.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Summarize analysis records and export distribution tables",
        long_about = "Reduce one record, a directory of records, or a prefix-selected collection into summaries and long-format CSV tables.",
        after_help = "EXAMPLES:\n    # One record; writes run1.csv next to it\n    coh analyze --file runs/run1.json\n\n    # Every record in a directory, summaries only\n    coh analyze --directory runs --no-export --format text\n\n    # A collection named by a prefix-config file\n    coh analyze --prefix long.cfg"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        about = "Bin pairwise distances of grouped event rows",
        long_about = "Read `id<TAB>t,x,y` rows sorted by id and print a 5x11 time/distance histogram per group.",
        after_help = "EXAMPLES:\n    # Read from stdin\n    coh bin < events.tsv\n\n    # Read from a file, JSON lines out\n    coh bin --input events.tsv --json"
    )]
    Bin(cmd::bin::BinArgs),

    #[command(
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    coh completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("COHESION_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "cohesion=debug,info"
        } else {
            "cohesion=info,warn"
        })
    });

    let format = env::var("COHESION_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default_config(&env::current_dir()?)?,
    };
    debug!(?config, "config resolved");
    Ok(config)
}

fn run(cli: Cli, output: OutputMode) -> anyhow::Result<()> {
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match cli.command {
        Commands::Analyze(ref args) => {
            let config = load_config(&cli)?;
            cmd::analyze::run_analyze(args, &config, output)
        }
        Commands::Bin(ref args) => cmd::bin::run_bin(args, output),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();

    match run(cli, output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if render_error(output, &CliError::from(&err)).is_err() {
                eprintln!("error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
