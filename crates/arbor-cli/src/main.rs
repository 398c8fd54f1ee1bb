//! Arbor command-line interface.
//!
//! ```text
//!   arbor run --input job.json --shots 512 --seed 7
//!   arbor backends
//!   arbor version
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use arbor_exec::ExecConfig;
use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, run, version};

/// Arbor - batch execution of quantum experiments on lattice backends
#[derive(Parser)]
#[command(name = "arbor")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log output format (defaults to the configured format)
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "ARBOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a job description on the local emulator
    Run {
        /// Job description (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Shots per experiment (overrides the job description)
        #[arg(short, long)]
        shots: Option<u32>,

        /// Sampling seed (overrides the job description)
        #[arg(long)]
        seed: Option<u64>,

        /// Lattice to target, e.g. statevector_simulator
        #[arg(short, long)]
        lattice: Option<String>,

        /// Run the lattice as an emulator
        #[arg(long)]
        emulator: bool,

        /// Seconds to wait for the result
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the backend configuration
    Backends,

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Console,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

fn init_logging(verbose: u8, format: Option<LogFormat>, config: &ExecConfig) {
    let level = match verbose {
        0 => config.logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let json = match format {
        Some(format) => format == LogFormat::Json,
        None => config.logging.format == "json",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match ExecConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose, cli.log_format, &config);

    let result = match cli.command {
        Commands::Run {
            input,
            shots,
            seed,
            lattice,
            emulator,
            timeout,
            format,
        } => {
            let options = run::RunOptions {
                shots,
                seed,
                lattice,
                as_emulator: emulator,
                timeout: timeout.map(std::time::Duration::from_secs),
                format,
            };
            run::execute(&input, &options, &config).await
        }

        Commands::Backends => backends::execute(&config),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
