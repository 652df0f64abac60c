//! # Skutier
//!
//! Command-line entry point.
//!
//! ```text
//! skutier score <input.csv> [-o out.csv] [--format csv|json] [--config cfg.json]
//! skutier definitions [--json]
//! skutier summary <input.csv> [--json] [--config cfg.json]
//! skutier serve [--host 127.0.0.1] [--port 8080] [--config cfg.json]
//! ```
//!
//! Logging is controlled by `RUST_LOG` (default `skutier=info`) and always
//! goes to stderr.

use clap::{Parser, Subcommand};
use skutier::api;
use skutier::cli::{self, OutputFormat};
use skutier::skutier_core::Engine;
use std::io::{self, IsTerminal};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "skutier", version, about = "SKU dual-track scoring and tier classification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score and classify every SKU of a CSV file
    Score {
        /// Input CSV with one SKU per row
        input: PathBuf,

        /// Write here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,

        /// JSON scoring configuration
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the component and tier definitions
    Definitions {
        #[arg(long)]
        json: bool,
    },

    /// Print batch-level statistics for a CSV file
    Summary {
        input: PathBuf,

        #[arg(long)]
        json: bool,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        #[arg(long, default_value_t = 8080)]
        port: u16,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skutier=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Score {
            input,
            output,
            format,
            config,
        } => cli::cmd_score(&input, output.as_deref(), format, config.as_deref(), io::stdout().lock())?,

        Commands::Definitions { json } => cli::cmd_definitions(json, io::stdout().lock())?,

        Commands::Summary { input, json, config } => {
            cli::cmd_summary(&input, json, config.as_deref(), io::stdout().lock())?;
        }

        Commands::Serve { host, port, config } => {
            let engine = Engine::new(cli::load_config(config.as_deref())?)?;
            let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
            runtime.block_on(api::serve(SocketAddr::new(host, port), engine))?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
