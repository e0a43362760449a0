//! Reseal CLI - inspect, reconcile and repair guardian attestations.

use clap::{Parser, Subcommand};
use reseal_pipeline::PipelineConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod input;
mod output;

use commands::{check, ids, inspect, reconcile, repair};

#[derive(Parser)]
#[command(name = "reseal")]
#[command(about = "Re-seal guardian attestations against the current guardian set")]
struct Cli {
    /// JSON config file (endpoints, contract constants, retry settings)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode an attestation and print it as JSON
    Inspect {
        /// Attestation file or literal (hex or base64)
        vaa: String,
    },
    /// Reconcile an attestation offline from local files
    Reconcile {
        /// Attestation file or literal (hex or base64)
        #[arg(long)]
        vaa: String,
        /// Guardian set JSON file
        #[arg(long)]
        guardian_set: PathBuf,
        /// Observations JSON file
        #[arg(long)]
        observations: PathBuf,
        /// Output patched bytes and report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print attestation ids emitted by transactions
    Ids {
        /// Transaction hashes (or Solana signatures)
        #[arg(required = true)]
        txs: Vec<String>,
        /// Look transactions up on Solana instead of Ethereum
        #[arg(long)]
        solana: bool,
    },
    /// Ask the core contract whether an attestation verifies
    Check {
        /// Attestation file or literal (hex or base64)
        vaa: String,
    },
    /// Fetch, check and repair attestations for a batch of transactions
    Repair {
        /// Transaction hashes (or Solana signatures)
        #[arg(required = true)]
        txs: Vec<String>,
        /// Look transactions up on Solana instead of Ethereum
        #[arg(long)]
        solana: bool,
        /// Concurrent transactions (overrides config)
        #[arg(long)]
        workers: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Inspect { vaa } => inspect::run(vaa),
        Commands::Reconcile {
            vaa,
            guardian_set,
            observations,
            json,
        } => reconcile::run(vaa, guardian_set, observations, json),
        Commands::Ids { txs, solana } => ids::run(&config, txs, solana),
        Commands::Check { vaa } => check::run(&config, vaa),
        Commands::Repair {
            txs,
            solana,
            workers,
            json,
        } => repair::run(&config, txs, solana, workers, json),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => PipelineConfig::load(path)
            .map_err(|e| format!("Failed to load config {}: {}", path.display(), e).into()),
        None => Ok(PipelineConfig::default()),
    }
}

fn init_tracing(verbosity: u8) {
    let mut filter = EnvFilter::from_default_env();

    if std::env::var("RUST_LOG").is_err() {
        let level = match verbosity {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        if let Ok(directive) = level.parse() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
