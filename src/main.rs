use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use callpath::app::engine::TraceEngine;
use callpath::cli;
use callpath::config::{AnalysisConfig, ClassifierKind};
use callpath::server::http;

#[derive(Parser)]
#[command(name = "callpath")]
#[command(author, version, about = "Trace call paths from entry points to data access", long_about = None)]
struct Cli {
    /// JSON facts file, or a snapshot file with --snapshot-input
    input: PathBuf,

    /// Treat the input as a previously written snapshot
    #[arg(long, global = true)]
    snapshot_input: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_enum)]
    classifier: Option<ClassifierKind>,

    /// Report interface entry points next to their implementations
    #[arg(long, global = true)]
    include_interface_entry_points: bool,

    /// Print structured JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Graph and build statistics
    Summary,

    EntryPoints,

    /// Call tree below one method signature (`Class.method`)
    Tree {
        signature: String,

        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },

    /// Call trees for every entry point
    Trees {
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },

    Cycles,

    Relations,

    /// Write a snapshot that can later be loaded with --snapshot-input
    Snapshot {
        out: PathBuf,

        #[arg(short = 'd', long)]
        max_depth: Option<usize>,
    },

    /// Serve the query API over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = AnalysisConfig::load_or_default(cli.config.as_deref())?;
    if let Some(classifier) = cli.classifier {
        config.classifier = classifier;
    }
    if cli.include_interface_entry_points {
        config.include_interface_entry_points = true;
    }
    if let Commands::Serve {
        port: Some(port), ..
    } = &cli.command
    {
        config.port = *port;
    }
    config.validate()?;

    let engine = if cli.snapshot_input {
        TraceEngine::load_snapshot(&cli.input, config.clone())?
    } else {
        TraceEngine::load_facts(&cli.input, config.clone())?
    };

    match cli.command {
        Commands::Summary => cli::display_summary(&engine, cli.json),
        Commands::EntryPoints => cli::display_entry_points(&engine, cli.json),
        Commands::Tree {
            signature,
            max_depth,
        } => cli::display_call_tree(&engine, &signature, max_depth, cli.json),
        Commands::Trees { max_depth } => cli::display_all_call_trees(&engine, max_depth, cli.json),
        Commands::Cycles => cli::display_cycles(&engine, cli.json),
        Commands::Relations => cli::display_relations(&engine, cli.json),
        Commands::Snapshot { out, max_depth } => cli::write_snapshot(&engine, &out, max_depth),
        Commands::Serve { host, .. } => {
            let addr: SocketAddr = format!("{}:{}", host, config.port)
                .parse()
                .with_context(|| format!("Invalid listen address: {}:{}", host, config.port))?;
            info!(%addr, "serving call graph API");
            http::serve(engine, addr).await
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
