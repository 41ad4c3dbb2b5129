//! Mindmap CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "mindmap")]
#[command(about = "Live node-link graph store with a WebSocket view bridge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ./mindmap.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the view bridge server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Document to load at startup
        #[arg(short, long)]
        load: Option<PathBuf>,

        /// Seed the demo graph when no document is loaded
        #[arg(long)]
        demo: bool,
    },
    /// Load a document and report rejected entries
    Check {
        file: PathBuf,
    },
    /// Load a document and save it back without rejected entries
    Normalize {
        file: PathBuf,

        /// Write here instead of overwriting the input
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mindmap={0},mindmap_core={0},mindmap_server={0}",
            log_level
        ))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Mindmap v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            port,
            host,
            load,
            demo,
        } => {
            let config = Config::load(cli.config.as_deref())?;
            let mut server = config.server;
            if let Some(port) = port {
                server.port = port;
            }
            if let Some(host) = host {
                server.host = host;
            }
            let document = load.or(config.document);
            commands::serve(server, document, demo || config.demo).await
        }
        Commands::Check { file } => commands::check(file),
        Commands::Normalize { file, out } => commands::normalize(file, out),
        Commands::Version => {
            println!("Mindmap v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
