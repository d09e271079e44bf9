mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{baseline::BaselineSubcommand, config::ConfigSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "earnings",
    about = "Fetch earnings releases, extract headline figures, and compare them against baselines",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from earnings.yaml or .git/)
    #[arg(long, global = true, env = "EARNINGS_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Interface to bind (default: server.host from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on, 0 = OS-assigned (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Download a document for a ticker into the raw store
    Ingest {
        ticker: String,
        url: String,

        /// Only print where the document would be saved
        #[arg(long)]
        preview: bool,
    },

    /// Extract revenue and diluted EPS from the newest HTML document
    Extract {
        ticker: String,

        /// Also write parsed/{TICKER}/latest.json
        #[arg(long)]
        save: bool,
    },

    /// Show YoY and QoQ changes against the stored baselines
    Delta { ticker: String },

    /// Manage comparison baselines
    Baseline {
        #[command(subcommand)]
        subcommand: BaselineSubcommand,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Serve { host, port } => cmd::serve::run(&root, host, port),
        Commands::Ingest {
            ticker,
            url,
            preview,
        } => cmd::ingest::run(&root, &ticker, &url, preview, cli.json),
        Commands::Extract { ticker, save } => cmd::extract::run(&root, &ticker, save, cli.json),
        Commands::Delta { ticker } => cmd::delta::run(&root, &ticker, cli.json),
        Commands::Baseline { subcommand } => cmd::baseline::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
