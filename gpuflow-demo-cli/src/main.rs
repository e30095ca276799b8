//! gpuflow Demo CLI
//!
//! Command-line interface for browsing, listing and renting compute on the
//! gpuflow marketplace. Without a configured chain every command runs
//! against the in-memory demo ledger.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "gpuflow-demo")]
#[command(about = "gpuflow Demo CLI - Rent compute paid by the second", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Custom storage directory
    #[arg(long, global = true, env = "GPUFLOW_DEMO_DIR")]
    storage_dir: Option<String>,

    /// Start both clients in demo mode
    #[arg(long, global = true)]
    demo: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available compute
    Listings {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one listing
    Show {
        /// Listing id
        id: u64,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a listing for your machine
    Create {
        /// Machine title
        #[arg(short, long)]
        title: Option<String>,

        /// Price in tokens per hour
        #[arg(short, long)]
        rate: Option<f64>,

        /// Streaming token symbol
        #[arg(long, default_value = "fDAIx")]
        token: String,

        /// Content identifier of the hardware specs
        #[arg(long)]
        specs_cid: Option<String>,
    },

    /// Rent a listing and receive remote-access credentials
    Rent {
        /// Listing id
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Stop renting a listing
    Stop {
        /// Listing id
        id: u64,
    },

    /// Convert an hourly price to a per-second flow rate
    Rate {
        /// Price in tokens per hour
        tokens_per_hour: f64,

        /// Token decimals
        #[arg(long, default_value_t = gpuflow_lib::rates::DEFAULT_DECIMALS)]
        decimals: usize,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show backend and demo-mode status
    Status,

    /// Manage marketplace configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Start an interactive session
    Shell,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Update configuration values
    Set {
        /// JSON-RPC endpoint
        #[arg(long)]
        rpc_url: Option<String>,

        /// Marketplace contract address
        #[arg(long)]
        marketplace: Option<String>,

        /// Chain id
        #[arg(long)]
        chain_id: Option<u64>,

        /// Flow forwarder address
        #[arg(long)]
        forwarder: Option<String>,

        /// Streaming token, as SYMBOL=ADDRESS (repeatable)
        #[arg(long = "token")]
        tokens: Vec<String>,

        /// Credentials backend base URL (empty string removes it)
        #[arg(long)]
        credentials_url: Option<String>,

        /// Your wallet address
        #[arg(long)]
        renter: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Apply a preset network (amoy, local)
    Preset {
        /// Preset name
        name: String,

        /// Marketplace contract address
        #[arg(long)]
        marketplace: String,
    },

    /// Remove the stored configuration
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("gpuflow_demo_cli=debug,gpuflow_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("gpuflow_demo_cli=info,gpuflow_lib=warn")
            .init();
    }

    // Setup storage directory
    let storage_dir = if let Some(dir) = cli.storage_dir {
        std::path::PathBuf::from(dir)
    } else {
        dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("gpuflow-demo")
    };

    // Dispatch commands
    match cli.command {
        Commands::Listings { json } => {
            commands::listings::run(&storage_dir, cli.demo, json, cli.verbose).await?;
        }
        Commands::Show { id, json } => {
            commands::listings::show(&storage_dir, cli.demo, id, json).await?;
        }
        Commands::Create {
            title,
            rate,
            token,
            specs_cid,
        } => {
            let args = commands::create::CreateArgs {
                title,
                rate,
                token,
                specs_cid,
            };
            commands::create::run(&storage_dir, cli.demo, args, cli.verbose).await?;
        }
        Commands::Rent { id, yes } => {
            commands::session::rent(&storage_dir, cli.demo, id, yes, cli.verbose).await?;
        }
        Commands::Stop { id } => {
            commands::session::stop(&storage_dir, cli.demo, id, cli.verbose).await?;
        }
        Commands::Rate {
            tokens_per_hour,
            decimals,
            json,
        } => {
            commands::rate::run(tokens_per_hour, decimals, json)?;
        }
        Commands::Status => {
            commands::status::run(&storage_dir, cli.demo, cli.verbose).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                commands::config::show(&storage_dir, json)?;
            }
            ConfigAction::Set {
                rpc_url,
                marketplace,
                chain_id,
                forwarder,
                tokens,
                credentials_url,
                renter,
                timeout,
            } => {
                let update = commands::config::ConfigUpdate {
                    rpc_url,
                    marketplace,
                    chain_id,
                    forwarder,
                    tokens,
                    credentials_url,
                    renter,
                    timeout,
                };
                commands::config::set(&storage_dir, update)?;
            }
            ConfigAction::Preset { name, marketplace } => {
                commands::config::preset(&storage_dir, &name, &marketplace)?;
            }
            ConfigAction::Clear => {
                commands::config::clear(&storage_dir)?;
            }
        },
        Commands::Shell => {
            commands::shell::run(&storage_dir, cli.demo, cli.verbose).await?;
        }
    }

    Ok(())
}
