mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use qmemory::{config, server};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qmemory", version, about = "Turn vague memories into real places")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Start the MCP server (stdio transport)
    Mcp,
    /// Analyze one memory and print the ranked places
    Analyze {
        /// The memory fragment (max 500 characters)
        memory: String,
        /// Emotion tag, e.g. nostalgic or peaceful
        #[arg(long, short, default_value = "")]
        emotion: String,
        /// Print the raw JSON result
        #[arg(long)]
        json: bool,
    },
    /// Geocode a single place name
    Geocode {
        name: String,
        /// Region hint, e.g. "Nagano, Japan"
        #[arg(long, short)]
        region: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::QMemoryConfig::load()?;

    // Log to stderr so stdout stays clean for MCP JSON-RPC and CLI output.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve_http(config).await?;
        }
        Command::Mcp => {
            server::serve_stdio(config).await?;
        }
        Command::Analyze {
            memory,
            emotion,
            json,
        } => {
            cli::analyze(&config, &memory, &emotion, json).await?;
        }
        Command::Geocode { name, region } => {
            cli::geocode(&config, &name, region.as_deref()).await?;
        }
    }

    Ok(())
}
