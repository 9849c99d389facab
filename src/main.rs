//! Sovereign Inference Gateway
//!
//! Inspects prompts for jurisdiction-sensitive personal information, keeps
//! sensitive requests on a locally hosted model and records every routing
//! decision in an append-only compliance log.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sovereign_gateway::audit::ComplianceLog;
use sovereign_gateway::config::GatewayConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sovereign-gateway")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Jurisdiction-aware inference gateway")]
struct Cli {
    /// Configuration file path (.hcl or .json)
    #[arg(short, long, env = "SOVEREIGN_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Inspect a prompt and print detections and score
    Inspect {
        /// Text to inspect
        text: String,
    },

    /// Print the most recent audit records
    Audit {
        /// Number of records
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

fn init_logging(verbose: bool, json: bool, default_level: &str) {
    let level = if verbose { "debug" } else { default_level };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("sovereign_gateway={level},sovereign_audit=info,tower_http=info").into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, config_path) = sovereign_gateway::bootstrap::load_config(cli.config.as_ref())?;

    // Initialize logging (default level comes from config / GATEWAY_LOG_LEVEL)
    init_logging(cli.verbose, cli.json_logs, &config.server.log_level);
    match &config_path {
        Some(path) => tracing::info!(path = %path.display(), "Configuration loaded"),
        None => tracing::info!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            sovereign_gateway::bootstrap::run_gateway(config, &host, port).await?;
        }
        Commands::Inspect { text } => {
            let inspector = sovereign_gateway::bootstrap::build_inspector(&config)?;
            let result = inspector.inspect(&text);
            let json = serde_json::to_string_pretty(&result)
                .context("Failed to serialize inspection result")?;
            println!("{}", json);
        }
        Commands::Audit { limit } => {
            show_audit(&config, limit).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn show_audit(config: &GatewayConfig, limit: usize) -> Result<()> {
    let log = ComplianceLog::open_read_only(&config.audit.log_file);
    let records = log.recent(limit).await?;
    if records.is_empty() {
        println!("No audit records in {}", log.path().display());
        return Ok(());
    }
    for record in &records {
        println!("{}", record.summary_line());
    }
    Ok(())
}

fn show_config(config: Option<&GatewayConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let hcl = hcl::to_string(&config)?;
    println!("{}", hcl);
    Ok(())
}
