//! daoctl - Token-weighted treasury governance tool
//!
//! - Print the effective governance configuration
//! - Replay governance scenarios against in-memory ledgers
//! - Export the resulting proposal and vote state

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use dao_engine::GovernanceConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod output;
mod scenario;

use output::OutputFormat;
use scenario::Scenario;

/// daoctl CLI
#[derive(Parser)]
#[command(name = "daoctl")]
#[command(about = "Token-weighted treasury governance tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "DAO_CONFIG")]
    config: Option<String>,

    /// Log level (overrides `logging.level`)
    #[arg(long, env = "DAO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "DAO_LOG_JSON")]
    json: bool,

    /// Output format (table, json)
    #[arg(short, long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Show the effective configuration
    Config,

    /// Replay a governance scenario
    Replay {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Write the resulting governance state to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Stop at the first step that does not match its expectation
        #[arg(long)]
        fail_fast: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = GovernanceConfig::load(cli.config.as_deref())
        .context("failed to load governance configuration")?;

    // Initialize tracing
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    if cli.json || config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    match cli.command {
        Commands::Config => output::print_json(&config)?,
        Commands::Replay {
            scenario: scenario_path,
            export,
            fail_fast,
        } => {
            let loaded = Scenario::load(&scenario_path).with_context(|| {
                format!("failed to read scenario {}", scenario_path.display())
            })?;
            let replay = scenario::run(&config, &loaded, fail_fast).await?;

            output::print_replay(&replay, cli.output)?;

            if let Some(path) = export {
                std::fs::write(&path, replay.state.to_json()?)
                    .with_context(|| format!("failed to write state to {}", path.display()))?;
                output::print_success(&format!("State exported to {}", path.display()));
            }

            if !replay.passed() {
                bail!(
                    "{} of {} steps did not match expectations",
                    replay.failures(),
                    replay.steps.len()
                );
            }
        }
    }

    Ok(())
}
