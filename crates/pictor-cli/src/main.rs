//! Pictor CLI - interactive AI image editing sessions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use pictor_application::EditingUseCase;
use pictor_infrastructure::SecretServiceImpl;
use pictor_interaction::{AgentError, GeminiImageAgent, ImageEditAgent};
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Parser)]
#[command(name = "pictor")]
#[command(about = "Pictor CLI - AI-assisted image editing sessions", long_about = None)]
struct Cli {
    /// Override the generation model
    #[arg(long)]
    model: Option<String>,

    /// Read secrets from this file instead of ~/.config/pictor/secret.json
    #[arg(long)]
    secret_file: Option<PathBuf>,

    /// Directory where /save writes edited images
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // A missing API key is fatal: never start a session without one.
    let agent = match build_agent(&cli).await {
        Ok(agent) => agent,
        Err(err) => {
            eprintln!("{}", format!("Cannot start Pictor: {err}").red());
            std::process::exit(1);
        }
    };
    tracing::info!("{} ready (model: {})", agent.description(), agent.model());

    let usecase = Arc::new(EditingUseCase::new(Arc::new(agent)));
    repl::run(usecase, &cli.output_dir).await
}

async fn build_agent(cli: &Cli) -> Result<GeminiImageAgent, AgentError> {
    let agent = match &cli.secret_file {
        Some(path) => GeminiImageAgent::from_secrets(&SecretServiceImpl::new(path)).await?,
        None => GeminiImageAgent::try_from_env().await?,
    };

    Ok(match &cli.model {
        Some(model) => agent.with_model(model.as_str()),
        None => agent,
    })
}
