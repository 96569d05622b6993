//! Vista - streaming image descriptions in the terminal.

mod describe;
mod replay;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vista_engine::VistaConfig;

/// Describe images with a multimodal model and watch the card fill in.
#[derive(Parser)]
#[command(name = "vista")]
#[command(version)]
struct Args {
    /// Configuration file path (defaults to ~/.vista/config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides logging.level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Describe an image, then answer follow-up questions read from stdin.
    Describe(describe::DescribeArgs),

    /// Feed a recorded model answer through the card controller.
    Replay(replay::ReplayArgs),
}

/// Logs go to stderr; stdout carries the transcript and the card.
fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = VistaConfig::resolve(args.config.as_deref());
    let (level, json) = match &config {
        Ok(config) => (
            args.log_level.clone().unwrap_or_else(|| config.logging.level.clone()),
            args.json_logs || config.logging.json,
        ),
        Err(_) => (
            args.log_level.clone().unwrap_or_else(|| "info".to_string()),
            args.json_logs,
        ),
    };
    setup_logging(&level, json);

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Command::Describe(describe_args) => describe::run(describe_args, config).await,
        Command::Replay(replay_args) => replay::run(replay_args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
