//! `vista describe`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use vista_engine::{
    DescribeRequest, DescribeSession, OpenAiClient, SessionOptions, ToolRegistry, VistaConfig,
    VistaError,
};

use crate::terminal::{TerminalSink, print_card, write_html};

#[derive(Debug, Args)]
pub struct DescribeArgs {
    /// Image URL
    #[arg(long)]
    url: String,

    /// Write the description in the style of this author or work
    #[arg(long)]
    style: Option<String>,

    /// Target description length in words
    #[arg(long)]
    words: Option<u32>,

    /// Do not offer the metadata tool to the model
    #[arg(long)]
    no_tools: bool,

    /// Also write the card as HTML to this file after every turn
    #[arg(long)]
    html: Option<PathBuf>,
}

pub async fn run(args: DescribeArgs, mut config: VistaConfig) -> Result<()> {
    if args.no_tools {
        config.describe.tools_enabled = false;
    }

    let mut request = DescribeRequest::new(&args.url, &config.describe);
    if let Some(style) = args.style {
        request = request.with_style(style);
    }
    if let Some(words) = args.words {
        if words == 0 {
            anyhow::bail!("--words must be greater than zero");
        }
        request = request.with_word_count(words);
    }

    let client = OpenAiClient::from_config(&config).map_err(explain)?;
    let tools = if config.describe.tools_enabled {
        ToolRegistry::with_defaults()?
    } else {
        ToolRegistry::new()
    };
    let mut session = DescribeSession::new(
        Arc::new(client),
        tools,
        SessionOptions::from_config(&config),
    );
    let mut sink = TerminalSink::new();

    info!(model = %config.model.name, url = %args.url, "Starting description");
    session.start(request, &mut sink).await.map_err(explain)?;
    finish_turn(&sink, args.html.as_deref())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let question = line.trim();
        if question.is_empty() {
            continue;
        }

        match session.follow_up(question, &mut sink).await {
            Ok(_) => {}
            Err(e) if e.is_turn_fatal() => error!("Turn failed: {}", e),
            Err(e) => return Err(explain(e)),
        }
        finish_turn(&sink, args.html.as_deref())?;
    }

    Ok(())
}

fn finish_turn(sink: &TerminalSink, html: Option<&Path>) -> Result<()> {
    debug!(card_updates = sink.updates(), "Turn rendered");
    print_card(sink.card());
    if let Some(path) = html {
        write_html(sink.card(), path)?;
    }
    Ok(())
}

fn explain(e: VistaError) -> anyhow::Error {
    if e.is_auth_error() {
        anyhow::Error::new(e).context("Authentication failed, check OPENAI_API_KEY")
    } else {
        anyhow::Error::new(e)
    }
}
