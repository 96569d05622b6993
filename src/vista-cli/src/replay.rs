//! `vista replay`: run a recorded answer through the card controller offline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use vista_engine::{CardStreamController, SettleReason};

use crate::terminal::{print_card, write_html};

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// File holding a recorded model answer
    file: PathBuf,

    /// Characters per simulated chunk
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(1..))]
    chunk_size: u32,

    /// Also write the final card as HTML to this file
    #[arg(long)]
    html: Option<PathBuf>,
}

pub async fn run(args: ReplayArgs) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let chunks = split_chunks(&text, args.chunk_size as usize);
    let mut controller = CardStreamController::new();
    controller.begin_turn()?;
    for chunk in &chunks {
        controller.push_chunk(chunk);
    }
    controller.settle(SettleReason::Completed);

    info!(
        chunks = chunks.len(),
        commits = controller.commits(),
        "Replay finished"
    );

    print_card(controller.card());
    println!(
        "{} card updates from {} chunks",
        controller.commits(),
        chunks.len()
    );

    if let Some(path) = &args.html {
        write_html(controller.card(), path)?;
    }
    Ok(())
}

/// Splits text into pieces of at most `size` characters.
fn split_chunks(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}
