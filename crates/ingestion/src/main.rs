//! Decode a feed response from stdin into normalized rows on stdout.
//!
//! Usage: `feedline <config.json>`

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use feedline_core::{logging, DecoderConfig};
use feedline_ingestion::FeedDecoder;

fn main() -> Result<()> {
    logging::init("info")?;

    let path = std::env::args()
        .nth(1)
        .context("usage: feedline <config.json>")?;
    let config = DecoderConfig::from_file(&path)
        .with_context(|| format!("loading config from {path}"))?;

    let mut decoder = FeedDecoder::new(config)?;
    let stats = decoder
        .run(io::stdin().lock(), BufWriter::new(io::stdout().lock()))
        .context("decoding feed")?;

    tracing::info!(stats = %serde_json::to_string(&stats)?, "done");
    Ok(())
}
