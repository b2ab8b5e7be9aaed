//! Line-stream decoding for one request.
//!
//! Reads raw feed lines, classifies each with the dispatcher and writes the
//! normalized rows. Owns no socket; callers hand it any `BufRead`.

use std::io::{BufRead, Write};

use feedline_core::{split_row, DecoderConfig, Dispatch, Error, Result, SkipReason};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dispatcher::dispatch;

/// Counters for one decoding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Lines handed to the decoder.
    pub rows_seen: u64,
    /// Rows written out.
    pub rows_emitted: u64,
    /// System messages ignored.
    pub system_notices: u64,
    /// Rows too short for the record shape.
    pub short_rows: u64,
    /// Rows tagged with another request id.
    pub mismatched_rows: u64,
    /// Error notices from the feed.
    pub upstream_errors: u64,
}

impl DecodeStats {
    /// Rows that produced no output and no error.
    pub fn skipped(&self) -> u64 {
        self.system_notices + self.short_rows
    }

    /// Reset statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Decoder for the response stream of a single request.
pub struct FeedDecoder {
    config: DecoderConfig,
    stats: DecodeStats,
    /// Set once the end-of-stream sentinel was seen.
    finished: bool,
}

impl FeedDecoder {
    /// Create a decoder from a validated configuration.
    pub fn new(config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            stats: DecodeStats::default(),
            finished: false,
        })
    }

    /// Classify one raw line and update the counters.
    pub fn decode_line(&mut self, line: &str) -> Result<Dispatch> {
        let columns = split_row(line);
        self.stats.rows_seen += 1;

        let result = dispatch(
            &columns,
            &self.config.request_id,
            &self.config.record,
            self.config.delimiter,
        );

        match &result {
            Ok(Dispatch::Line(_)) => self.stats.rows_emitted += 1,
            Ok(Dispatch::Skip(SkipReason::SystemNotice)) => self.stats.system_notices += 1,
            Ok(Dispatch::Skip(SkipReason::TooFewColumns)) => self.stats.short_rows += 1,
            Ok(Dispatch::EndOfStream) => self.finished = true,
            Err(Error::SubscriptionMismatch { .. }) => self.stats.mismatched_rows += 1,
            Err(e) if e.is_terminal() => self.stats.upstream_errors += 1,
            Err(_) => {}
        }

        result
    }

    /// Decode lines until the feed ends the request or the reader runs dry.
    ///
    /// Every emitted row is followed by `\n`.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> Result<DecodeStats> {
        for line in reader.lines() {
            let line = line?;
            match self.decode_line(&line) {
                Ok(Dispatch::Line(row)) => {
                    writer.write_all(row.as_bytes())?;
                    writer.write_all(b"\n")?;
                }
                Ok(Dispatch::Skip(_)) => {}
                Ok(Dispatch::EndOfStream) => break,
                Err(e) if e.is_recoverable() && self.config.skip_mismatched => {
                    warn!(error = %e, "dropping row");
                }
                Err(e) if e.is_terminal() && !self.config.fail_on_upstream_error => {
                    warn!(error = %e, "request ended by upstream");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        writer.flush()?;

        if self.finished {
            info!(
                request_id = %self.config.request_id,
                emitted = self.stats.rows_emitted,
                skipped = self.stats.skipped(),
                mismatched = self.stats.mismatched_rows,
                "end of stream"
            );
        } else {
            debug!(request_id = %self.config.request_id, "input ended before end-of-stream marker");
        }

        Ok(self.stats.clone())
    }

    /// Whether the end-of-stream sentinel has been seen.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get decoding statistics.
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }
}
