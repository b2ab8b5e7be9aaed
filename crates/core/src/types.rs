//! Core data types for the feedline system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Field delimiter used on the wire by the feed.
pub const PROTOCOL_DELIMITER: char = ',';

/// First field of a system/session message (`S,CURRENT PROTOCOL,5.1`).
pub const SYSTEM_MARKER: &str = "S";

/// Field marking a row as a server-side error notice.
pub const ERROR_MARKER: &str = "E";

/// Terminal sentinel sent after the last row of a request.
pub const END_OF_STREAM: &str = "!ENDMSG!";

/// Error payload meaning the request matched nothing.
pub const NO_DATA: &str = "!NO_DATA!";

/// Split one raw feed line into columns.
///
/// A trailing line terminator is removed first. An empty line yields no
/// columns at all, so it can be told apart from a row of blank fields.
pub fn split_row(line: &str) -> Vec<&str> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Vec::new();
    }
    line.split(PROTOCOL_DELIMITER).collect()
}

/// Record shape selected when the request was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Individual trades with the quote at trade time.
    Tick,
    /// One-minute interval bars.
    MinuteBar,
    /// Daily bars.
    EodBar,
}

impl RecordKind {
    /// All record kinds.
    pub const ALL: [RecordKind; 3] = [RecordKind::Tick, RecordKind::MinuteBar, RecordKind::EodBar];

    /// Name used in configuration and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Tick => "tick",
            RecordKind::MinuteBar => "minute_bar",
            RecordKind::EodBar => "eod_bar",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tick" | "ticks" => Ok(RecordKind::Tick),
            "minute_bar" | "minute" | "1m" => Ok(RecordKind::MinuteBar),
            "eod_bar" | "eod" | "daily" => Ok(RecordKind::EodBar),
            other => Err(Error::config(format!("unknown record kind: {other}"))),
        }
    }
}

/// Output field delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
}

impl Delimiter {
    /// Map the "use tabs" flag to a delimiter.
    pub fn from_tab_flag(use_tab: bool) -> Self {
        if use_tab {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }

    /// The separator text.
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::Comma => ",",
            Delimiter::Tab => "\t",
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Comma => f.write_str("comma"),
            Delimiter::Tab => f.write_str("tab"),
        }
    }
}

impl FromStr for Delimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" | "csv" | "," => Ok(Delimiter::Comma),
            "tab" | "tsv" | "\\t" => Ok(Delimiter::Tab),
            other => Err(Error::config(format!("unknown delimiter: {other}"))),
        }
    }
}

/// Fixed-order output fields for one record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanonicalRecord {
    fields: Vec<String>,
}

impl CanonicalRecord {
    /// Wrap already ordered fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Ordered fields.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Join fields with the delimiter. No trailing delimiter or newline.
    pub fn join(&self, delimiter: Delimiter) -> String {
        self.fields.join(delimiter.as_str())
    }
}

impl<S: Into<String>> FromIterator<S> for CanonicalRecord {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Why a row produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Session or protocol announcement.
    SystemNotice,
    /// Row too short for the active record shape.
    TooFewColumns,
}

/// Outcome of classifying one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Formatted record, ready for a newline and writing.
    Line(String),
    /// Nothing to emit; keep reading.
    Skip(SkipReason),
    /// The feed finished this request; stop reading.
    EndOfStream,
}

impl Dispatch {
    /// Output text, or "" when there is nothing to emit.
    pub fn as_line(&self) -> &str {
        match self {
            Dispatch::Line(line) => line,
            Dispatch::Skip(_) | Dispatch::EndOfStream => "",
        }
    }

    #[inline]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Dispatch::EndOfStream)
    }
}
