//! Feed line decoding and normalization for the feedline system.
//!
//! This crate handles:
//! - Message classification (system notices, end of stream, error notices)
//! - Request id checks
//! - Per-record field remapping (ticks, minute bars, daily bars)
//! - Line-stream decoding with statistics

pub mod mapper;
pub mod dispatcher;
pub mod decoder;

pub use mapper::{EodBarMapper, MinuteBarMapper, RecordMapper, TickMapper};
pub use dispatcher::{classify_and_map, dispatch};
pub use decoder::{DecodeStats, FeedDecoder};
