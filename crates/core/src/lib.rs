//! Core types and configuration for the feedline system.
//!
//! This crate provides shared types used by the ingestion crate:
//! - Record kinds, delimiters and dispatch outcomes
//! - Decoder configuration
//! - Common error types
//! - Logging setup

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::DecoderConfig;
pub use error::{Error, Result};
pub use types::*;
