//! Configuration structures for the feedline system.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Delimiter, RecordKind, PROTOCOL_DELIMITER};

/// Configuration for decoding one request's response stream.
///
/// `request_id` is required when deserializing; every other field has a
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Request id sent with the request; every data row starts with it.
    pub request_id: String,
    /// Record shape of the request.
    #[serde(default = "default_record")]
    pub record: RecordKind,
    /// Output field delimiter.
    #[serde(default)]
    pub delimiter: Delimiter,
    /// Drop rows tagged with another request id instead of failing.
    #[serde(default = "default_true")]
    pub skip_mismatched: bool,
    /// When set, an upstream error notice fails the run. When clear, it is
    /// logged and the run ends with `Ok`.
    #[serde(default = "default_true")]
    pub fail_on_upstream_error: bool,
}

fn default_record() -> RecordKind {
    RecordKind::Tick
}

fn default_true() -> bool {
    true
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            request_id: "1".to_string(),
            record: default_record(),
            delimiter: Delimiter::default(),
            skip_mismatched: default_true(),
            fail_on_upstream_error: default_true(),
        }
    }
}

impl DecoderConfig {
    /// Create a configuration for a request.
    pub fn new(request_id: impl Into<String>, record: RecordKind) -> Self {
        Self {
            request_id: request_id.into(),
            record,
            ..Self::default()
        }
    }

    /// Parse from JSON. Missing optional fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Check the request id can be matched against feed rows.
    pub fn validate(&self) -> Result<()> {
        if self.request_id.is_empty() {
            return Err(Error::config("request_id must not be empty"));
        }
        if self.request_id.contains(PROTOCOL_DELIMITER) {
            return Err(Error::config(format!(
                "request_id {:?} contains the protocol delimiter",
                self.request_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.record, RecordKind::Tick);
        assert_eq!(config.delimiter, Delimiter::Comma);
        assert!(config.skip_mismatched);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = DecoderConfig::from_json(
            r#"{"request_id": "999", "record": "minute_bar", "delimiter": "tab"}"#,
        )
        .unwrap();
        assert_eq!(config.request_id, "999");
        assert_eq!(config.record, RecordKind::MinuteBar);
        assert_eq!(config.delimiter, Delimiter::Tab);
        assert!(config.skip_mismatched);
        assert!(config.fail_on_upstream_error);
    }

    #[test]
    fn test_request_id_required() {
        let err = DecoderConfig::from_json(r#"{"record": "eod_bar"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("request_id"));

        let config = DecoderConfig::from_json(r#"{"request_id": "999"}"#).unwrap();
        assert_eq!(config.record, RecordKind::Tick);
        assert_eq!(config.delimiter, Delimiter::Comma);
    }

    #[test]
    fn test_invalid_request_id() {
        let err = DecoderConfig::new("", RecordKind::EodBar).validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = DecoderConfig::from_json(r#"{"request_id": "9,9"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = DecoderConfig::from_json(r#"{"request_id": "999", "record": "weekly"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
