//! Parser configuration
//!
//! `defaults/parser.default.yaml` is embedded so that documentation and the built-in
//! defaults stay in sync. Every field is optional in user files; missing keys fall
//! back to [`ParserConfig::default`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_YAML: &str = include_str!("../../defaults/parser.default.yaml");

/// How strictly the stream ordering rule is enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderingPolicy {
    /// Reads, writes and barriers must follow the stream's completion event
    #[default]
    Strict,
    /// Data statements may appear anywhere inside a stream
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParserConfig {
    pub ordering: OrderingPolicy,
    /// Keep comments as nodes; when false they are dropped while assembling streams
    pub preserve_comments: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            ordering: OrderingPolicy::Strict,
            preserve_comments: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParserConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// The embedded defaults, parsed
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml_str(DEFAULT_YAML)
    }

    pub fn lenient() -> Self {
        Self {
            ordering: OrderingPolicy::Lenient,
            ..Self::default()
        }
    }

    pub fn without_comments(mut self) -> Self {
        self.preserve_comments = false;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.ordering == OrderingPolicy::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        assert_eq!(ParserConfig::embedded().unwrap(), ParserConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = ParserConfig::from_yaml_str("ordering: lenient\n").unwrap();
        assert_eq!(config.ordering, OrderingPolicy::Lenient);
        assert!(config.preserve_comments);
    }

    #[test]
    fn test_json_kebab_case_keys() {
        let config = ParserConfig::from_json_str(r#"{"preserve-comments": false}"#).unwrap();
        assert_eq!(config, ParserConfig::default().without_comments());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            ParserConfig::from_yaml_str("ordering: strict\nverbose: true\n"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
