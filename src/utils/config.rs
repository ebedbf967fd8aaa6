// src/utils/config.rs
use serde::{Deserialize, Serialize};

pub const ENV_TRACE: &str = "TOOLCALL_RS_TRACE";
pub const ENV_STREAM_LOGGER: &str = "TOOLCALL_RS_STREAM_LOGGER";
pub const ENV_LOG_DIR: &str = "TOOLCALL_RS_LOG_DIR";
pub const ENV_PARSER: &str = "TOOLCALL_RS_PARSER";

pub const DEFAULT_LOG_DIR: &str = "log";

/// Runtime switches for tool call parsing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Debug-level events for every parsed block and parameter
    #[serde(default)]
    pub trace: bool,
    /// Write raw stream tokens and parsed calls to a file under `log_dir`
    #[serde(default)]
    pub stream_logger: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    /// Parser name that overrides model-name based selection
    #[serde(default)]
    pub enforce_parser: Option<String>,
}

fn default_log_dir() -> String {
    DEFAULT_LOG_DIR.to_string()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            trace: false,
            stream_logger: false,
            log_dir: default_log_dir(),
            enforce_parser: None,
        }
    }
}

/// `true` (any case) and `1` enable a flag; anything else leaves it off.
pub fn env_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl ParserConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup(ENV_TRACE) {
            config.trace = env_flag(&v);
        }
        if let Some(v) = lookup(ENV_STREAM_LOGGER) {
            config.stream_logger = env_flag(&v);
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|d| !d.trim().is_empty()) {
            config.log_dir = dir;
        }
        config.enforce_parser = lookup(ENV_PARSER)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = ParserConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ParserConfig::default());
        assert_eq!(config.log_dir, "log");
    }

    #[test]
    fn test_flags_from_env() {
        let config = ParserConfig::from_lookup(lookup_from(&[
            (ENV_TRACE, "TRUE"),
            (ENV_STREAM_LOGGER, "1"),
            (ENV_LOG_DIR, "/tmp/toolcalls"),
            (ENV_PARSER, " qwen "),
        ]));
        assert!(config.trace);
        assert!(config.stream_logger);
        assert_eq!(config.log_dir, "/tmp/toolcalls");
        assert_eq!(config.enforce_parser.as_deref(), Some("qwen"));
    }

    #[test]
    fn test_unrecognised_flag_values_are_off() {
        let config = ParserConfig::from_lookup(lookup_from(&[
            (ENV_TRACE, "yes"),
            (ENV_STREAM_LOGGER, "0"),
            (ENV_LOG_DIR, "  "),
            (ENV_PARSER, ""),
        ]));
        assert!(!config.trace);
        assert!(!config.stream_logger);
        assert_eq!(config.log_dir, DEFAULT_LOG_DIR);
        assert!(config.enforce_parser.is_none());
    }

    #[test]
    fn test_deserialize_partial_json() {
        let config: ParserConfig = serde_json::from_str(r#"{"trace": true}"#).unwrap();
        assert!(config.trace);
        assert_eq!(config.log_dir, DEFAULT_LOG_DIR);
    }
}
