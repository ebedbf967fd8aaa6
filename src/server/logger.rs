// src/server/logger.rs
//! Stream transcript logger.
//! Enable by setting environment variable TOOLCALL_RS_STREAM_LOGGER=true
//!
//! Records raw stream tokens, the markup handed to the converter and the tool
//! calls parsed from it, one file per turn.

use crate::tools::ToolCall;
use crate::utils::config::ParserConfig;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Helper struct to log one streamed turn to a file.
/// Each logger writes a new file with a timestamp in the configured log folder.
pub struct StreamLogger {
    file_path: PathBuf,
    model_id: String,
}

impl StreamLogger {
    /// Create a logger if the configuration enables it.
    pub fn from_config(config: &ParserConfig, model_id: &str) -> Option<Arc<Self>> {
        if !config.stream_logger {
            return None;
        }
        Self::in_dir(&config.log_dir, model_id)
    }

    /// Create a logger writing under `log_dir`. Returns None if the folder
    /// cannot be created.
    pub fn in_dir(log_dir: impl AsRef<Path>, model_id: &str) -> Option<Arc<Self>> {
        let log_dir = log_dir.as_ref();
        if !log_dir.exists() {
            if let Err(e) = fs::create_dir_all(log_dir) {
                crate::log_error!("Unable to create log folder {}: {}", log_dir.display(), e);
                return None;
            }
        }

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        let file_path = log_dir.join(format!(
            "stream_{}_{:03}_{}.log",
            now.as_secs(),
            now.subsec_millis(),
            uuid::Uuid::new_v4().simple()
        ));

        crate::log_info!("Stream logging enabled, writing to: {}", file_path.display());

        let logger = Self {
            file_path,
            model_id: model_id.to_string(),
        };
        logger.write(&format!("=== MODEL {} ===\n", logger.model_id));
        Some(Arc::new(logger))
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn write(&self, content: &str) {
        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
        {
            let _ = file.write_all(content.as_bytes());
        }
    }

    pub fn log_stream_token(&self, token: &str) {
        self.write(token);
    }

    /// Log raw tool call body before parsing
    pub fn log_raw_tool_body(&self, raw: &str) {
        let content = format!("\n\n=== RAW TOOL BODY ===\n{}\n", raw);
        self.write(&content);
    }

    /// Log parsed tool calls with a label
    pub fn log_tool_calls(&self, label: &str, tool_calls: &[ToolCall]) {
        if tool_calls.is_empty() {
            return;
        }
        if let Ok(json) = serde_json::to_string_pretty(tool_calls) {
            let content = format!(
                "\n=== {} TOOL CALLS ({}) ===\n{}\n",
                label.to_uppercase(),
                tool_calls.len(),
                json
            );
            self.write(&content);
        }
    }

    /// Log the prose released when the turn was flushed
    pub fn log_flush(&self, content: &str) {
        let content = format!("\n=== FLUSHED CONTENT ===\n{}\n", content);
        self.write(&content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::new_tool_call;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "toolcall-rs-{}-{}",
            name,
            uuid::Uuid::new_v4().simple()
        ))
    }

    #[test]
    fn test_disabled_by_default() {
        assert!(StreamLogger::from_config(&ParserConfig::default(), "qwen3").is_none());
    }

    #[test]
    fn test_writes_sections() {
        let dir = scratch_dir("logger");
        let config = ParserConfig {
            stream_logger: true,
            log_dir: dir.to_string_lossy().into_owned(),
            ..ParserConfig::default()
        };
        let logger = StreamLogger::from_config(&config, "qwen3").unwrap();
        logger.log_stream_token("<function=f>");
        logger.log_raw_tool_body("<function=f></function>");
        logger.log_tool_calls("parsed", &[new_tool_call("call_f_0", "f", "{}")]);
        logger.log_tool_calls("parsed", &[]);
        logger.log_flush("bye");

        let text = fs::read_to_string(logger.file_path()).unwrap();
        assert!(text.starts_with("=== MODEL qwen3 ===\n<function=f>"));
        assert!(text.contains("=== RAW TOOL BODY ===\n<function=f></function>"));
        assert!(text.contains("=== PARSED TOOL CALLS (1) ==="));
        assert_eq!(text.matches("TOOL CALLS").count(), 1);
        assert!(text.ends_with("=== FLUSHED CONTENT ===\nbye\n"));

        let _ = fs::remove_dir_all(dir);
    }
}
