// src/tools/registry.rs
//! Converter lookup by parser name or model name.

use super::{MarkupConverter, ToolCall, ToolCallConverter, ToolParserError};
use std::sync::Arc;

pub const PASSTHROUGH_PARSER: &str = "passthrough";

/// Fallback for models without a known dialect: never sees markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughConverter;

impl ToolCallConverter for PassthroughConverter {
    fn name(&self) -> &str {
        PASSTHROUGH_PARSER
    }

    fn can_handle_model(&self, _model_name: &str) -> bool {
        false
    }

    fn parse_tool_calls_with_index(&self, _content: &str, _call_id: &mut usize) -> Vec<ToolCall> {
        Vec::new()
    }

    fn has_partial_tool_call(&self, _content: &str) -> bool {
        false
    }

    fn is_complete_tool_call(&self, _content: &str) -> bool {
        false
    }

    fn clean_content(&self, content: &str) -> String {
        content.trim().to_string()
    }
}

/// Registered converters, probed in registration order.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn ToolCallConverter>>,
    fallback: Arc<dyn ToolCallConverter>,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterRegistry {
    /// Registry with the built-in dialects.
    pub fn new() -> Self {
        Self::with_trace(false)
    }

    /// Registry whose built-in converters emit parse traces when `trace` is set.
    pub fn with_trace(trace: bool) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(MarkupConverter::qwen().with_trace(trace)));
        registry
    }

    /// Registry holding only the passthrough fallback.
    pub fn empty() -> Self {
        Self {
            converters: Vec::new(),
            fallback: Arc::new(PassthroughConverter),
        }
    }

    /// Add a converter; a converter with the same name is replaced.
    pub fn register(&mut self, converter: Arc<dyn ToolCallConverter>) {
        self.converters.retain(|c| c.name() != converter.name());
        self.converters.push(converter);
    }

    pub fn has_parser(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Look a converter up by name, including the passthrough fallback.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolCallConverter>> {
        if name == self.fallback.name() {
            return Some(self.fallback.clone());
        }
        self.converters.iter().find(|c| c.name() == name).cloned()
    }

    /// First converter that claims the model.
    pub fn for_model(&self, model_name: &str) -> Option<Arc<dyn ToolCallConverter>> {
        self.converters
            .iter()
            .find(|c| c.can_handle_model(model_name))
            .cloned()
    }

    pub fn list_parsers(&self) -> Vec<String> {
        self.converters
            .iter()
            .map(|c| c.name().to_string())
            .chain(std::iter::once(self.fallback.name().to_string()))
            .collect()
    }

    /// Pick the converter for a turn.
    ///
    /// An explicitly enforced parser must exist. Otherwise the model name
    /// decides, falling back to passthrough.
    pub fn resolve(
        &self,
        model_name: &str,
        enforce_parser: Option<&str>,
    ) -> Result<Arc<dyn ToolCallConverter>, ToolParserError> {
        if let Some(name) = enforce_parser.map(str::trim).filter(|s| !s.is_empty()) {
            return self
                .get(name)
                .ok_or_else(|| ToolParserError::UnknownParser {
                    name: name.to_string(),
                    available: self.list_parsers(),
                });
        }

        match self.for_model(model_name) {
            Some(converter) => {
                crate::log_info!(
                    "Tool parser selected: {} (model_id={})",
                    converter.name(),
                    model_name
                );
                Ok(converter)
            }
            None => {
                crate::log_warn!(
                    "No tool parser matches model '{}', using {}",
                    model_name,
                    self.fallback.name()
                );
                Ok(self.fallback.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_model_picks_qwen() {
        let registry = ConverterRegistry::new();
        let converter = registry.for_model("Qwen2.5-72B").unwrap();
        assert_eq!(converter.name(), "qwen");
        let converter = registry.for_model("Qwen/Qwen2.5-Coder-32B-Instruct").unwrap();
        assert_eq!(converter.name(), "qwen");
        assert!(registry.for_model("gpt-4").is_none());
        assert!(registry.for_model("deepseek-qwen-distill").is_none());
    }

    #[test]
    fn test_resolve_falls_back_to_passthrough() {
        let registry = ConverterRegistry::new();
        let converter = registry.resolve("llama-3.1-8b", None).unwrap();
        assert_eq!(converter.name(), PASSTHROUGH_PARSER);
        assert!(converter.parse_tool_calls("<function=f></function>").is_empty());
        assert_eq!(converter.clean_content("  <function=f></function> "), "<function=f></function>");
    }

    #[test]
    fn test_resolve_enforced_parser() {
        let registry = ConverterRegistry::new();
        let converter = registry.resolve("gpt-4", Some(" qwen ")).unwrap();
        assert_eq!(converter.name(), "qwen");

        let converter = registry.resolve("qwen3", Some("")).unwrap();
        assert_eq!(converter.name(), "qwen");

        let err = registry.resolve("qwen3", Some("hermes")).err().unwrap();
        match err {
            ToolParserError::UnknownParser { name, available } => {
                assert_eq!(name, "hermes");
                assert_eq!(available, vec!["qwen", "passthrough"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = ConverterRegistry::new();
        registry.register(Arc::new(MarkupConverter::qwen().with_trace(true)));
        assert_eq!(registry.list_parsers(), vec!["qwen", "passthrough"]);
        assert!(registry.has_parser("passthrough"));
        assert!(!registry.has_parser("mistral"));
    }

    #[test]
    fn test_empty_registry_only_passes_through() {
        let registry = ConverterRegistry::empty();
        assert!(registry.for_model("qwen3").is_none());
        assert_eq!(registry.resolve("qwen3", None).unwrap().name(), PASSTHROUGH_PARSER);
    }
}
