// src/tools/parser.rs
//! Markup-driven tool call converter.
//!
//! Works for any dialect described by a [`MarkupGrammar`]; the Qwen dialect
//! is available through [`MarkupConverter::qwen`].

use super::grammar::{MarkupGrammar, QWEN_GRAMMAR};
use super::{new_tool_call, turn_scoped_call_id, ToolCall, ToolCallConverter, ToolParserError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static QWEN_CONVERTER: Lazy<MarkupConverter> =
    Lazy::new(|| MarkupConverter::new(QWEN_GRAMMAR).expect("built-in qwen grammar compiles"));

/// Converter for `<function=NAME>` / `<parameter=NAME>` style markup.
#[derive(Debug, Clone)]
pub struct MarkupConverter {
    grammar: MarkupGrammar,
    model_patterns: Vec<Regex>,
    function_block: Regex,
    parameter_block: Regex,
    wrapped_span: Regex,
    function_span: Regex,
    /// Emit debug events for every parsed block and parameter
    trace: bool,
}

/// One matched function span, before argument decoding.
struct MarkupBlock<'a> {
    name: &'a str,
    params: Vec<(&'a str, &'a str)>,
}

fn compile(pattern: &str) -> Result<Regex, ToolParserError> {
    Regex::new(pattern).map_err(|source| ToolParserError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl MarkupConverter {
    pub fn new(grammar: MarkupGrammar) -> Result<Self, ToolParserError> {
        let model_patterns = grammar
            .model_patterns
            .iter()
            .map(|p| compile(&MarkupGrammar::anchored_model_pattern(p)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            model_patterns,
            function_block: compile(&grammar.function_block_pattern())?,
            parameter_block: compile(&grammar.parameter_block_pattern())?,
            wrapped_span: compile(&grammar.wrapped_span_pattern())?,
            function_span: compile(&grammar.function_span_pattern())?,
            grammar,
            trace: false,
        })
    }

    /// The built-in Qwen dialect.
    pub fn qwen() -> Self {
        QWEN_CONVERTER.clone()
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn grammar(&self) -> &MarkupGrammar {
        &self.grammar
    }

    fn blocks<'a>(&self, content: &'a str) -> Vec<MarkupBlock<'a>> {
        self.function_block
            .captures_iter(content)
            .filter_map(|cap| {
                let name = cap.get(1)?.as_str().trim();
                let body = cap.get(2)?.as_str();
                let params = self
                    .parameter_block
                    .captures_iter(body)
                    .filter_map(|p| Some((p.get(1)?.as_str().trim(), p.get(2)?.as_str().trim())))
                    .collect();
                Some(MarkupBlock { name, params })
            })
            .collect()
    }

    /// Arrays and objects are decoded; everything else stays a string.
    fn parameter_value(raw: &str) -> Value {
        if raw.starts_with('[') || raw.starts_with('{') {
            if let Ok(value) = serde_json::from_str::<Value>(raw) {
                return value;
            }
        }
        Value::String(raw.to_string())
    }

    /// One removal pass: finished spans first, then lone wrapper tags.
    fn strip_markup(&self, content: &str) -> String {
        let without_wrapped = self.wrapped_span.replace_all(content, "");
        let mut cleaned = self
            .function_span
            .replace_all(&without_wrapped, "")
            .into_owned();

        let (open, close) = (self.grammar.wrapper_open, self.grammar.wrapper_close);
        if cleaned.contains(open) && !cleaned.contains(close) {
            cleaned = cleaned.replace(open, "");
        }
        if cleaned.contains(close) && !cleaned.contains(open) {
            cleaned = cleaned.replace(close, "");
        }
        cleaned
    }
}

impl ToolCallConverter for MarkupConverter {
    fn name(&self) -> &str {
        self.grammar.name
    }

    fn can_handle_model(&self, model_name: &str) -> bool {
        if model_name.is_empty() {
            return false;
        }
        let model_lower = model_name.to_lowercase();
        self.model_patterns.iter().any(|re| re.is_match(&model_lower))
    }

    fn parse_tool_calls_with_index(&self, content: &str, call_id: &mut usize) -> Vec<ToolCall> {
        if self.trace {
            crate::log_debug!("[{}] tool call parser input: {:?}", self.name(), content);
        }

        let blocks = self.blocks(content);
        if self.trace {
            crate::log_debug!("[{}] found {} function blocks", self.name(), blocks.len());
        }

        let mut calls = Vec::with_capacity(blocks.len());
        for block in blocks {
            if block.name.is_empty() {
                crate::log_warn!("Skipping function block without a name");
                continue;
            }

            let mut arguments = Map::new();
            for (key, raw) in block.params {
                if self.trace {
                    crate::log_debug!("[{}] param: {} = {:?}", self.name(), key, raw);
                }
                // Later duplicates overwrite in place, keeping first-seen order.
                arguments.insert(key.to_string(), Self::parameter_value(raw));
            }

            let call = new_tool_call(
                turn_scoped_call_id(block.name, *call_id),
                block.name,
                Value::Object(arguments).to_string(),
            );
            *call_id += 1;
            if self.trace {
                crate::log_debug!("[{}] added tool call: {:?}", self.name(), call);
            }
            calls.push(call);
        }
        calls
    }

    fn has_partial_tool_call(&self, content: &str) -> bool {
        let markers = self.grammar.markers();
        if markers.iter().any(|marker| content.contains(marker)) {
            return true;
        }

        // A marker may still be arriving: check every strict prefix.
        markers.iter().any(|marker| {
            marker
                .char_indices()
                .skip(1)
                .any(|(end, _)| content.ends_with(&marker[..end]))
        })
    }

    fn is_complete_tool_call(&self, content: &str) -> bool {
        // The close must follow the first open; a stray earlier close does not count.
        if let Some(open) = content.find(self.grammar.wrapper_open) {
            return content[open..].contains(self.grammar.wrapper_close);
        }
        self.function_span.is_match(content)
    }

    fn clean_content(&self, content: &str) -> String {
        // Repeat until stable so that cleaning twice changes nothing.
        let mut current = content.to_string();
        loop {
            let next = self.strip_markup(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current.trim().to_string()
    }

    fn complete_prefix_len(&self, content: &str) -> usize {
        let wrapped_end = self
            .wrapped_span
            .find_iter(content)
            .last()
            .map(|m| m.end())
            .unwrap_or(0);

        // Function blocks past an unclosed wrapper open still belong to it.
        let rest = &content[wrapped_end..];
        let open_at = rest.find(self.grammar.wrapper_open).unwrap_or(rest.len());
        let end = self
            .function_span
            .find_iter(&rest[..open_at])
            .last()
            .map(|m| wrapped_end + m.end())
            .unwrap_or(wrapped_end);

        if end == 0 {
            content.len()
        } else {
            end
        }
    }
}
