// src/tools/converter.rs
//! The capability every tool call dialect implements.

use super::ToolCall;
use std::sync::Arc;

/// Stateless operations over a complete piece of model output.
///
/// Detection (`has_partial_tool_call` / `is_complete_tool_call`) is kept apart
/// from parsing: a streaming caller decides whether to keep buffering before
/// it ever parses, so truncated blocks are never parsed.
pub trait ToolCallConverter: Send + Sync {
    /// Dialect identifier.
    fn name(&self) -> &str;

    /// True iff the lower-cased model name matches one of the dialect's
    /// patterns at its start. An empty name never matches.
    fn can_handle_model(&self, model_name: &str) -> bool;

    /// Parse every complete function block in document order, numbering IDs
    /// from `call_id` and advancing it once per produced call.
    fn parse_tool_calls_with_index(&self, content: &str, call_id: &mut usize) -> Vec<ToolCall>;

    /// Parse every complete function block in document order.
    fn parse_tool_calls(&self, content: &str) -> Vec<ToolCall> {
        let mut call_id = 0;
        self.parse_tool_calls_with_index(content, &mut call_id)
    }

    /// True when the text holds any structural marker, or ends with the
    /// beginning of one. A hint to hold output back, not proof of a call.
    fn has_partial_tool_call(&self, content: &str) -> bool;

    /// True when the text holds at least one finished block.
    fn is_complete_tool_call(&self, content: &str) -> bool;

    /// Remove finished tool call markup and trim the remaining prose.
    fn clean_content(&self, content: &str) -> String;

    /// Byte length of the leading part of `content` that ends with its last
    /// finished block. Text past this point may still be growing into markup.
    fn complete_prefix_len(&self, content: &str) -> usize {
        content.len()
    }
}

impl<T: ToolCallConverter + ?Sized> ToolCallConverter for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn can_handle_model(&self, model_name: &str) -> bool {
        (**self).can_handle_model(model_name)
    }

    fn parse_tool_calls_with_index(&self, content: &str, call_id: &mut usize) -> Vec<ToolCall> {
        (**self).parse_tool_calls_with_index(content, call_id)
    }

    fn has_partial_tool_call(&self, content: &str) -> bool {
        (**self).has_partial_tool_call(content)
    }

    fn is_complete_tool_call(&self, content: &str) -> bool {
        (**self).is_complete_tool_call(content)
    }

    fn clean_content(&self, content: &str) -> String {
        (**self).clean_content(content)
    }

    fn complete_prefix_len(&self, content: &str) -> usize {
        (**self).complete_prefix_len(content)
    }
}
