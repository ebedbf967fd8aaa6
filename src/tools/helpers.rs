// src/tools/helpers.rs
//! Helper functions for reporting parsed tool calls.

use super::ToolCall;

const ARGS_PREVIEW_CHARS: usize = 160;

/// Format tool calls for logging - returns a summary string
pub fn format_tool_calls_summary(tool_calls: &[ToolCall]) -> String {
    if tool_calls.is_empty() {
        return String::new();
    }
    tool_calls
        .iter()
        .map(|call| {
            let args = call.function.arguments.replace('\n', " ");
            let truncated = if args.chars().count() > ARGS_PREVIEW_CHARS {
                let snippet: String = args.chars().take(ARGS_PREVIEW_CHARS).collect();
                format!("{}...", snippet)
            } else {
                args
            };
            format!("{}[{}](args={})", call.function.name, call.id, truncated)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Log tool calls with a label (uses crate logging)
pub fn log_tool_calls(label: &str, tool_calls: &[ToolCall]) {
    if tool_calls.is_empty() {
        return;
    }
    let summary = format_tool_calls_summary(tool_calls);
    crate::log_info!("{} tool call(s): {}", label, summary);
}
