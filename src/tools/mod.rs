// src/tools/mod.rs
//! Tool call extraction for model output.
//!
//! Models emit tool invocations as markup inside ordinary text. This module
//! holds the normalized [`ToolCall`] record, the dialect grammar, the
//! [`ToolCallConverter`] contract and its markup-driven implementation.

pub mod converter;
pub mod grammar;
pub mod helpers;
pub mod parser;
pub mod registry;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use converter::ToolCallConverter;
pub use grammar::{MarkupGrammar, QWEN_GRAMMAR};
pub use parser::MarkupConverter;
pub use registry::{ConverterRegistry, PassthroughConverter};

/// Discriminator of a tool call. Only functions exist for now.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallType {
    #[default]
    Function,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object
    pub arguments: String,
}

/// One normalized invocation, serialized in the OpenAI tool call shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub tool_type: ToolCallType,
    pub function: FunctionCall,
}

impl ToolCall {
    /// Decode the argument string back into a JSON value.
    pub fn arguments_value(&self) -> Option<Value> {
        serde_json::from_str(&self.function.arguments).ok()
    }
}

/// Build a function ToolCall from name/arguments with a provided ID.
pub fn new_tool_call(
    id: impl Into<String>,
    name: impl Into<String>,
    arguments: impl Into<String>,
) -> ToolCall {
    ToolCall {
        id: id.into(),
        tool_type: ToolCallType::Function,
        function: FunctionCall {
            name: name.into(),
            arguments: arguments.into(),
        },
    }
}

/// ID for the `index`-th call of a turn.
///
/// IDs are only unique within one turn: the ordinal comes from a counter the
/// caller owns for the lifetime of that turn.
pub fn turn_scoped_call_id(name: &str, index: usize) -> String {
    format!("call_{}_{}", name, index)
}

#[derive(thiserror::Error, Debug)]
pub enum ToolParserError {
    #[error("invalid markup pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown tool parser '{name}'. Valid parsers: {}", available.join(", "))]
    UnknownParser {
        name: String,
        available: Vec<String>,
    },
}
