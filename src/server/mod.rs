//! Streaming side of tool call extraction: the per-turn stream parser and
//! the OpenAI-style chunk shapes its output is wrapped in.
use crate::tools::{FunctionCall, ToolCallType};
use serde::Serialize;
pub mod logger;
pub mod parser;

#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: &'static str,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatChoiceChunk>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ChatChoiceChunk {
    pub index: usize,
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct Delta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<PublicToolCall>>,
}

/// A tool call as it appears inside a streamed delta.
#[derive(Serialize, Debug, Clone)]
pub struct PublicToolCall {
    pub index: Option<usize>,
    pub id: String,
    #[serde(rename = "type")]
    pub type_: ToolCallType,
    pub function: FunctionCall,
}
