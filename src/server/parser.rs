// src/server/parser.rs
//! Streaming tool call parser for detecting and buffering tool calls during streaming.
//!
//! Text is held back as soon as it may be turning into tool call markup and
//! released again either as plain content (false alarm) or as whole tool
//! calls plus the prose around them once a block closes.

use super::logger::StreamLogger;
use crate::server::{ChatChoiceChunk, ChatCompletionChunk, Delta, PublicToolCall};
use crate::tools::helpers::log_tool_calls;
use crate::tools::{ToolCall, ToolCallConverter};
use std::sync::Arc;

/// Parser state for streaming tool call detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No markup in the buffered turn - tokens pass through
    Idle,
    /// Partial markup seen - accumulating until it completes
    Pending,
    /// Finished block(s) buffered - about to emit
    Ready,
}

/// Result of processing a token in the stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamResult {
    /// Normal content - send to client
    Content(String),
    /// Buffering - don't send anything yet
    Buffering,
    /// Parsed tool calls together with the cleaned prose of the same span
    ToolCalls {
        tool_calls: Vec<ToolCall>,
        content: String,
    },
}

/// Per-turn stream parser.
///
/// Feed fragments in arrival order; create one parser per model turn.
pub struct StreamToolParser<C: ToolCallConverter> {
    converter: C,
    model_id: String,
    state: ParserState,
    buffer: String,
    /// Ordinal of the next tool call emitted in this turn
    call_id: usize,
    // Everything seen this turn, for debugging/logging
    accumulated_output: String,
    logger: Option<Arc<StreamLogger>>,
}

impl<C: ToolCallConverter> StreamToolParser<C> {
    pub fn new(converter: C, model_id: impl Into<String>) -> Self {
        Self {
            converter,
            model_id: model_id.into(),
            state: ParserState::Idle,
            buffer: String::new(),
            call_id: 0,
            accumulated_output: String::new(),
            logger: None,
        }
    }

    /// Attach a file logger for raw tokens and parsed calls.
    pub fn with_logger(mut self, logger: Option<Arc<StreamLogger>>) -> Self {
        self.logger = logger;
        self
    }

    /// Get the current parser state
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Get the buffered content
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Get accumulated output for debugging/logging
    pub fn accumulated_output(&self) -> &str {
        &self.accumulated_output
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Number of tool calls emitted so far in this turn.
    pub fn emitted_tool_calls(&self) -> usize {
        self.call_id
    }

    /// Process a single incoming fragment.
    /// Returns StreamResult indicating what action to take.
    pub fn process_token(&mut self, token_text: &str) -> StreamResult {
        self.accumulated_output.push_str(token_text);
        if let Some(logger) = &self.logger {
            logger.log_stream_token(token_text);
        }
        self.buffer.push_str(token_text);

        if !self.converter.has_partial_tool_call(&self.buffer) {
            if self.state == ParserState::Pending {
                crate::log_debug!("No tool call markup after all, releasing buffer");
            }
            self.transition(ParserState::Idle);
            return StreamResult::Content(std::mem::take(&mut self.buffer));
        }

        if !self.converter.is_complete_tool_call(&self.buffer) {
            if self.state == ParserState::Idle {
                crate::log_info!(
                    "Possible tool call markup found ({}), start buffering!",
                    self.converter.name()
                );
            }
            self.transition(ParserState::Pending);
            return StreamResult::Buffering;
        }

        self.transition(ParserState::Ready);
        self.emit_ready()
    }

    /// Parse and release the finished part of the buffer.
    ///
    /// Text after the last finished block stays buffered only when it is
    /// itself turning into markup.
    fn emit_ready(&mut self) -> StreamResult {
        let split = self
            .converter
            .complete_prefix_len(&self.buffer)
            .min(self.buffer.len());
        let carry_tail =
            split < self.buffer.len() && self.converter.has_partial_tool_call(&self.buffer[split..]);

        let consumed = if carry_tail {
            let tail = self.buffer.split_off(split);
            std::mem::replace(&mut self.buffer, tail)
        } else {
            std::mem::take(&mut self.buffer)
        };

        if let Some(logger) = &self.logger {
            logger.log_raw_tool_body(&consumed);
        }
        let tool_calls = self
            .converter
            .parse_tool_calls_with_index(&consumed, &mut self.call_id);
        let content = self.converter.clean_content(&consumed);

        if tool_calls.is_empty() {
            crate::log_warn!("Finished tool call markup held no function block: {:?}", consumed);
        } else {
            log_tool_calls("Stream", &tool_calls);
            if let Some(logger) = &self.logger {
                logger.log_tool_calls("parsed", &tool_calls);
            }
        }

        if self.buffer.is_empty() {
            self.transition(ParserState::Idle);
        } else {
            crate::log_debug!("Carrying unfinished markup over: {:?}", self.buffer);
            self.transition(ParserState::Pending);
        }
        StreamResult::ToolCalls {
            tool_calls,
            content,
        }
    }

    /// End the turn: whatever is still buffered is treated as final prose.
    /// Unfinished markup is not parsed.
    pub fn flush(&mut self) -> String {
        let buffered = std::mem::take(&mut self.buffer);
        if self.state == ParserState::Pending {
            crate::log_warn!(
                "Turn ended inside tool call markup, discarding it: {:?}",
                buffered
            );
        }
        let content = self.converter.clean_content(&buffered);
        if let Some(logger) = &self.logger {
            logger.log_flush(&content);
        }
        self.transition(ParserState::Idle);
        content
    }

    /// Start a new turn with the same converter.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.accumulated_output.clear();
        self.call_id = 0;
        self.transition(ParserState::Idle);
    }

    fn transition(&mut self, next: ParserState) {
        if self.state != next {
            crate::log_debug!("Stream parser state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    // --- Chunk creation helpers ---

    fn chunk(&self, delta: Delta) -> ChatCompletionChunk {
        ChatCompletionChunk {
            id: format!("chatcmpl-{}", uuid::Uuid::new_v4().simple()),
            object: "chat.completion.chunk",
            created: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
            model: self.model_id.clone(),
            choices: vec![ChatChoiceChunk {
                index: 0,
                delta,
                finish_reason: None,
            }],
        }
    }

    /// Create a content chunk for streaming
    pub fn create_content_chunk(&self, content: &str) -> ChatCompletionChunk {
        self.chunk(Delta {
            content: Some(content.to_string()),
            tool_calls: None,
        })
    }

    /// Create a tool call chunk for streaming
    pub fn create_tool_chunk(&self, tools: Vec<ToolCall>) -> ChatCompletionChunk {
        self.chunk(Delta {
            content: None,
            tool_calls: Some(
                tools
                    .into_iter()
                    .enumerate()
                    .map(|(i, tc)| PublicToolCall {
                        index: Some(i),
                        id: tc.id,
                        type_: tc.tool_type,
                        function: tc.function,
                    })
                    .collect(),
            ),
        })
    }
}
