use std::fmt;

use serde::Serialize;

/// Result of a segmentation step.
///
/// Both fields are optional so that "nothing to report" (`None`) stays
/// distinguishable from "reported the empty string" (`Some("")`). Hosts
/// embedding this in an OpenAI-style delta message rely on absent fields
/// being skipped during serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParserResult {
    /// The extracted reasoning text preceding the reasoning-end marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,

    /// The final/response text following the reasoning-end marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl ParserResult {
    /// Create a new ParserResult with the given reasoning and content.
    pub fn new(reasoning_content: Option<String>, content: Option<String>) -> Self {
        Self {
            reasoning_content,
            content,
        }
    }

    /// Create a result carrying only reasoning text.
    pub fn reasoning(text: String) -> Self {
        Self {
            reasoning_content: Some(text),
            content: None,
        }
    }

    /// Create a result carrying only content.
    pub fn content(text: String) -> Self {
        Self {
            reasoning_content: None,
            content: Some(text),
        }
    }

    /// Check if this result carries neither field.
    pub fn is_empty(&self) -> bool {
        self.reasoning_content.is_none() && self.content.is_none()
    }
}

impl fmt::Display for ParserResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ParserResult {{ reasoning: {} chars, content: {} chars }}",
            self.reasoning_content.as_deref().map_or(0, str::len),
            self.content.as_deref().map_or(0, str::len),
        )
    }
}

/// Inputs for one streaming segmentation call.
///
/// The engine is stateless across calls: everything needed to resume is
/// re-supplied here. Callers must uphold `previous_text + delta_text ==
/// current_text` and the same concatenation for the token id slices;
/// behavior under a broken invariant is unspecified.
#[derive(Debug, Clone, Copy)]
pub struct StreamingContext<'a> {
    pub previous_text: &'a str,
    pub current_text: &'a str,
    pub delta_text: &'a str,
    pub previous_token_ids: &'a [u32],
    pub current_token_ids: &'a [u32],
    pub delta_token_ids: &'a [u32],
}

/// Derived stage of the streaming state machine for a single call.
///
/// Never stored: each call re-derives its phase from token-id membership of
/// the reasoning-end marker in the previous vs delta id slices. Transitions
/// only move forward (Thinking -> Crossing -> Responding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPhase {
    /// End marker seen in neither previous nor delta ids.
    Thinking,
    /// End marker first appears in this delta.
    Crossing,
    /// End marker already present in the previous history.
    Responding,
}

/// Trait for segmenting reasoning content out of LLM outputs.
pub trait ReasoningParser: Send + Sync + fmt::Debug {
    /// Parses a standalone, complete model output. Returns the split of
    /// reasoning vs final content; marker tokens appear in neither output.
    fn detect_and_parse_reasoning(&self, model_output: &str) -> ParserResult;

    /// Parses a streaming delta. The return value is the delta's own
    /// contribution: concatenating the fragments from successive calls
    /// reproduces [`detect_and_parse_reasoning`] on the final full text,
    /// modulo the formatting newlines swallowed at marker boundaries.
    ///
    /// Returns `None` when the delta is fully suppressed (a bare structural
    /// marker token), which is distinct from a result with both fields
    /// absent.
    ///
    /// [`detect_and_parse_reasoning`]: ReasoningParser::detect_and_parse_reasoning
    fn parse_reasoning_streaming(&self, ctx: &StreamingContext<'_>) -> Option<ParserResult>;

    /// True iff the reasoning phase has ended within this token sequence.
    fn is_reasoning_end(&self, token_ids: &[u32]) -> bool;

    /// The token-id suffix after the reasoning-end marker, without decoding.
    /// An end marker sitting at the very last position yields an empty
    /// result, since nothing follows it yet.
    fn extract_content_ids(&self, token_ids: &[u32]) -> Vec<u32>;

    /// Get the model type this parser is designed for.
    fn model_type(&self) -> &str;
}

/// Error types for parser construction and selection.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown model type: {0}")]
    UnknownModel(String),

    #[error("Parser configuration error: {0}")]
    ConfigError(String),
}
