// Ernie 4.5 thinking model reasoning parser.
//
// The model's output format is
//     abc\n</think>\n\n\n<response>\ndef\n</response>\n
// or  abc\n</think>\ndef
// or  abc\n</think>\n\n\n<tool_call>\nxyz\n</tool_call>\n
// where 'abc' is reasoning content and 'def' is final content. There is no
// opening <think> in normal output; reasoning starts immediately.

use tracing::debug;

use crate::reasoning_parser::traits::{
    ParseError, ParserResult, ReasoningParser, StreamPhase, StreamingContext,
};
use crate::tokenizer::TokenVocab;

pub const THINK_START_TOKEN: &str = "<think>";
pub const THINK_END_TOKEN: &str = "</think>";
pub const RESPONSE_START_TOKEN: &str = "<response>";
pub const RESPONSE_END_TOKEN: &str = "</response>";
pub const TOOL_CALL_START_TOKEN: &str = "<tool_call>";
pub const TOOL_CALL_END_TOKEN: &str = "</tool_call>";
pub const NEWLINE_TOKEN: &str = "<0x0A>";

/// Sentinel marker token ids resolved against one vocabulary.
///
/// Each marker is a single atomic token in the vocabulary, so id membership
/// tests are exact where substring search against partially decoded text
/// would be fragile at chunk boundaries. The think markers are mandatory;
/// the rest may be absent, which disables their sub-segmentation.
#[derive(Debug, Clone)]
struct SentinelTable {
    think_start_id: u32,
    think_end_id: u32,
    response_start_id: Option<u32>,
    response_end_id: Option<u32>,
    tool_call_start_id: Option<u32>,
    tool_call_end_id: Option<u32>,
    newline_id: Option<u32>,
}

impl SentinelTable {
    fn resolve(vocab: &dyn TokenVocab) -> Result<Self, ParseError> {
        let think_start_id = vocab.token_to_id(THINK_START_TOKEN);
        let think_end_id = vocab.token_to_id(THINK_END_TOKEN);

        let (Some(think_start_id), Some(think_end_id)) = (think_start_id, think_end_id) else {
            return Err(ParseError::ConfigError(
                "could not locate think start/end tokens in the vocabulary".to_string(),
            ));
        };

        Ok(Self {
            think_start_id,
            think_end_id,
            response_start_id: vocab.token_to_id(RESPONSE_START_TOKEN),
            response_end_id: vocab.token_to_id(RESPONSE_END_TOKEN),
            tool_call_start_id: vocab.token_to_id(TOOL_CALL_START_TOKEN),
            tool_call_end_id: vocab.token_to_id(TOOL_CALL_END_TOKEN),
            newline_id: vocab.token_to_id(NEWLINE_TOKEN),
        })
    }

    /// Markers whose bare single-token delta is swallowed entirely.
    fn suppresses_delta(&self, id: u32) -> bool {
        id == self.think_start_id
            || id == self.think_end_id
            || self.response_start_id == Some(id)
            || self.response_end_id == Some(id)
    }

    /// All bracket markers, as used by the newline suppression rules.
    fn is_structural(&self, id: u32) -> bool {
        self.suppresses_delta(id)
            || self.tool_call_start_id == Some(id)
            || self.tool_call_end_id == Some(id)
    }
}

/// Reasoning parser for the Ernie 4.5 thinking model.
///
/// Stateless: the batch path is a pure function of the output string, and
/// the streaming path re-derives its phase on every call from the token id
/// history supplied in the context. One instance can serve any number of
/// concurrent generation streams.
#[derive(Debug, Clone)]
pub struct Ernie45Parser {
    sentinels: SentinelTable,
}

impl Ernie45Parser {
    /// Create a parser by resolving the sentinel markers against the given
    /// vocabulary. Fails if either think marker is missing; the others are
    /// optional.
    pub fn new(vocab: &dyn TokenVocab) -> Result<Self, ParseError> {
        let sentinels = SentinelTable::resolve(vocab)?;
        debug!(
            think_start = sentinels.think_start_id,
            think_end = sentinels.think_end_id,
            "resolved reasoning sentinel tokens"
        );
        Ok(Self { sentinels })
    }

    /// Derive the phase for this call from id membership of the think-end
    /// marker. Checked against the delta first so a marker arriving in this
    /// chunk is handled as a crossing even on the call that completes it.
    fn phase(&self, ctx: &StreamingContext<'_>) -> StreamPhase {
        if ctx.delta_token_ids.contains(&self.sentinels.think_end_id) {
            StreamPhase::Crossing
        } else if ctx.previous_token_ids.contains(&self.sentinels.think_end_id) {
            StreamPhase::Responding
        } else {
            StreamPhase::Thinking
        }
    }

    /// The think-end marker appears inside this delta: everything before it
    /// is reasoning, everything after it is candidate content.
    fn parse_crossing(&self, ctx: &StreamingContext<'_>) -> ParserResult {
        let delta = ctx.delta_text;
        // The id was in the delta, so the decoded text should contain the
        // marker; if it does not, treat the whole delta as reasoning.
        let (reasoning, rest) = match delta.find(THINK_END_TOKEN) {
            Some(idx) => (&delta[..idx], &delta[idx + THINK_END_TOKEN.len()..]),
            None => (delta, ""),
        };

        let mut content = rest.trim_start_matches('\n');
        if let Some(idx) = content.find(RESPONSE_START_TOKEN) {
            content = &content[idx + RESPONSE_START_TOKEN.len()..];
        }
        if let Some(idx) = content.rfind(RESPONSE_END_TOKEN) {
            content = &content[..idx];
        }

        ParserResult::new(
            Some(reasoning.to_string()),
            (!content.is_empty()).then(|| content.to_string()),
        )
    }

    /// Reasoning already closed in a previous call; only content can come
    /// out of this delta.
    fn parse_responding(&self, ctx: &StreamingContext<'_>) -> ParserResult {
        let sentinels = &self.sentinels;
        let delta_has = |id: Option<u32>| id.is_some_and(|id| ctx.delta_token_ids.contains(&id));

        let mut content = ctx.delta_text;

        if delta_has(sentinels.response_start_id) {
            content = content.trim_start_matches('\n');
            if let Some(idx) = content.find(RESPONSE_START_TOKEN) {
                content = &content[idx + RESPONSE_START_TOKEN.len()..];
            }
            // if </response> already arrived in the same delta, drop it too
            if let Some(idx) = content.rfind(RESPONSE_END_TOKEN) {
                content = &content[..idx];
            }
        } else if delta_has(sentinels.response_end_id) {
            if let Some(idx) = content.rfind(RESPONSE_END_TOKEN) {
                content = &content[..idx];
            }
        }

        // Newlines the model emits directly after </think>, <response>,
        // </response> or a tool_call marker are formatting, not content.
        let starts_with_newline = sentinels
            .newline_id
            .is_some_and(|nl| ctx.delta_token_ids.first() == Some(&nl));
        if starts_with_newline {
            let prev = ctx.previous_token_ids;
            let after_marker = prev.last().is_some_and(|&id| sentinels.is_structural(id));
            // second newline of the </think>\n\n pattern, where the first
            // one streamed with an earlier delta
            let after_think_end_newline =
                prev.len() > 1 && prev[prev.len() - 2] == sentinels.think_end_id;
            if after_marker || after_think_end_newline {
                content = content.trim_start_matches('\n');
            }
        }

        ParserResult::new(None, (!content.is_empty()).then(|| content.to_string()))
    }
}

impl ReasoningParser for Ernie45Parser {
    fn detect_and_parse_reasoning(&self, model_output: &str) -> ParserResult {
        // An explicit opening marker is stripped rather than treated as
        // content; reasoning is assumed to start immediately.
        let model_output = match model_output.find(THINK_START_TOKEN) {
            Some(idx) => &model_output[idx + THINK_START_TOKEN.len()..],
            None => model_output,
        };

        // The model may close reasoning without ever opening it, so the end
        // marker decides. Without it the whole output is reasoning.
        let Some(end_idx) = model_output.find(THINK_END_TOKEN) else {
            return ParserResult::reasoning(model_output.to_string());
        };

        let reasoning = &model_output[..end_idx];
        let mut content = &model_output[end_idx + THINK_END_TOKEN.len()..];

        let start_idx = content.find(RESPONSE_START_TOKEN);
        let stop_idx = content.rfind(RESPONSE_END_TOKEN);
        // narrow only when both markers exist in the correct order
        if let (Some(start), Some(stop)) = (start_idx, stop_idx) {
            if start < stop {
                content = &content[start + RESPONSE_START_TOKEN.len()..stop];
                content = content.strip_prefix('\n').unwrap_or(content);
            }
        }

        ParserResult::new(
            Some(reasoning.to_string()),
            (!content.is_empty()).then(|| content.to_string()),
        )
    }

    fn parse_reasoning_streaming(&self, ctx: &StreamingContext<'_>) -> Option<ParserResult> {
        // Bare structural markers are never echoed as content.
        if let [only] = ctx.delta_token_ids {
            if self.sentinels.suppresses_delta(*only) {
                return None;
            }
        }

        Some(match self.phase(ctx) {
            StreamPhase::Crossing => self.parse_crossing(ctx),
            StreamPhase::Responding => self.parse_responding(ctx),
            StreamPhase::Thinking => ParserResult::reasoning(ctx.delta_text.to_string()),
        })
    }

    fn is_reasoning_end(&self, token_ids: &[u32]) -> bool {
        token_ids.contains(&self.sentinels.think_end_id)
    }

    fn extract_content_ids(&self, token_ids: &[u32]) -> Vec<u32> {
        // Only occurrences strictly before the last position qualify: an end
        // marker as the very last token has nothing after it yet.
        let searchable = &token_ids[..token_ids.len().saturating_sub(1)];
        match searchable
            .iter()
            .position(|&id| id == self.sentinels.think_end_id)
        {
            Some(idx) => token_ids[idx + 1..].to_vec(),
            None => Vec::new(),
        }
    }

    fn model_type(&self) -> &str {
        "ernie45"
    }
}
