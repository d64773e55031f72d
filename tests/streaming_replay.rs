// End-to-end tests for the Ernie 4.5 segmentation engine: batch scenarios
// and streaming replay against the batch result.

use reasoning_parser_rs::reasoning_parser::{
    Ernie45Parser, ParserResult, ReasoningParser, StreamingContext,
};
use reasoning_parser_rs::tokenizer::MockVocab;

const THINK_END: u32 = 100002;
const RESPONSE_START: u32 = 100003;
const RESPONSE_END: u32 = 100004;
const TOOL_CALL_START: u32 = 100005;
const NEWLINE: u32 = 10;

fn create_parser() -> Ernie45Parser {
    Ernie45Parser::new(&MockVocab::new()).unwrap()
}

/// Feed a tokenized output to the streaming parser in chunks of the given
/// sizes, concatenating each delta's fragments (absent = empty).
fn replay(
    parser: &dyn ReasoningParser,
    tokens: &[(&str, u32)],
    chunk_sizes: &[usize],
) -> (String, String) {
    assert_eq!(chunk_sizes.iter().sum::<usize>(), tokens.len());

    let mut reasoning = String::new();
    let mut content = String::new();
    let mut previous_text = String::new();
    let mut previous_ids: Vec<u32> = Vec::new();
    let mut offset = 0;

    for &size in chunk_sizes {
        let chunk = &tokens[offset..offset + size];
        offset += size;

        let delta_text: String = chunk.iter().map(|(text, _)| *text).collect();
        let delta_ids: Vec<u32> = chunk.iter().map(|(_, id)| *id).collect();
        let current_text = format!("{}{}", previous_text, delta_text);
        let mut current_ids = previous_ids.clone();
        current_ids.extend_from_slice(&delta_ids);

        let ctx = StreamingContext {
            previous_text: &previous_text,
            current_text: &current_text,
            delta_text: &delta_text,
            previous_token_ids: &previous_ids,
            current_token_ids: &current_ids,
            delta_token_ids: &delta_ids,
        };

        if let Some(result) = parser.parse_reasoning_streaming(&ctx) {
            reasoning.push_str(result.reasoning_content.as_deref().unwrap_or(""));
            content.push_str(result.content.as_deref().unwrap_or(""));
        }

        previous_text = current_text;
        previous_ids = current_ids;
    }

    (reasoning, content)
}

#[test]
fn batch_scenario_response_wrapped() {
    let parser = create_parser();
    let result =
        parser.detect_and_parse_reasoning("abc\n</think>\n\n\n<response>\ndef\n</response>\n");
    assert_eq!(
        result,
        ParserResult::new(Some("abc\n".to_string()), Some("def\n".to_string()))
    );
}

#[test]
fn batch_scenario_bare_content() {
    let parser = create_parser();
    let result = parser.detect_and_parse_reasoning("abc\n</think>\ndef");
    assert_eq!(result.reasoning_content.as_deref(), Some("abc\n"));
    assert_eq!(result.content.as_deref(), Some("\ndef"));
}

#[test]
fn batch_scenario_tool_call_untouched() {
    let parser = create_parser();
    let result =
        parser.detect_and_parse_reasoning("abc\n</think>\n\n\n<tool_call>\nxyz\n</tool_call>\n");
    assert_eq!(result.reasoning_content.as_deref(), Some("abc\n"));
    assert_eq!(
        result.content.as_deref(),
        Some("\n\n\n<tool_call>\nxyz\n</tool_call>\n")
    );
}

#[test]
fn batch_scenario_still_thinking() {
    let parser = create_parser();
    let result = parser.detect_and_parse_reasoning("still thinking");
    assert_eq!(result.reasoning_content.as_deref(), Some("still thinking"));
    assert_eq!(result.content, None);
}

#[test]
fn replay_matches_batch_for_response_wrapped_output() {
    let parser = create_parser();
    let tokens = [
        ("abc\n", 1),
        ("</think>", THINK_END),
        ("\n", NEWLINE),
        ("\n", NEWLINE),
        ("\n", NEWLINE),
        ("<response>", RESPONSE_START),
        ("\n", NEWLINE),
        ("def\n", 2),
        ("</response>", RESPONSE_END),
        ("\n", NEWLINE),
    ];
    let full_text: String = tokens.iter().map(|(text, _)| *text).collect();
    let batch = parser.detect_and_parse_reasoning(&full_text);

    // marker tokens stream alone, the response body streams in pieces
    let (reasoning, content) = replay(&parser, &tokens, &[1, 1, 5, 1, 2]);
    assert_eq!(Some(reasoning.as_str()), batch.reasoning_content.as_deref());
    assert_eq!(Some(content.as_str()), batch.content.as_deref());
}

#[test]
fn replay_matches_batch_token_by_token() {
    let parser = create_parser();
    let tokens = [
        ("abc", 1),
        ("\n", NEWLINE),
        ("</think>", THINK_END),
        ("\n", NEWLINE),
        ("def", 2),
    ];
    let (reasoning, content) = replay(&parser, &tokens, &[1; 5]);
    assert_eq!(reasoning, "abc\n");
    assert_eq!(content, "def");

    let batch = parser.detect_and_parse_reasoning("abc\n</think>\ndef");
    assert_eq!(Some(reasoning.as_str()), batch.reasoning_content.as_deref());
    // the batch path keeps the formatting newline that streaming already
    // attributed to the </think> boundary
    assert_eq!(batch.content.as_deref(), Some("\ndef"));
}

#[test]
fn replay_without_think_end_is_all_reasoning() {
    let parser = create_parser();
    let tokens = [("still ", 4), ("thinking", 5)];
    let (reasoning, content) = replay(&parser, &tokens, &[1, 1]);
    assert_eq!(reasoning, "still thinking");
    assert_eq!(content, "");
}

#[test]
fn replay_tool_call_body_is_preserved() {
    let parser = create_parser();
    let tokens = [
        ("abc", 1),
        ("</think>", THINK_END),
        ("\n", NEWLINE),
        ("<tool_call>", TOOL_CALL_START),
        ("\n", NEWLINE),
        ("xyz", 3),
    ];
    let (reasoning, content) = replay(&parser, &tokens, &[1; 6]);
    assert_eq!(reasoning, "abc");
    // tool_call markers are not suppressed and not narrowed; only the
    // formatting newlines around them are dropped
    assert_eq!(content, "<tool_call>xyz");
}

#[test]
fn suppression_is_distinct_from_empty_update() {
    let parser = create_parser();

    // a lone </think> token produces no update at all
    let ctx = StreamingContext {
        previous_text: "abc",
        current_text: "abc</think>",
        delta_text: "</think>",
        previous_token_ids: &[1],
        current_token_ids: &[1, THINK_END],
        delta_token_ids: &[THINK_END],
    };
    assert!(parser.parse_reasoning_streaming(&ctx).is_none());

    // a swallowed formatting newline produces an update with both fields
    // absent
    let ctx = StreamingContext {
        previous_text: "abc</think>",
        current_text: "abc</think>\n",
        delta_text: "\n",
        previous_token_ids: &[1, THINK_END],
        current_token_ids: &[1, THINK_END, NEWLINE],
        delta_token_ids: &[NEWLINE],
    };
    let result = parser.parse_reasoning_streaming(&ctx).unwrap();
    assert!(result.is_empty());
}

#[test]
fn boundary_queries_over_token_ids() {
    let parser = create_parser();

    assert!(!parser.is_reasoning_end(&[1, 2, 3]));
    assert!(parser.is_reasoning_end(&[1, THINK_END]));

    // end marker as the very last token: nothing after it yet
    assert_eq!(
        parser.extract_content_ids(&[1, 2, THINK_END]),
        Vec::<u32>::new()
    );
    // end marker mid-sequence: exactly the trailing ids
    assert_eq!(
        parser.extract_content_ids(&[1, THINK_END, NEWLINE, 2]),
        vec![NEWLINE, 2]
    );
}
