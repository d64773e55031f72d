//! Reasoning segmentation for LLM generated output.
//!
//! Splits a model's output stream into reasoning content and final/response
//! content using the sentinel marker tokens the model was trained to emit.
//! Works both one-shot over a complete output string and incrementally over
//! streaming deltas; streamed fragments concatenate to the one-shot result
//! up to the formatting newlines swallowed at marker boundaries.

pub mod logging;
pub mod reasoning_parser;
pub mod tokenizer;

pub use reasoning_parser::{
    ParseError, ParserFactory, ParserResult, ReasoningParser, ReasoningParserType,
    StreamingContext,
};
pub use tokenizer::TokenVocab;
