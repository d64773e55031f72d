// Selection and pooling of model-specific reasoning parsers.
//
// Parsers form a closed set of named variants rather than an open registry:
// adding support for a new model means adding a variant and a pattern here.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::{debug, warn};

use crate::reasoning_parser::{
    parsers::Ernie45Parser,
    traits::{ParseError, ReasoningParser},
};
use crate::tokenizer::TokenVocab;

/// Type alias for pooled parser instances.
/// Parsers are immutable after construction, so a plain `Arc` is enough for
/// concurrent sharing; no per-instance lock is needed.
pub type PooledParser = Arc<dyn ReasoningParser>;

/// The closed set of supported parser variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ReasoningParserType {
    Ernie45,
}

/// Model-id substring patterns, checked in order; first match wins.
const MODEL_PATTERNS: &[(&str, ReasoningParserType)] =
    &[("ernie", ReasoningParserType::Ernie45)];

impl ReasoningParserType {
    /// Stable key for this variant, used for pool lookups and diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ReasoningParserType::Ernie45 => "ernie45",
        }
    }

    /// Resolve a variant from a model id by case-insensitive substring
    /// matching.
    pub fn from_model_id(model_id: &str) -> Option<Self> {
        let model_lower = model_id.to_lowercase();
        MODEL_PATTERNS
            .iter()
            .find(|(pattern, _)| model_lower.contains(pattern))
            .map(|&(_, parser_type)| parser_type)
    }

    /// Construct a fresh parser of this variant against the given
    /// vocabulary.
    pub fn create(
        self,
        vocab: &dyn TokenVocab,
    ) -> Result<Box<dyn ReasoningParser>, ParseError> {
        match self {
            ReasoningParserType::Ernie45 => Ok(Box::new(Ernie45Parser::new(vocab)?)),
        }
    }
}

/// Factory for creating reasoning parsers based on model id, with pooling.
#[derive(Clone, Default)]
pub struct ParserFactory {
    /// Shared parser instances, keyed by model id. One vocabulary per model
    /// id is assumed, since the sentinel table is vocabulary-derived.
    pool: Arc<RwLock<HashMap<String, PooledParser>>>,
}

impl ParserFactory {
    /// Create a new factory with an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether a parser variant exists for this model id.
    pub fn has_parser_for_model(&self, model_id: &str) -> bool {
        ReasoningParserType::from_model_id(model_id).is_some()
    }

    /// Create a fresh parser instance for the given model id (not pooled).
    ///
    /// Unknown model ids are an error rather than a passthrough: every
    /// variant here requires resolvable sentinel markers and there is no
    /// degraded mode.
    pub fn create(
        &self,
        model_id: &str,
        vocab: &dyn TokenVocab,
    ) -> Result<Box<dyn ReasoningParser>, ParseError> {
        let Some(parser_type) = ReasoningParserType::from_model_id(model_id) else {
            warn!(model_id, "no reasoning parser variant for model");
            return Err(ParseError::UnknownModel(model_id.to_string()));
        };
        debug!(model_id, parser = parser_type.name(), "creating reasoning parser");
        parser_type.create(vocab)
    }

    /// Get a shared parser for the given model id, creating and pooling one
    /// on first use. The vocabulary is only consulted on a pool miss.
    pub fn get_pooled(
        &self,
        model_id: &str,
        vocab: &dyn TokenVocab,
    ) -> Result<PooledParser, ParseError> {
        {
            let pool = self.pool.read().unwrap();
            if let Some(parser) = pool.get(model_id) {
                return Ok(Arc::clone(parser));
            }
        }

        let parser: PooledParser = Arc::from(self.create(model_id, vocab)?);

        // Another caller may have raced us here; keep whichever landed first
        let mut pool = self.pool.write().unwrap();
        let entry = pool
            .entry(model_id.to_string())
            .or_insert_with(|| Arc::clone(&parser));
        Ok(Arc::clone(entry))
    }

    /// Clear the parser pool, forcing new instances to be created.
    pub fn clear_pool(&self) {
        let mut pool = self.pool.write().unwrap();
        pool.clear();
    }
}
