use std::collections::HashMap;

/// Vocabulary lookup capability supplied by the host tokenizer.
///
/// Sentinel markers are guaranteed by the model's vocabulary to be single
/// atomic tokens, so a marker string maps to at most one id. Absence of a
/// marker in the vocabulary is a valid outcome, not an error.
pub trait TokenVocab: Send + Sync {
    fn token_to_id(&self, token: &str) -> Option<u32>;
}

impl TokenVocab for HashMap<String, u32> {
    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.get(token).copied()
    }
}

impl<T: TokenVocab + ?Sized> TokenVocab for &T {
    fn token_to_id(&self, token: &str) -> Option<u32> {
        (**self).token_to_id(token)
    }
}
