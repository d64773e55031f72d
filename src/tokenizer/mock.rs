//! Mock vocabulary implementation for testing

use std::collections::HashMap;

use super::traits::TokenVocab;

/// Mock vocabulary for testing purposes
pub struct MockVocab {
    vocab: HashMap<String, u32>,
}

impl Default for MockVocab {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVocab {
    /// Full sentinel set plus a few filler word tokens.
    pub fn new() -> Self {
        let tokens = vec![
            ("<think>", 100001),
            ("</think>", 100002),
            ("<response>", 100003),
            ("</response>", 100004),
            ("<tool_call>", 100005),
            ("</tool_call>", 100006),
            ("<0x0A>", 10),
            ("abc", 1),
            ("def", 2),
            ("xyz", 3),
            ("still", 4),
            ("thinking", 5),
            ("<eos>", 999),
        ];

        let mut vocab = HashMap::new();
        for (token, id) in tokens {
            vocab.insert(token.to_string(), id);
        }

        Self { vocab }
    }

    /// Only the mandatory think markers and the newline token, for models
    /// whose vocabulary lacks response/tool_call markers.
    pub fn minimal() -> Self {
        let mut vocab = HashMap::new();
        vocab.insert("<think>".to_string(), 100001);
        vocab.insert("</think>".to_string(), 100002);
        vocab.insert("<0x0A>".to_string(), 10);
        Self { vocab }
    }

    /// Remove a token, e.g. to simulate a vocabulary missing a marker.
    pub fn remove(&mut self, token: &str) {
        self.vocab.remove(token);
    }
}

impl TokenVocab for MockVocab {
    fn token_to_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }
}
