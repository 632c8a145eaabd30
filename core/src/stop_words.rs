use std::collections::BTreeSet;

use crate::tokenizer::split_into_words;

/// Case-sensitive set of words excluded from indexing and queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .filter_map(|w| {
                let w = w.as_ref();
                (!w.is_empty()).then(|| w.to_string())
            })
            .collect();
        Self { words }
    }

    /// Build from a single space-delimited string, e.g. `"and in on"`.
    pub fn from_text(text: &str) -> Self {
        Self::new(split_into_words(text))
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
