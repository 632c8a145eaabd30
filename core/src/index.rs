use parking_lot::{RwLock, RwLockReadGuard};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;

pub type DocId = i32;

/// Term frequency of every word in one document, keyed by the interned word.
pub type WordFreqs = BTreeMap<Arc<str>, f64>;

/// Term frequency of one word in every document containing it.
pub type Postings = BTreeMap<DocId, f64>;

/// Word → document postings together with the per-document view of the same data.
///
/// Each distinct word is interned once as an `Arc<str>` and shared by both maps.
/// Both maps are updated together, so `word_to_document_freqs[w][d]` equals
/// `document_to_word_freqs[d][w]` for every live pair.
///
/// Each posting list sits behind its own lock so a parallel removal can erase
/// one document from many words at once. Sequential writers go through
/// `get_mut` and never lock.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    word_to_document_freqs: BTreeMap<Arc<str>, RwLock<Postings>>,
    document_to_word_freqs: BTreeMap<DocId, WordFreqs>,
}

impl Clone for InvertedIndex {
    fn clone(&self) -> Self {
        let word_to_document_freqs = self
            .word_to_document_freqs
            .iter()
            .map(|(word, postings)| (Arc::clone(word), RwLock::new(postings.read().clone())))
            .collect();
        Self { word_to_document_freqs, document_to_word_freqs: self.document_to_word_freqs.clone() }
    }
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    fn intern(&self, word: &str) -> Arc<str> {
        match self.word_to_document_freqs.get_key_value(word) {
            Some((key, _)) => Arc::clone(key),
            None => Arc::from(word),
        }
    }

    /// Index the already filtered words of a document. The caller guarantees `id` is new.
    pub fn add_document(&mut self, id: DocId, words: &[&str]) {
        let mut word_freqs = WordFreqs::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for &word in words {
                match word_freqs.get_mut(word) {
                    Some(tf) => *tf += inv_word_count,
                    None => {
                        word_freqs.insert(self.intern(word), inv_word_count);
                    }
                }
            }
        }
        for (word, &tf) in &word_freqs {
            self.word_to_document_freqs
                .entry(Arc::clone(word))
                .or_default()
                .get_mut()
                .insert(id, tf);
        }
        self.document_to_word_freqs.insert(id, word_freqs);
    }

    /// Drop every posting of `id`. Returns false when the document was not indexed.
    pub fn remove_document(&mut self, id: DocId) -> bool {
        let Some(word_freqs) = self.document_to_word_freqs.remove(&id) else {
            return false;
        };
        for word in word_freqs.keys() {
            if let Some(postings) = self.word_to_document_freqs.get_mut(word) {
                postings.get_mut().remove(&id);
            }
        }
        self.prune_empty(&word_freqs);
        true
    }

    /// Same final state as [`remove_document`](Self::remove_document). The document's
    /// own words are split across the rayon pool; other posting lists are not touched.
    pub fn par_remove_document(&mut self, id: DocId) -> bool {
        let Some(word_freqs) = self.document_to_word_freqs.remove(&id) else {
            return false;
        };
        let index = &self.word_to_document_freqs;
        word_freqs.par_iter().for_each(|(word, _)| {
            if let Some(postings) = index.get(word) {
                postings.write().remove(&id);
            }
        });
        self.prune_empty(&word_freqs);
        true
    }

    fn prune_empty(&mut self, removed: &WordFreqs) {
        for word in removed.keys() {
            if self.word_to_document_freqs.get_mut(word).is_some_and(|p| p.get_mut().is_empty()) {
                self.word_to_document_freqs.remove(word);
            }
        }
    }

    pub fn postings(&self, word: &str) -> Option<RwLockReadGuard<'_, Postings>> {
        self.word_to_document_freqs.get(word).map(|postings| postings.read())
    }

    /// The interned copy of `word` if document `id` contains it.
    pub fn find_in_document(&self, word: &str, id: DocId) -> Option<&str> {
        let (key, postings) = self.word_to_document_freqs.get_key_value(word)?;
        postings.read().contains_key(&id).then(|| &**key)
    }

    pub fn word_frequencies(&self, id: DocId) -> Option<&WordFreqs> {
        self.document_to_word_freqs.get(&id)
    }

    /// Number of distinct indexed words.
    pub fn word_count(&self) -> usize {
        self.word_to_document_freqs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvertedIndex {
        let mut index = InvertedIndex::new();
        index.add_document(0, &["white", "cat", "fashionable", "collar"]);
        index.add_document(1, &["fluffy", "cat", "fluffy", "tail"]);
        index
    }

    #[test]
    fn term_frequencies_are_fractions() {
        let index = sample();
        let p = index.postings("fluffy").unwrap();
        assert_eq!(p.len(), 1);
        assert!((p[&1] - 0.5).abs() < 1e-12);
        assert_eq!(index.postings("cat").unwrap().len(), 2);
    }

    #[test]
    fn views_stay_in_lockstep() {
        let index = sample();
        for (id, freqs) in &index.document_to_word_freqs {
            for (word, tf) in freqs {
                assert_eq!(index.word_to_document_freqs[word].read()[id], *tf);
            }
        }
    }

    #[test]
    fn words_are_interned_once() {
        let index = sample();
        let from_postings = index.word_to_document_freqs.get_key_value("cat").unwrap().0;
        let from_doc = index.document_to_word_freqs[&1].get_key_value("cat").unwrap().0;
        assert!(Arc::ptr_eq(from_postings, from_doc));
    }

    #[test]
    fn remove_prunes_empty_words() {
        let mut index = sample();
        assert!(index.remove_document(1));
        assert!(index.postings("fluffy").is_none());
        assert_eq!(index.postings("cat").unwrap().len(), 1);
        assert!(!index.remove_document(1));
    }

    fn snapshot(index: &InvertedIndex) -> BTreeMap<Arc<str>, Postings> {
        index
            .word_to_document_freqs
            .iter()
            .map(|(word, postings)| (Arc::clone(word), postings.read().clone()))
            .collect()
    }

    #[test]
    fn parallel_remove_matches_sequential() {
        let mut seq = sample();
        let mut par = sample();
        seq.remove_document(0);
        par.par_remove_document(0);
        assert_eq!(snapshot(&seq), snapshot(&par));
        assert_eq!(seq.document_to_word_freqs, par.document_to_word_freqs);
    }

    #[test]
    fn parallel_remove_in_large_vocabulary() {
        let mut seq = InvertedIndex::new();
        for id in 0..2_000 {
            let own = format!("word{id}");
            let shared = format!("group{}", id % 7);
            seq.add_document(id, &[own.as_str(), shared.as_str(), "common"]);
        }
        let mut par = seq.clone();
        for id in (0..2_000).step_by(9) {
            assert!(seq.remove_document(id));
            assert!(par.par_remove_document(id));
        }
        assert_eq!(snapshot(&seq), snapshot(&par));
        assert_eq!(seq.document_to_word_freqs, par.document_to_word_freqs);
        assert!(par.postings("word9").is_none());
        assert_eq!(par.postings("word10").unwrap().len(), 1);
        assert!(!par.par_remove_document(9));
    }

    #[test]
    fn clone_is_independent() {
        let original = sample();
        let mut copy = original.clone();
        copy.par_remove_document(1);
        assert!(original.postings("fluffy").is_some());
        assert!(copy.postings("fluffy").is_none());
    }

    #[test]
    fn empty_document_is_tracked() {
        let mut index = InvertedIndex::new();
        index.add_document(3, &[]);
        assert!(index.word_frequencies(3).unwrap().is_empty());
        assert!(index.remove_document(3));
        assert!(index.word_frequencies(3).is_none());
    }
}
