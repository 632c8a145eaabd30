use rayon::prelude::*;
use std::collections::{btree_set, BTreeMap, BTreeSet, HashMap, HashSet};

use crate::config::{DEFAULT_STATUS_FILTER, MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON};
use crate::document::{compute_average_rating, Document, DocumentData, DocumentStatus, MatchResult};
use crate::error::{Error, Result};
use crate::index::{DocId, InvertedIndex};
use crate::query::Query;
use crate::stop_words::StopWords;
use crate::tokenizer::{is_valid_word, split_into_words};

/// In-memory TF-IDF search engine over explicitly added documents.
///
/// Mutation takes `&mut self`, so a single writer is enforced by the borrow checker.
/// Use [`SharedSearchServer`](crate::shared::SharedSearchServer) to share one engine
/// between threads.
#[derive(Debug, Clone, Default)]
pub struct SearchServer {
    stop_words: StopWords,
    documents: HashMap<DocId, DocumentData>,
    document_ids: BTreeSet<DocId>,
    index: InvertedIndex,
}

impl SearchServer {
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_stop_words(StopWords::new(stop_words))
    }

    /// Stop words given as one space-delimited string.
    pub fn from_stop_words_text(text: &str) -> Self {
        Self::with_stop_words(StopWords::from_text(text))
    }

    pub fn with_stop_words(stop_words: StopWords) -> Self {
        Self { stop_words, ..Self::default() }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if id < 0 {
            return Err(Error::InvalidDocument { id, reason: "id is negative" });
        }
        if self.documents.contains_key(&id) {
            return Err(Error::InvalidDocument { id, reason: "id is already indexed" });
        }
        let words = self.split_into_words_no_stop(text)?;
        self.index.add_document(id, &words);
        self.documents.insert(
            id,
            DocumentData { rating: compute_average_rating(ratings), status, text: text.to_string() },
        );
        self.document_ids.insert(id);
        tracing::debug!(id, words = words.len(), vocabulary = self.index.word_count(), %status, "document added");
        Ok(())
    }

    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(Error::InvalidWord(word.to_string()));
            }
            if !self.stop_words.is_stop_word(word) {
                words.push(word);
            }
        }
        Ok(words)
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Live document ids in ascending order.
    pub fn iter(&self) -> std::iter::Copied<btree_set::Iter<'_, DocId>> {
        self.document_ids.iter().copied()
    }

    pub fn document_ids(&self) -> &BTreeSet<DocId> {
        &self.document_ids
    }

    pub fn document(&self, id: DocId) -> Option<&DocumentData> {
        self.documents.get(&id)
    }

    /// Newly built word → term frequency map for `id`; empty when the id is not live.
    ///
    /// The words are views into the engine's interned strings.
    pub fn get_word_frequencies(&self, id: DocId) -> BTreeMap<&str, f64> {
        self.index
            .word_frequencies(id)
            .map(|freqs| freqs.iter().map(|(word, &tf)| (&**word, tf)).collect())
            .unwrap_or_default()
    }

    /// Top documents with [`DEFAULT_STATUS_FILTER`] status.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, DEFAULT_STATUS_FILTER)
    }

    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with(raw_query, move |_, s, _| s == status)
    }

    /// Top documents accepted by `predicate(id, status, rating)`.
    pub fn find_top_documents_with<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let query = Query::parse(raw_query, &self.stop_words)?;
        let mut matched = self.find_all_documents(&query, &predicate);
        sort_by_relevance(&mut matched);
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        Ok(matched)
    }

    pub fn par_find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.par_find_top_documents_by_status(raw_query, DEFAULT_STATUS_FILTER)
    }

    pub fn par_find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.par_find_top_documents_with(raw_query, move |_, s, _| s == status)
    }

    pub fn par_find_top_documents_with<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let query = Query::parse(raw_query, &self.stop_words)?;
        let mut matched = self.par_find_all_documents(&query, &predicate);
        sort_by_relevance(&mut matched);
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        Ok(matched)
    }

    // Only called with the posting list of a word present in the index, so `containing >= 1`.
    fn inverse_document_freq(&self, containing: usize) -> f64 {
        (self.document_count() as f64 / containing as f64).ln()
    }

    fn find_all_documents<P>(&self, query: &Query<'_>, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let mut relevance: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = self.index.postings(word) else { continue };
            let idf = self.inverse_document_freq(postings.len());
            for (&id, &tf) in postings.iter() {
                *relevance.entry(id).or_insert(0.0) += tf * idf;
            }
        }
        for word in &query.minus_words {
            let Some(postings) = self.index.postings(word) else { continue };
            for id in postings.keys() {
                relevance.remove(id);
            }
        }
        relevance
            .into_iter()
            .filter_map(|(id, relevance)| self.accept(id, relevance, predicate))
            .collect()
    }

    fn par_find_all_documents<P>(&self, query: &Query<'_>, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let relevance = query
            .plus_words
            .par_iter()
            .fold(HashMap::new, |mut acc: HashMap<DocId, f64>, word| {
                let Some(postings) = self.index.postings(word) else { return acc };
                let idf = self.inverse_document_freq(postings.len());
                for (&id, &tf) in postings.iter() {
                    *acc.entry(id).or_insert(0.0) += tf * idf;
                }
                acc
            })
            .reduce(HashMap::new, |mut left, right| {
                for (id, r) in right {
                    *left.entry(id).or_insert(0.0) += r;
                }
                left
            });
        let excluded: HashSet<DocId> = query
            .minus_words
            .par_iter()
            .flat_map_iter(|word| {
                self.index
                    .postings(word)
                    .map(|postings| postings.keys().copied().collect::<Vec<_>>())
                    .unwrap_or_default()
            })
            .collect();

        let mut matched: Vec<Document> = relevance
            .into_par_iter()
            .filter(|(id, _)| !excluded.contains(id))
            .filter_map(|(id, relevance)| self.accept(id, relevance, predicate))
            .collect();
        matched.sort_unstable_by_key(|d| d.id);
        matched
    }

    fn accept<P>(&self, id: DocId, relevance: f64, predicate: &P) -> Option<Document>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        let data = self.documents.get(&id)?;
        predicate(id, data.status, data.rating).then_some(Document { id, relevance, rating: data.rating })
    }

    fn document_status(&self, id: DocId) -> Result<DocumentStatus> {
        self.documents.get(&id).map(|d| d.status).ok_or(Error::UnknownDocument(id))
    }

    /// Plus words of `raw_query` found in document `id`, or nothing if a minus word is found.
    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<MatchResult<'_>> {
        let query = Query::parse(raw_query, &self.stop_words)?;
        let status = self.document_status(id)?;

        if query.minus_words.iter().any(|word| self.index.find_in_document(word, id).is_some()) {
            return Ok(MatchResult { words: Vec::new(), status });
        }
        let words = query
            .plus_words
            .iter()
            .filter_map(|word| self.index.find_in_document(word, id))
            .collect();
        Ok(MatchResult { words, status })
    }

    pub fn par_match_document(&self, raw_query: &str, id: DocId) -> Result<MatchResult<'_>> {
        let query = Query::parse_unnormalized(raw_query, &self.stop_words)?;
        let status = self.document_status(id)?;

        if query.minus_words.par_iter().any(|word| self.index.find_in_document(word, id).is_some()) {
            return Ok(MatchResult { words: Vec::new(), status });
        }
        let mut words: Vec<&str> = query
            .plus_words
            .par_iter()
            .filter_map(|word| self.index.find_in_document(word, id))
            .collect();
        words.sort_unstable();
        words.dedup();
        Ok(MatchResult { words, status })
    }

    /// Remove a document from every structure. Unknown ids are ignored.
    pub fn remove_document(&mut self, id: DocId) {
        if self.documents.remove(&id).is_none() {
            return;
        }
        self.document_ids.remove(&id);
        self.index.remove_document(id);
        tracing::debug!(id, "document removed");
    }

    pub fn par_remove_document(&mut self, id: DocId) {
        if self.documents.remove(&id).is_none() {
            return;
        }
        self.document_ids.remove(&id);
        self.index.par_remove_document(id);
        tracing::debug!(id, "document removed");
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocId;
    type IntoIter = std::iter::Copied<btree_set::Iter<'a, DocId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Relevance descending; documents within [`RELEVANCE_EPSILON`] of each other by rating descending.
fn sort_by_relevance(documents: &mut [Document]) {
    documents.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    let mut start = 0;
    while start < documents.len() {
        let head = documents[start].relevance;
        let end = documents[start..]
            .iter()
            .position(|d| head - d.relevance >= RELEVANCE_EPSILON)
            .map_or(documents.len(), |offset| start + offset);
        documents[start..end].sort_by(|a, b| b.rating.cmp(&a.rating));
        start = end;
    }
}
