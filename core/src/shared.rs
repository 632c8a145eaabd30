use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::document::{Document, DocumentStatus};
use crate::duplicates::remove_duplicates;
use crate::error::Result;
use crate::index::DocId;
use crate::server::SearchServer;

/// Owned counterpart of [`MatchResult`](crate::MatchResult), returned once the lock is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedMatch {
    pub words: Vec<String>,
    pub status: DocumentStatus,
}

/// Cloneable handle that lets many threads share one [`SearchServer`].
///
/// Queries run under a read lock and may proceed concurrently; adds and removals
/// take the write lock.
#[derive(Clone, Default)]
pub struct SharedSearchServer {
    inner: Arc<RwLock<SearchServer>>,
}

impl SharedSearchServer {
    pub fn new(server: SearchServer) -> Self {
        Self { inner: Arc::new(RwLock::new(server)) }
    }

    /// Direct read access for calls not wrapped here. Do not hold it across writes.
    pub fn read(&self) -> RwLockReadGuard<'_, SearchServer> {
        self.inner.read()
    }

    pub fn add_document(&self, id: DocId, text: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        self.inner.write().add_document(id, text, status, ratings)
    }

    pub fn remove_document(&self, id: DocId) {
        self.inner.write().remove_document(id);
    }

    pub fn par_remove_document(&self, id: DocId) {
        self.inner.write().par_remove_document(id);
    }

    pub fn remove_duplicates(&self) -> Vec<DocId> {
        remove_duplicates(&mut self.inner.write())
    }

    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.inner.read().find_top_documents(raw_query)
    }

    pub fn find_top_documents_by_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.inner.read().find_top_documents_by_status(raw_query, status)
    }

    pub fn find_top_documents_with<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool,
    {
        self.inner.read().find_top_documents_with(raw_query, predicate)
    }

    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<OwnedMatch> {
        let server = self.inner.read();
        let matched = server.match_document(raw_query, id)?;
        Ok(OwnedMatch {
            words: matched.words.into_iter().map(str::to_string).collect(),
            status: matched.status,
        })
    }

    pub fn get_word_frequencies(&self, id: DocId) -> BTreeMap<String, f64> {
        self.inner
            .read()
            .get_word_frequencies(id)
            .into_iter()
            .map(|(word, tf)| (word.to_string(), tf))
            .collect()
    }

    pub fn document_count(&self) -> usize {
        self.inner.read().document_count()
    }

    pub fn document_ids(&self) -> Vec<DocId> {
        self.inner.read().iter().collect()
    }
}
