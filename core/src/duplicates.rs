use std::collections::BTreeSet;

use crate::index::DocId;
use crate::server::SearchServer;

/// Remove every document whose vocabulary equals that of a lower id.
///
/// Returns the removed ids in ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocId> {
    let mut seen: BTreeSet<BTreeSet<&str>> = BTreeSet::new();
    let mut duplicates = Vec::new();
    for id in server.iter() {
        let words: BTreeSet<&str> = server.get_word_frequencies(id).into_keys().collect();
        if !seen.insert(words) {
            tracing::info!(id, "found duplicate document");
            duplicates.push(id);
        }
    }
    drop(seen);

    for &id in &duplicates {
        server.remove_document(id);
    }
    duplicates
}
