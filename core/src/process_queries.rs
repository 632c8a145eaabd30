use rayon::prelude::*;

use crate::document::Document;
use crate::error::Result;
use crate::server::SearchServer;

/// Run every query on the rayon pool. Results keep the order of `queries`.
pub fn process_queries<Q>(server: &SearchServer, queries: &[Q]) -> Result<Vec<Vec<Document>>>
where
    Q: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|query| server.find_top_documents(query.as_ref()))
        .collect()
}

/// [`process_queries`] flattened into one list, still in query order.
pub fn process_queries_joined<Q>(server: &SearchServer, queries: &[Q]) -> Result<Vec<Document>>
where
    Q: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentStatus, Error};

    fn server() -> SearchServer {
        let mut server = SearchServer::from_stop_words_text("and with");
        let texts = [
            "funny pet and nasty rat",
            "funny pet with curly hair",
            "funny pet and not very nasty rat",
            "pet with rat and rat and rat",
            "nasty rat with curly hair",
        ];
        for (id, text) in texts.iter().enumerate() {
            server.add_document(id as i32, text, DocumentStatus::Active, &[1, 2]).unwrap();
        }
        server
    }

    #[test]
    fn keeps_query_order() {
        let s = server();
        let queries = ["nasty rat -not", "not very funny nasty pet", "curly hair"];
        let lists = process_queries(&s, &queries).unwrap();
        assert_eq!(lists.len(), 3);
        assert_eq!(lists[0].len(), 3);
        assert_eq!(lists[1].len(), 5);
        assert_eq!(lists[2].len(), 2);
        for (query, list) in queries.iter().zip(&lists) {
            assert_eq!(list, &s.find_top_documents(query).unwrap());
        }
    }

    #[test]
    fn joined_flattens() {
        let s = server();
        let queries = vec!["curly hair".to_string(), "nasty rat -not".to_string()];
        let joined = process_queries_joined(&s, &queries).unwrap();
        let ids: Vec<i32> = joined.iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), 5);
        assert!(ids[..2].iter().all(|id| [1, 4].contains(id)));
    }

    #[test]
    fn bad_query_fails_the_batch() {
        let s = server();
        let err = process_queries(&s, &["rat", "--rat"]).unwrap_err();
        assert_eq!(err, Error::QuerySyntax("--rat".to_string()));
    }
}
