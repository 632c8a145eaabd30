use crate::DocId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid document id {id}: {reason}")]
    InvalidDocument { id: DocId, reason: &'static str },

    #[error("word {0:?} contains control characters")]
    InvalidWord(String),

    #[error("query word {0:?} is invalid")]
    QuerySyntax(String),

    #[error("document {0} is not indexed")]
    UnknownDocument(DocId),
}
