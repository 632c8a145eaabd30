//! In-memory full-text search over explicitly added documents, ranked by TF-IDF.

pub mod config;
pub mod document;
pub mod duplicates;
pub mod error;
pub mod index;
pub mod process_queries;
pub mod query;
pub mod server;
pub mod shared;
pub mod stop_words;
pub mod tokenizer;

pub use document::{Document, DocumentData, DocumentStatus, MatchResult};
pub use error::{Error, Result};
pub use index::{DocId, InvertedIndex};
pub use query::Query;
pub use server::SearchServer;
pub use shared::SharedSearchServer;
pub use stop_words::StopWords;
