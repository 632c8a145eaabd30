//! Compile-time tuning constants for the search engine.

use crate::DocumentStatus;

/// Maximum number of documents returned by a top-K query.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Status accepted when a query is run without an explicit filter.
///
/// Changing this changes the result of every unfiltered query.
pub const DEFAULT_STATUS_FILTER: DocumentStatus = DocumentStatus::Active;

/// Relevance values closer than this are ranked as ties and ordered by rating.
pub const RELEVANCE_EPSILON: f64 = 1e-6;
