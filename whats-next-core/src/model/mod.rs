//! N-gram indexing and next-word suggestion.
//!
//! - Per-query next-word frequency tables (`State`)
//! - Per-text sub-indexes (`TextIndex`)
//! - The aggregating, suggestion-answering indexer (`TextIndexer`)

/// Next-word frequency table of one query.
///
/// Keeps first-observation order so aggregated results are deterministic.
pub mod state;

/// N-gram sub-index of a single text.
///
/// Handles sentence ingestion and window sliding for one query length.
pub mod text_index;

/// Indexer owning every sub-index and answering suggestions.
pub mod text_indexer;
