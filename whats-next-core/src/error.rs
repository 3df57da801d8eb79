use thiserror::Error;

/// Failures reported by [`TextIndexer`](crate::TextIndexer).
///
/// None of these leave the indexer in a modified state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
	/// The query count given at construction is outside the supported range.
	#[error("query count should be between {min} and {max}, got {query_count}", min = crate::MIN_QUERY_COUNT, max = crate::MAX_QUERY_COUNT)]
	InvalidConfiguration { query_count: usize },

	/// A query (or sub-index) does not have the configured number of words.
	#[error("queries with length {expected} supported, got {got} instead")]
	ArityMismatch { expected: usize, got: usize },

	/// The query was never observed in any indexed text.
	#[error("no suggestion found")]
	NoSuggestion,
}

pub type Result<T> = std::result::Result<T, IndexError>;
