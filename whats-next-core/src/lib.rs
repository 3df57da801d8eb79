//! N-gram word suggestion library.
//!
//! This crate indexes plain texts into fixed-length word n-grams and
//! answers "which word most often follows this exact query" across every
//! indexed text. It includes:
//! - A pluggable sentence/word tokenizer with a rule-based default
//! - Per-text n-gram sub-indexes with occurrence counts
//! - An indexer aggregating all sub-indexes to rank next words
//! - Source-text providers (Project Gutenberg, local files)
//!
//! The indexing and suggestion code never prints or logs; failures are
//! reported through [`IndexError`].
//!
//! ```
//! use whats_next_core::TextIndexer;
//!
//! let mut indexer = TextIndexer::new(2, false)?;
//! indexer.add_text(1, "Python is great! Python is funny! Python is great!");
//! indexer.add_text(2, "Python is slow!");
//!
//! assert_eq!(indexer.suggest(&["python", "is"])?, vec!["great"]);
//! # Ok::<(), whats_next_core::IndexError>(())
//! ```

/// Error taxonomy of the indexer.
pub mod error;

/// N-gram sub-indexes and the aggregating indexer.
pub mod model;

/// Source-text providers feeding raw text into the indexer.
pub mod source;

/// Text directory helpers.
///
/// Not exposed
pub(crate) mod io;

/// Paragraph, sentence and word segmentation.
pub mod tokenize;

pub use error::{IndexError, Result};
pub use model::text_index::TextIndex;
pub use model::text_indexer::{MAX_QUERY_COUNT, MIN_QUERY_COUNT, TextId, TextIndexer};
pub use tokenize::{RuleTokenizer, Tokenizer};
