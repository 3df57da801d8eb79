use std::collections::HashMap;

use super::state::State;
use super::text_index::TextIndex;
use crate::error::{IndexError, Result};
use crate::tokenize::{RuleTokenizer, Tokenizer};

/// Smallest supported number of words in a query.
pub const MIN_QUERY_COUNT: usize = 1;

/// Largest supported number of words in a query.
pub const MAX_QUERY_COUNT: usize = 5;

/// Caller-supplied identifier of an indexed text.
pub type TextId = u64;

/// Checks that `query_count` is within [`MIN_QUERY_COUNT`] and [`MAX_QUERY_COUNT`].
pub fn validate_query_count(query_count: usize) -> Result<()> {
	if (MIN_QUERY_COUNT..=MAX_QUERY_COUNT).contains(&query_count) {
		Ok(())
	} else {
		Err(IndexError::InvalidConfiguration { query_count })
	}
}

/// Suggests next words from all the texts added so far.
///
/// Each indexer answers queries of exactly one length, fixed at construction:
/// an indexer created with a query count of 3 rejects queries of 5 words.
///
/// # Responsibilities
/// - Index each text once, under its caller-supplied id
/// - Aggregate the next-word counts of a query across every text
/// - Return the most frequent next words
///
/// # Invariants
/// - `query_count` is within [`MIN_QUERY_COUNT`]..=[`MAX_QUERY_COUNT`]
/// - `order` and `indexes` hold the same ids, `order` in insertion order
/// - An indexed text is never re-indexed, modified or removed
///
/// # Concurrency
/// `add_text` needs `&mut self`; share an indexer behind a lock to index and
/// query from several threads.
#[derive(Debug, Clone)]
pub struct TextIndexer<T: Tokenizer = RuleTokenizer> {
	query_count: usize,
	split_paragraphs: bool,
	tokenizer: T,

	/// Text ids in the order they were added
	order: Vec<TextId>,

	/// Mapping from text id to the sub-index of that text
	indexes: HashMap<TextId, TextIndex>,
}

impl TextIndexer<RuleTokenizer> {
	/// Creates an indexer answering queries of `query_count` words, using the
	/// rule-based tokenizer.
	///
	/// Paragraph splitting reduces suggestions built on text broken by
	/// multiple empty lines (tables of contents, indexes).
	///
	/// # Errors
	/// Returns [`IndexError::InvalidConfiguration`] if `query_count` is not
	/// between 1 and 5.
	pub fn new(query_count: usize, split_paragraphs: bool) -> Result<Self> {
		Self::with_tokenizer(query_count, split_paragraphs, RuleTokenizer)
	}
}

impl<T: Tokenizer> TextIndexer<T> {
	/// Creates an indexer with a custom tokenizer.
	///
	/// # Errors
	/// Returns [`IndexError::InvalidConfiguration`] if `query_count` is not
	/// between 1 and 5.
	pub fn with_tokenizer(query_count: usize, split_paragraphs: bool, tokenizer: T) -> Result<Self> {
		validate_query_count(query_count)?;
		Ok(Self {
			query_count,
			split_paragraphs,
			tokenizer,
			order: Vec::new(),
			indexes: HashMap::new(),
		})
	}

	pub fn query_count(&self) -> usize {
		self.query_count
	}

	pub fn split_paragraphs(&self) -> bool {
		self.split_paragraphs
	}

	/// Returns the ids of the indexed texts, in the order they were added.
	pub fn text_ids(&self) -> &[TextId] {
		&self.order
	}

	/// Returns `true` if a text was already added under `text_id`.
	pub fn contains(&self, text_id: TextId) -> bool {
		self.indexes.contains_key(&text_id)
	}

	/// Returns the sub-index of a text.
	pub fn text_index(&self, text_id: TextId) -> Option<&TextIndex> {
		self.indexes.get(&text_id)
	}

	/// Number of indexed texts.
	pub fn len(&self) -> usize {
		self.order.len()
	}

	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Adds a text to the indexer.
	///
	/// The text is split into sentences (and paragraphs if enabled), tokenized
	/// and indexed with this indexer's query count.
	///
	/// # Notes
	/// - Adding an id twice is a no-op: the second text is discarded, not merged.
	/// - A text producing no n-gram is still recorded as added.
	pub fn add_text(&mut self, text_id: TextId, text: &str) {
		if self.contains(text_id) {
			return;
		}
		let index = self.prepare(text);
		self.register(text_id, index);
	}

	/// Builds the sub-index of a text without adding it.
	///
	/// Only needs `&self`, so the tokenizing work can run outside of an
	/// exclusive lock; the result is then added with [`Self::insert_index`].
	pub fn prepare(&self, text: &str) -> TextIndex {
		TextIndex::from_text(self.query_count, self.split_paragraphs, &self.tokenizer, text)
	}

	/// Adds a sub-index built by [`Self::prepare`] under `text_id`.
	///
	/// Same idempotence as [`Self::add_text`]: returns `Ok(false)` and drops
	/// `index` if the id is already present.
	///
	/// # Errors
	/// Returns [`IndexError::ArityMismatch`] if `index` was built for another
	/// query count.
	pub fn insert_index(&mut self, text_id: TextId, index: TextIndex) -> Result<bool> {
		if index.query_count() != self.query_count {
			return Err(IndexError::ArityMismatch { expected: self.query_count, got: index.query_count() });
		}
		if self.contains(text_id) {
			return Ok(false);
		}
		self.register(text_id, index);
		Ok(true)
	}

	fn register(&mut self, text_id: TextId, index: TextIndex) {
		self.order.push(text_id);
		self.indexes.insert(text_id, index);
	}

	/// Returns the next-word counts of `query` summed over every text.
	///
	/// Texts are visited in insertion order, so words appear in the order
	/// they were first encountered. The state is empty for an unknown query.
	///
	/// # Errors
	/// Returns [`IndexError::ArityMismatch`] if `query` does not have
	/// `query_count` words, checked before any lookup.
	pub fn counts<S: AsRef<str>>(&self, query: &[S]) -> Result<State> {
		if query.len() != self.query_count {
			return Err(IndexError::ArityMismatch { expected: self.query_count, got: query.len() });
		}
		let key: Vec<String> = query.iter().map(|word| word.as_ref().to_owned()).collect();

		let mut total = State::new();
		for state in self.order.iter().filter_map(|text_id| self.indexes.get(text_id)?.get(&key)) {
			total.merge(state);
		}
		Ok(total)
	}

	/// Suggests the words most often following `query`.
	///
	/// Matching is exact: the query is not lowercased, and indexed words are.
	///
	/// # Returns
	/// Every word tied for the highest count across all texts, in
	/// first-encounter order.
	///
	/// # Errors
	/// - [`IndexError::ArityMismatch`] if `query` does not have `query_count` words
	/// - [`IndexError::NoSuggestion`] if the query was never observed
	pub fn suggest<S: AsRef<str>>(&self, query: &[S]) -> Result<Vec<String>> {
		let total = self.counts(query)?;
		if total.is_empty() {
			return Err(IndexError::NoSuggestion);
		}
		Ok(total.best())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_count_bounds() {
		for query_count in MIN_QUERY_COUNT..=MAX_QUERY_COUNT {
			assert!(TextIndexer::new(query_count, false).is_ok());
		}
		for query_count in [0, 6, 100] {
			assert_eq!(
				TextIndexer::new(query_count, true).err(),
				Some(IndexError::InvalidConfiguration { query_count })
			);
		}
	}

	#[test]
	fn texts_are_recorded_in_order_even_without_ngrams() {
		let mut indexer = TextIndexer::new(3, false).unwrap();
		indexer.add_text(7, "Too short.");
		indexer.add_text(3, "");
		indexer.add_text(7, "Something else entirely here.");

		assert_eq!(indexer.text_ids(), &[7, 3]);
		assert!(indexer.text_index(7).is_some_and(TextIndex::is_empty));
	}

	#[test]
	fn counts_are_aggregated_in_first_encounter_order() {
		let mut indexer = TextIndexer::new(1, false).unwrap();
		indexer.add_text(1, "A cat. A dog.");
		indexer.add_text(2, "A bird. A dog. A cat.");

		let counts = indexer.counts(&["a"]).unwrap();
		assert_eq!(counts.iter().collect::<Vec<_>>(), vec![("cat", 2), ("dog", 2), ("bird", 1)]);
		assert_eq!(indexer.suggest(&["a"]).unwrap(), vec!["cat", "dog"]);
	}

	#[test]
	fn query_is_not_lowercased() {
		let mut indexer = TextIndexer::new(1, false).unwrap();
		indexer.add_text(1, "Python is slow!");
		assert_eq!(indexer.suggest(&["Python"]), Err(IndexError::NoSuggestion));
	}

	#[test]
	fn prepared_index_must_match_query_count() {
		let two = TextIndexer::new(2, false).unwrap();
		let mut one = TextIndexer::new(1, false).unwrap();

		let index = two.prepare("Python is slow!");
		assert_eq!(one.insert_index(1, index), Err(IndexError::ArityMismatch { expected: 1, got: 2 }));
		assert!(one.is_empty());

		let index = one.prepare("Python is slow!");
		assert_eq!(one.insert_index(1, index.clone()), Ok(true));
		assert_eq!(one.insert_index(1, index), Ok(false));
		assert_eq!(one.suggest(&["is"]).unwrap(), vec!["slow"]);
	}

	/// One sentence per line, words split on whitespace only.
	struct LineTokenizer;

	impl Tokenizer for LineTokenizer {
		fn segment_sentences<'a>(&self, paragraph: &'a str) -> Vec<&'a str> {
			paragraph.lines().filter(|line| !line.trim().is_empty()).collect()
		}

		fn split_words(&self, sentence: &str) -> Vec<String> {
			sentence.split_whitespace().map(str::to_owned).collect()
		}
	}

	#[test]
	fn custom_tokenizers_get_lowercased_filtered_words() {
		let mut indexer = TextIndexer::with_tokenizer(1, false, LineTokenizer).unwrap();
		indexer.add_text(1, "Python , IS \" Slow\nSlow ... done -- ok");

		assert_eq!(indexer.suggest(&["python"]).unwrap(), vec!["is"]);
		assert_eq!(indexer.suggest(&["is"]).unwrap(), vec!["slow"]);
		assert_eq!(indexer.suggest(&["slow"]).unwrap(), vec!["done"]);
		assert_eq!(indexer.suggest(&["--"]).unwrap(), vec!["ok"]);
		assert_eq!(indexer.suggest(&["Python"]), Err(IndexError::NoSuggestion));
		assert_eq!(indexer.suggest(&[","]), Err(IndexError::NoSuggestion));
	}
}
