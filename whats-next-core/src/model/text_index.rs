use std::collections::HashMap;

use super::state::State;
use super::text_indexer::validate_query_count;
use crate::error::Result;
use crate::tokenize::{Tokenizer, segment_paragraphs};

/// N-gram sub-index of a single text.
///
/// The `TextIndex` maps every query (a tuple of `query_count` words) seen in
/// the text to the [`State`] holding the words that followed it.
///
/// # Responsibilities
/// - Slide `query_count + 1` word windows over each sentence
/// - Accumulate next-word counts for each query
/// - Look up the state of an exact query
///
/// # Invariants
/// - `query_count` is never 0
/// - Every key of `states` has exactly `query_count` words
/// - Windows never span two sentences (nor two paragraphs when split)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextIndex {
	/// Number of words in a query
	query_count: usize,

	/// Mapping from a query to its next-word state
	states: HashMap<Vec<String>, State>,
}

impl TextIndex {
	/// Creates an empty sub-index for queries of `query_count` words.
	///
	/// The count is validated by the public constructors.
	pub(crate) fn new(query_count: usize) -> Self {
		debug_assert!(query_count >= 1);
		Self { query_count, states: HashMap::new() }
	}

	/// Builds the sub-index of a whole text, outside of any indexer.
	///
	/// Lets callers tokenize without holding a lock on a shared
	/// [`TextIndexer`](crate::TextIndexer); register the result with
	/// [`TextIndexer::insert_index`](crate::TextIndexer::insert_index).
	///
	/// # Errors
	/// Returns [`IndexError::InvalidConfiguration`](crate::IndexError::InvalidConfiguration)
	/// if `query_count` is not between 1 and 5.
	pub fn build<T: Tokenizer + ?Sized>(query_count: usize, split_paragraphs: bool, tokenizer: &T, text: &str) -> Result<Self> {
		validate_query_count(query_count)?;
		Ok(Self::from_text(query_count, split_paragraphs, tokenizer, text))
	}

	/// Builds the sub-index of a whole text.
	///
	/// With `split_paragraphs`, each blank-line separated paragraph is
	/// segmented on its own. Otherwise the text is one paragraph.
	pub(crate) fn from_text<T: Tokenizer + ?Sized>(query_count: usize, split_paragraphs: bool, tokenizer: &T, text: &str) -> Self {
		let mut index = Self::new(query_count);
		if split_paragraphs {
			for paragraph in segment_paragraphs(text) {
				index.add_paragraph(tokenizer, paragraph);
			}
		} else {
			index.add_paragraph(tokenizer, text);
		}
		index
	}

	fn add_paragraph<T: Tokenizer + ?Sized>(&mut self, tokenizer: &T, paragraph: &str) {
		for sentence in tokenizer.segment_sentences(paragraph) {
			let words = tokenizer.tokenize_words(sentence);
			self.add_sentence(&words);
		}
	}

	/// Adds the words of one sentence to the index.
	///
	/// Breaks the words into overlapping windows of `query_count + 1` words:
	/// the first `query_count` words are the query, the last one the next word.
	///
	/// # Notes
	/// - Words are stored as given; normalization is the tokenizer's job.
	/// - Sentences shorter than `query_count + 1` words are ignored.
	pub fn add_sentence<S: AsRef<str>>(&mut self, words: &[S]) {
		for window in words.windows(self.query_count + 1) {
			let (query, next_word) = window.split_at(self.query_count);
			let query: Vec<String> = query.iter().map(|word| word.as_ref().to_owned()).collect();

			// Get or create the state for this query
			self.states.entry(query).or_default().add_transition(next_word[0].as_ref());
		}
	}

	/// Returns the state of an exact query, `None` if never observed.
	pub fn get(&self, query: &[String]) -> Option<&State> {
		self.states.get(query)
	}

	/// Number of words in a query of this index.
	pub fn query_count(&self) -> usize {
		self.query_count
	}

	/// Number of distinct queries.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tokenize::RuleTokenizer;

	fn query(words: &[&str]) -> Vec<String> {
		words.iter().map(|word| word.to_string()).collect()
	}

	#[test]
	fn windows_slide_with_stride_one() {
		let mut index = TextIndex::new(2);
		index.add_sentence(&["a", "b", "c", "d"]);

		assert_eq!(index.len(), 2);
		assert_eq!(index.get(&query(&["a", "b"])).map(|s| s.best()), Some(vec!["c".to_owned()]));
		assert_eq!(index.get(&query(&["b", "c"])).map(|s| s.best()), Some(vec!["d".to_owned()]));
		assert!(index.get(&query(&["c", "d"])).is_none());
	}

	#[test]
	fn short_sentences_are_skipped() {
		let mut index = TextIndex::new(3);
		index.add_sentence(&["too", "short", "!"]);
		index.add_sentence::<&str>(&[]);
		assert!(index.is_empty());
	}

	#[test]
	fn windows_do_not_cross_sentences() {
		let index = TextIndex::from_text(1, false, &RuleTokenizer, "The end. Then more.");

		assert!(index.get(&query(&["end"])).is_none());
		assert_eq!(index.get(&query(&["the"])).map(|s| s.best()), Some(vec!["end".to_owned()]));
	}

	#[test]
	fn build_validates_query_count() {
		let index = TextIndex::build(2, false, &RuleTokenizer, "Python is slow!").unwrap();
		assert_eq!(index.get(&query(&["python", "is"])).map(|s| s.best()), Some(vec!["slow".to_owned()]));

		assert_eq!(
			TextIndex::build(0, false, &RuleTokenizer, "Python is slow!"),
			Err(crate::IndexError::InvalidConfiguration { query_count: 0 })
		);
	}

	#[test]
	fn windows_do_not_cross_paragraphs_when_split() {
		let text = "Chapter one\n\nChapter two\n\nIndex";

		let joined = TextIndex::from_text(1, false, &RuleTokenizer, text);
		assert_eq!(joined.get(&query(&["one"])).map(|s| s.best()), Some(vec!["chapter".to_owned()]));

		let split = TextIndex::from_text(1, true, &RuleTokenizer, text);
		assert!(split.get(&query(&["one"])).is_none());
		assert!(split.get(&query(&["two"])).is_none());
		assert_eq!(split.get(&query(&["chapter"])).map(|s| s.total()), Some(2));
	}
}
