use std::sync::LazyLock;

use regex::Regex;

/// Tokens dropped from every sentence after word splitting.
///
/// Only exact matches are removed: `"--"` or `"("` are kept as tokens.
pub const PUNCTUATION: [&str; 10] = [".", "!", "?", ",", ";", ":", "...", "`", "'", "\""];

/// Paragraph boundary: two or more consecutive newlines.
///
/// Texts may contain tables of contents or indexes that a sentence
/// splitter would glue into one long sentence.
static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid paragraph regex"));

/// Word candidates: ellipsis, dash runs, words (with inner apostrophes,
/// hyphens and periods), or any other single non-space character.
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\.\.\.|--+|[\p{L}\p{N}_]+(?:['’.\-][\p{L}\p{N}_]+)*|\S").expect("valid word regex")
});

/// Lowercase abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: [&str; 28] = [
	"mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "rev", "gen", "col", "capt", "lt", "sgt", "gov", "vs", "etc",
	"cf", "vol", "fig", "ch", "approx", "dept", "est", "inc", "ltd", "co",
];

/// Clitics split off the end of a word, Treebank style (`"it's"` → `"it" "'s"`).
const CLITICS: [&str; 6] = ["'s", "'m", "'d", "'ll", "'re", "'ve"];

/// Returns `true` if `token` is one of the filtered [`PUNCTUATION`] tokens.
pub fn is_punctuation(token: &str) -> bool {
	PUNCTUATION.contains(&token)
}

/// Splits a text into paragraphs on blank-line boundaries.
///
/// Never fails; an empty text yields a single empty paragraph.
pub fn segment_paragraphs(text: &str) -> Vec<&str> {
	PARAGRAPH_RE.split(text).collect()
}

/// Splits sentences into normalized word tokens.
///
/// Implementors only provide the segmentation primitives. The normalization
/// contract (lowercase, punctuation filtering) lives in the provided
/// [`Tokenizer::tokenize_words`] so every implementation honours it.
pub trait Tokenizer {
	/// Splits a paragraph into sentences.
	///
	/// Must be deterministic. Returned sentences should not be empty.
	fn segment_sentences<'a>(&self, paragraph: &'a str) -> Vec<&'a str>;

	/// Splits an (already lowercased) sentence into raw tokens, punctuation included.
	fn split_words(&self, sentence: &str) -> Vec<String>;

	/// Lowercases a sentence, splits it into words and drops [`PUNCTUATION`] tokens.
	///
	/// Tokens are not stemmed or normalized beyond lowercasing.
	fn tokenize_words(&self, sentence: &str) -> Vec<String> {
		self.split_words(&sentence.to_lowercase())
			.into_iter()
			.filter(|token| !is_punctuation(token))
			.collect()
	}
}

/// Rule-based tokenizer, needs no external model.
///
/// # Sentences
/// A sentence ends at a run of `.`, `!` or `?` (optionally followed by closing
/// quotes or brackets) that is followed by whitespace or the end of the text,
/// except:
/// - a single period after a known abbreviation (`mr.`, `etc.`), an initial
///   (`j.`) or a dotted acronym (`u.s.`)
/// - an ellipsis followed by a lowercase word
///
/// # Words
/// Words keep inner apostrophes, hyphens and periods (`o'clock`, `well-known`,
/// `e.g`). The negation `n't` and the clitics `'s 'm 'd 'll 're 've` are split
/// off into their own tokens. Any other non-space character is a token of its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleTokenizer;

impl RuleTokenizer {
	pub fn new() -> Self {
		Self
	}

	/// Decides whether the terminator run `paragraph[run_start..run_end]`
	/// closes a sentence, given the text that follows it.
	fn is_boundary(paragraph: &str, run_start: usize, run_end: usize) -> bool {
		let run = &paragraph[run_start..run_end];
		let rest = paragraph[run_end..].trim_start();

		if run.starts_with("...") {
			// Ellipsis inside a sentence: "wait... what"
			return rest.chars().next().is_none_or(|c| !c.is_lowercase());
		}
		if run != "." {
			return true;
		}

		let word = paragraph[..run_start]
			.rsplit(char::is_whitespace)
			.next()
			.unwrap_or("")
			.trim_start_matches(|c: char| !c.is_alphanumeric());
		!Self::is_abbreviation(word)
	}

	/// `word` is the token right before a period, without the period.
	fn is_abbreviation(word: &str) -> bool {
		if word.is_empty() {
			return false;
		}
		let lower = word.to_lowercase();
		if ABBREVIATIONS.contains(&lower.as_str()) {
			return true;
		}
		// Initials ("J. R. R.") and dotted acronyms ("U.S", "e.g").
		// The words "I" and "a" are not initials.
		let mut chars = word.chars();
		let single_letter = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic() && c != 'I' && c != 'a');
		single_letter || (word.contains('.') && word.split('.').all(|part| part.chars().count() == 1))
	}

	/// Splits the trailing `n't` or clitic off a word token.
	fn split_clitic(token: &str) -> Vec<String> {
		if token.len() > 3 && token.ends_with("n't") {
			let stem = &token[..token.len() - 3];
			return vec![stem.to_owned(), "n't".to_owned()];
		}
		for clitic in CLITICS {
			if token.len() > clitic.len() && token.ends_with(clitic) {
				let stem = &token[..token.len() - clitic.len()];
				return vec![stem.to_owned(), clitic.to_owned()];
			}
		}
		vec![token.to_owned()]
	}
}

impl Tokenizer for RuleTokenizer {
	fn segment_sentences<'a>(&self, paragraph: &'a str) -> Vec<&'a str> {
		let mut sentences = Vec::new();
		let mut start = 0;
		let mut chars = paragraph.char_indices().peekable();

		while let Some((i, c)) = chars.next() {
			if !matches!(c, '.' | '!' | '?') {
				continue;
			}

			// Consume the whole terminator run, then closing quotes and brackets
			let mut run_end = i + c.len_utf8();
			while let Some(&(j, next)) = chars.peek() {
				if !matches!(next, '.' | '!' | '?') {
					break;
				}
				run_end = j + next.len_utf8();
				chars.next();
			}
			let mut end = run_end;
			while let Some(&(j, next)) = chars.peek() {
				if !matches!(next, '"' | '\'' | ')' | ']' | '’' | '”' | '»') {
					break;
				}
				end = j + next.len_utf8();
				chars.next();
			}

			let followed_by_space = chars.peek().is_none_or(|&(_, next)| next.is_whitespace());
			if followed_by_space && Self::is_boundary(paragraph, i, run_end) {
				let sentence = paragraph[start..end].trim();
				if !sentence.is_empty() {
					sentences.push(sentence);
				}
				start = end;
			}
		}

		let tail = paragraph[start..].trim();
		if !tail.is_empty() {
			sentences.push(tail);
		}
		sentences
	}

	fn split_words(&self, sentence: &str) -> Vec<String> {
		WORD_RE
			.find_iter(sentence)
			.flat_map(|m| Self::split_clitic(m.as_str()))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn paragraphs_split_on_blank_lines() {
		assert_eq!(segment_paragraphs("one\ntwo\n\nthree\n\n\n\nfour"), vec!["one\ntwo", "three", "four"]);
		assert_eq!(segment_paragraphs(""), vec![""]);
	}

	#[test]
	fn sentences_split_on_terminators() {
		let tokenizer = RuleTokenizer::new();
		assert_eq!(
			tokenizer.segment_sentences("Python is great! Python is funny? Python is great."),
			vec!["Python is great!", "Python is funny?", "Python is great."]
		);
		assert_eq!(tokenizer.segment_sentences("start one. start two."), vec!["start one.", "start two."]);
	}

	#[test]
	fn sentences_keep_abbreviations_and_numbers() {
		let tokenizer = RuleTokenizer::new();
		assert_eq!(
			tokenizer.segment_sentences("Mr. Smith paid 3.50 dollars to J. Doe in the U.S. yesterday. He left."),
			vec!["Mr. Smith paid 3.50 dollars to J. Doe in the U.S. yesterday.", "He left."]
		);
	}

	#[test]
	fn sentences_end_after_pronoun_i_and_article_a() {
		let tokenizer = RuleTokenizer::new();
		assert_eq!(tokenizer.segment_sentences("So do I. Python is slow."), vec!["So do I.", "Python is slow."]);
		assert_eq!(
			tokenizer.segment_sentences("Python is what I use and so do I. Python is slow."),
			vec!["Python is what I use and so do I.", "Python is slow."]
		);
		assert_eq!(tokenizer.segment_sentences("Grade a. Then b."), vec!["Grade a.", "Then b."]);
		assert_eq!(tokenizer.segment_sentences("Ask J. Doe."), vec!["Ask J. Doe."]);
	}

	#[test]
	fn sentences_include_closing_quotes() {
		let tokenizer = RuleTokenizer::new();
		assert_eq!(
			tokenizer.segment_sentences("\"Stop!\" she said. Wait... what? Nothing..."),
			vec!["\"Stop!\"", "she said.", "Wait... what?", "Nothing..."]
		);
	}

	#[test]
	fn empty_paragraph_has_no_sentences() {
		let tokenizer = RuleTokenizer::new();
		assert!(tokenizer.segment_sentences("").is_empty());
		assert!(tokenizer.segment_sentences(" \n\t ").is_empty());
	}

	#[test]
	fn words_are_lowercased_and_filtered() {
		let tokenizer = RuleTokenizer::new();
		assert_eq!(
			tokenizer.tokenize_words("\"Python\", is: GREAT... `really'?"),
			vec!["python", "is", "great", "really"]
		);
	}

	#[test]
	fn words_split_clitics() {
		let tokenizer = RuleTokenizer::new();
		assert_eq!(
			tokenizer.tokenize_words("It's a well-known fact we don't know o'clock"),
			vec!["it", "'s", "a", "well-known", "fact", "we", "do", "n't", "know", "o'clock"]
		);
	}

	#[test]
	fn other_symbols_are_kept() {
		let tokenizer = RuleTokenizer::new();
		assert_eq!(tokenizer.tokenize_words("so -- (maybe)"), vec!["so", "--", "(", "maybe", ")"]);
	}
}
