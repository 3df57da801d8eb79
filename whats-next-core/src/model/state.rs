use std::collections::HashMap;

/// Next-word frequency table of one query.
///
/// A `State` stores every word observed right after a query, with the number
/// of times it was observed. Conceptually, this is a node in a Markov chain
/// where outgoing edges are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during indexing
/// - Merge with the table of the same query from another text
/// - Rank next words by occurrence count
///
/// ## Invariants
/// - Each transition occurrence count is strictly positive
/// - Counts only grow
/// - Transitions are kept in the order their word was first observed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	/// Outgoing transitions in first-observation order.
	/// Example: [("great", 2), ("funny", 1)]
	transitions: Vec<(String, usize)>,
	/// Position of each word in `transitions`.
	positions: HashMap<String, usize>,
}

impl State {
	/// Creates a new empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records one occurrence of `next_word`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next_word: &str) {
		self.add_occurrences(next_word, 1);
	}

	/// Adds `occurrences` observations of `next_word`. Zero is ignored.
	fn add_occurrences(&mut self, next_word: &str, occurrences: usize) {
		if occurrences == 0 {
			return;
		}
		match self.positions.get(next_word) {
			Some(&position) => self.transitions[position].1 += occurrences,
			None => {
				self.positions.insert(next_word.to_owned(), self.transitions.len());
				self.transitions.push((next_word.to_owned(), occurrences));
			}
		}
	}

	/// Merges another state into this one.
	///
	/// Occurrence counts are summed per word. Words unknown to `self` are
	/// appended in the order `other` first observed them.
	pub fn merge(&mut self, other: &Self) {
		for (next_word, occurrences) in &other.transitions {
			self.add_occurrences(next_word, *occurrences);
		}
	}

	/// Returns the occurrence count of `next_word`, 0 if never observed.
	pub fn count(&self, next_word: &str) -> usize {
		self.positions
			.get(next_word)
			.map_or(0, |&position| self.transitions[position].1)
	}

	/// Returns the total number of observed transitions.
	pub fn total(&self) -> usize {
		self.transitions.iter().map(|(_, occurrences)| occurrences).sum()
	}

	/// Iterates over `(word, count)` pairs in first-observation order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
		self.transitions.iter().map(|(word, occurrences)| (word.as_str(), *occurrences))
	}

	/// Number of distinct next words.
	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Returns every word sharing the highest occurrence count.
	///
	/// Ties are not broken: all of them are returned, in first-observation
	/// order. Empty if the state has no transitions.
	pub fn best(&self) -> Vec<String> {
		let Some(highest) = self.transitions.iter().map(|(_, occurrences)| *occurrences).max() else {
			return Vec::new();
		};
		self.transitions
			.iter()
			.filter(|(_, occurrences)| *occurrences == highest)
			.map(|(word, _)| word.clone())
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transitions_are_counted() {
		let mut state = State::new();
		state.add_transition("great");
		state.add_transition("funny");
		state.add_transition("great");

		assert_eq!(state.count("great"), 2);
		assert_eq!(state.count("funny"), 1);
		assert_eq!(state.count("slow"), 0);
		assert_eq!(state.total(), 3);
		assert_eq!(state.len(), 2);
	}

	#[test]
	fn merge_sums_and_keeps_first_observation_order() {
		let mut left = State::new();
		left.add_transition("slow");

		let mut right = State::new();
		right.add_transition("great");
		right.add_transition("slow");
		right.add_transition("great");

		left.merge(&right);
		assert_eq!(left.iter().collect::<Vec<_>>(), vec![("slow", 2), ("great", 2)]);
	}

	#[test]
	fn best_returns_all_ties_in_order() {
		let mut state = State::new();
		state.add_transition("one");
		state.add_transition("two");
		assert_eq!(state.best(), vec!["one", "two"]);

		state.add_transition("two");
		assert_eq!(state.best(), vec!["two"]);
	}

	#[test]
	fn empty_state_has_no_best() {
		assert!(State::new().best().is_empty());
		assert!(State::new().is_empty());
	}
}
