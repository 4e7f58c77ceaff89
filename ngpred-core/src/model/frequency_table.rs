use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

/// Counts of the characters observed after one context.
///
/// Conceptually, this is a node of the n-gram table whose outgoing edges
/// are weighted by their number of observations.
///
/// # Invariants
/// - Each stored count is strictly positive
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct Distribution {
	/// Example: { 'e' => 42, 'a' => 3 }
	counts: HashMap<char, usize>,
}

impl Distribution {
	/// Records one more occurrence of `next_char`.
	pub fn add(&mut self, next_char: char) {
		*self.counts.entry(next_char).or_insert(0) += 1;
	}

	/// Number of times `c` followed the context (0 when never seen).
	pub fn count(&self, c: char) -> usize {
		self.counts.get(&c).copied().unwrap_or(0)
	}

	/// Sum of all counts.
	pub fn total(&self) -> usize {
		self.counts.values().sum()
	}

	pub fn is_empty(&self) -> bool {
		self.counts.is_empty()
	}

	/// Iterates over `(character, count)` pairs in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
		self.counts.iter().map(|(c, n)| (*c, *n))
	}

	/// Ranks every vocabulary character by its smoothed score, highest first.
	///
	/// `score(c) = (count(c) + 1) / (total / |vocab|)`
	///
	/// Add-one count over the average per-character count. This is a
	/// ranking heuristic, not a probability: scores do not sum to 1.
	/// Equal scores keep vocabulary order.
	pub fn ranked(&self, vocab: &BTreeSet<char>) -> Vec<(char, f64)> {
		if vocab.is_empty() {
			return Vec::new();
		}
		let average = self.total() as f64 / vocab.len() as f64;

		let mut scored: Vec<(char, f64)> = vocab
			.iter()
			.map(|&c| (c, (self.count(c) + 1) as f64 / average))
			.collect();

		// Stable: ties stay in vocabulary order
		scored.sort_by(|a, b| b.1.total_cmp(&a.1));
		scored
	}
}

/// Frequency table of one n-gram order.
///
/// Maps every observed context of length `n - 1` to the distribution of
/// the characters that followed it.
///
/// # Invariants
/// - Every context key has exactly `n - 1` characters
/// - Only observed contexts are stored
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable {
	/// Order of the table (number of characters in the n-gram)
	n: usize,

	contexts: HashMap<String, Distribution>,
}

impl FrequencyTable {
	/// Creates an empty table of order `n`.
	pub fn new(n: usize) -> Self {
		Self { n, contexts: HashMap::new() }
	}

	/// Rebuilds a table from decoded contexts, checking key lengths.
	pub(crate) fn from_contexts(n: usize, contexts: HashMap<String, Distribution>) -> Result<Self, String> {
		let context_len = n.saturating_sub(1);
		if let Some(key) = contexts.keys().find(|key| key.chars().count() != context_len) {
			return Err(format!("context {key:?} in order {n} is not {context_len} characters long"));
		}
		Ok(Self { n, contexts })
	}

	pub fn order(&self) -> usize {
		self.n
	}

	/// Records that `next_char` followed `context`.
	pub fn add_observation(&mut self, context: &str, next_char: char) {
		match self.contexts.get_mut(context) {
			Some(distribution) => distribution.add(next_char),
			None => {
				let mut distribution = Distribution::default();
				distribution.add(next_char);
				self.contexts.insert(context.to_owned(), distribution);
			}
		}
	}

	/// Returns the distribution observed after `context`.
	///
	/// An unknown context yields `None`, which callers treat as an empty
	/// candidate set.
	pub fn distribution(&self, context: &str) -> Option<&Distribution> {
		self.contexts.get(context)
	}

	/// Number of distinct contexts.
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	/// Iterates over context keys.
	pub fn contexts(&self) -> impl Iterator<Item = &str> {
		self.contexts.keys().map(String::as_str)
	}

	pub(crate) fn as_map(&self) -> &HashMap<String, Distribution> {
		&self.contexts
	}
}
