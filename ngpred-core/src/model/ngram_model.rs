use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::thread;

use serde::Serialize;

use super::config::ModelConfig;
use super::frequency_table::FrequencyTable;
use crate::error::Result;
use crate::normalize::{BasicNormalizer, Normalizer};

/// Backoff character n-gram model.
///
/// Holds one frequency table per order `1..=max_grams`, the training
/// vocabulary and a frequency-ranked unigram list used as a last resort.
///
/// # Responsibilities
/// - Build every frequency table from a flat normalized text
/// - Rank next characters from the longest known context down to the
///   empty one, with add-one smoothing at each level
/// - Fill short results from the top unigrams
/// - Save and load its learned state (see `persistence`)
///
/// # Invariants
/// - After training, every order `1..=max_grams` has a table (maybe empty)
/// - Table `n` only holds contexts of exactly `n - 1` characters
/// - `vocab` is fixed by the last training pass
#[derive(Clone, Debug)]
pub struct NGramModel<N = BasicNormalizer> {
	pub(crate) config: ModelConfig,

	/// Mapping from order `n` to its frequency table
	pub(crate) models: BTreeMap<usize, FrequencyTable>,

	/// Characters ranked by raw frequency, truncated to the fallback size
	pub(crate) top_unigrams: Vec<char>,

	/// Every distinct character seen in training.
	/// Ordered so ranking ties resolve the same way after a reload.
	pub(crate) vocab: BTreeSet<char>,

	pub(crate) normalizer: N,
}

/// Read-only overview of a model, for reporting.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ModelSummary {
	pub max_n: usize,
	pub vocab_size: usize,
	/// Number of distinct contexts per order
	pub contexts: BTreeMap<usize, usize>,
	pub top_unigrams: String,
}

impl NGramModel<BasicNormalizer> {
	/// Creates an untrained model using the default normalizer.
	pub fn new(config: ModelConfig) -> Self {
		Self::with_normalizer(config, BasicNormalizer)
	}
}

impl Default for NGramModel<BasicNormalizer> {
	fn default() -> Self {
		Self::new(ModelConfig::default())
	}
}

impl<N: Normalizer> NGramModel<N> {
	/// Creates an untrained model applying `normalizer` to every context.
	pub fn with_normalizer(config: ModelConfig, normalizer: N) -> Self {
		Self {
			config,
			models: BTreeMap::new(),
			top_unigrams: Vec::new(),
			vocab: BTreeSet::new(),
			normalizer,
		}
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	/// Highest n-gram order.
	pub fn max_grams(&self) -> usize {
		self.config.max_grams()
	}

	/// Returns the table of order `n`, if trained.
	pub fn table(&self, n: usize) -> Option<&FrequencyTable> {
		self.models.get(&n)
	}

	pub fn vocab(&self) -> &BTreeSet<char> {
		&self.vocab
	}

	pub fn top_unigrams(&self) -> &[char] {
		&self.top_unigrams
	}

	pub fn normalizer(&self) -> &N {
		&self.normalizer
	}

	/// Changes the `top_k` used by `run_pred`, e.g. after a load.
	///
	/// # Errors
	/// Returns an error if `top_k` is zero.
	pub fn set_default_top_k(&mut self, top_k: usize) -> Result<()> {
		self.config.set_default_top_k(top_k)
	}

	/// Trains the model on a flat, already normalized text.
	///
	/// For each order `n` a window slides over `data`: at position `i` the
	/// context is `data[i..i + n - 1]` (empty for `n = 1`) and the observed
	/// character is `data[i + n - 1]`, for `i < len - n`. The window never
	/// wraps around.
	///
	/// Example for `max_grams = 3` on `"hello "`:
	/// - order 1: `"" -> h, e, l, l, o`
	/// - order 2: `"h" -> e`, `"e" -> l`, `"l" -> l`, `"l" -> o`
	/// - order 3: `"he" -> l`, `"el" -> l`, `"ll" -> o`
	///
	/// Replaces any previous state.
	pub fn train(&mut self, data: &str) {
		let chars: Vec<char> = data.chars().collect();

		let mut models = BTreeMap::new();
		for n in 1..=self.config.max_grams() {
			let mut table = FrequencyTable::new(n);
			for i in 0..chars.len().saturating_sub(n) {
				let context: String = chars[i..i + n - 1].iter().collect();
				table.add_observation(&context, chars[i + n - 1]);
			}
			log::debug!("Order {}: {} contexts", n, table.len());
			models.insert(n, table);
		}

		self.models = models;
		self.vocab = chars.iter().copied().collect();
		self.top_unigrams = Self::rank_unigrams(&chars, self.config.unigram_fallback_size());

		log::info!(
			"Trained {}-gram model on {} characters, vocabulary of {}",
			self.config.max_grams(),
			chars.len(),
			self.vocab.len()
		);
		log::info!("Top unigrams: {:?}", self.top_unigrams);
	}

	/// Ranks characters by raw frequency, ties by first occurrence.
	fn rank_unigrams(chars: &[char], size: usize) -> Vec<char> {
		let mut index: HashMap<char, usize> = HashMap::new();
		let mut counts: Vec<(char, usize)> = Vec::new();
		for &c in chars {
			match index.get(&c) {
				Some(&i) => counts[i].1 += 1,
				None => {
					index.insert(c, counts.len());
					counts.push((c, 1));
				}
			}
		}

		// Stable: first occurrence wins ties
		counts.sort_by(|a, b| b.1.cmp(&a.1));
		counts.into_iter().take(size).map(|(c, _)| c).collect()
	}

	/// Returns the last `n` characters of `context`, or all of it when shorter.
	fn trailing(context: &[char], n: usize) -> String {
		context[context.len().saturating_sub(n)..].iter().collect()
	}

	/// Predicts up to `top_k` distinct next characters, most likely first.
	///
	/// The raw context is normalized, then each order is consulted from
	/// `max_grams` down to 1 using the last `n - 1` context characters.
	/// A level with no data is skipped. Otherwise every vocabulary character
	/// is ranked by its smoothed score and appended unless already chosen
	/// at a higher order. Once the levels are exhausted the top unigrams
	/// fill the remaining slots.
	///
	/// # Notes
	/// - `top_k == 0` yields an empty string.
	/// - The result may be shorter than `top_k` (small vocabulary, untrained
	///   model), never longer, and never repeats a character.
	pub fn predict_next_chars(&self, context: &str, top_k: usize) -> String {
		if top_k == 0 {
			return String::new();
		}

		let context: Vec<char> = self.normalizer.normalize(context).chars().collect();
		let mut candidates = String::new();
		let mut seen: HashSet<char> = HashSet::with_capacity(top_k);

		for n in (1..=self.config.max_grams()).rev() {
			let ctx = if n > 1 { Self::trailing(&context, n - 1) } else { String::new() };
			let distribution = match self.models.get(&n).and_then(|table| table.distribution(&ctx)) {
				Some(distribution) if !distribution.is_empty() => distribution,
				_ => continue,
			};

			for (c, _) in distribution.ranked(&self.vocab) {
				if seen.insert(c) {
					candidates.push(c);
					if seen.len() >= top_k {
						return candidates;
					}
				}
			}
		}

		// Backoff ran dry before reaching top_k
		for &c in &self.top_unigrams {
			if seen.len() >= top_k {
				break;
			}
			if seen.insert(c) {
				candidates.push(c);
			}
		}

		candidates
	}

	/// Predicts every context independently, `default_top_k` characters each.
	///
	/// Lines are split into one chunk per CPU and predicted on scoped
	/// threads. The output keeps the input order.
	pub fn run_pred(&self, contexts: &[String]) -> Vec<String>
	where
		N: Sync,
	{
		if contexts.is_empty() {
			return Vec::new();
		}
		let top_k = self.config.default_top_k();
		let chunks = num_cpus::get().max(1);
		let chunk_size = contexts.len().div_ceil(chunks);

		thread::scope(|scope| {
			let handles: Vec<_> = contexts
				.chunks(chunk_size)
				.map(|chunk| {
					scope.spawn(move || {
						chunk
							.iter()
							.map(|context| {
								let prediction = self.predict_next_chars(context, top_k);
								log::debug!("Context: {:?} Predicted: {:?}", context, prediction);
								prediction
							})
							.collect::<Vec<_>>()
					})
				})
				.collect();

			handles
				.into_iter()
				.flat_map(|handle| match handle.join() {
					Ok(predictions) => predictions,
					Err(panic) => std::panic::resume_unwind(panic),
				})
				.collect()
		})
	}

	/// Returns a summary of the learned state.
	pub fn summary(&self) -> ModelSummary {
		ModelSummary {
			max_n: self.config.max_grams(),
			vocab_size: self.vocab.len(),
			contexts: self.models.iter().map(|(n, table)| (*n, table.len())).collect(),
			top_unigrams: self.top_unigrams.iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::normalize::IdentityNormalizer;

	fn trained(data: &str, max_grams: usize, default_top_k: usize) -> NGramModel<IdentityNormalizer> {
		let config = ModelConfig::new(max_grams, 10, default_top_k).unwrap();
		let mut model = NGramModel::with_normalizer(config, IdentityNormalizer);
		model.train(data);
		model
	}

	#[test]
	fn test_train_hello() {
		let model = trained("hello ", 3, 3);

		let unigrams = model.table(1).unwrap();
		let root = unigrams.distribution("").unwrap();
		assert_eq!(root.count('l'), 2);
		assert_eq!(root.count('h'), 1);
		// Last character is never observed as a next char
		assert_eq!(root.count(' '), 0);
		assert_eq!(root.total(), 5);

		let bigrams = model.table(2).unwrap();
		assert_eq!(bigrams.distribution("l").unwrap().count('l'), 1);
		assert_eq!(bigrams.distribution("l").unwrap().count('o'), 1);
		assert!(bigrams.distribution("o").is_none());

		let trigrams = model.table(3).unwrap();
		assert_eq!(trigrams.len(), 3);
		assert_eq!(trigrams.distribution("he").unwrap().count('l'), 1);
		assert_eq!(trigrams.distribution("ll").unwrap().count('o'), 1);

		assert_eq!(model.vocab().len(), 5);
		assert_eq!(model.top_unigrams()[0], 'l');
	}

	#[test]
	fn test_every_order_present() {
		let model = trained("ab", 4, 3);
		for n in 1..=4 {
			assert!(model.table(n).is_some());
		}
		assert!(model.table(1).unwrap().distribution("").is_some());
		assert!(model.table(2).unwrap().is_empty());
		assert!(model.table(5).is_none());
	}

	#[test]
	fn test_predict_exact_trigram() {
		let model = trained("hello ", 3, 3);
		assert_eq!(model.predict_next_chars("hel", 1), "l");
	}

	#[test]
	fn test_predict_backoff_order() {
		let model = trained("hello ", 3, 5);
		let prediction = model.predict_next_chars("hel", 5);
		assert_eq!(prediction.chars().count(), 5);
		assert!(prediction.starts_with('l'));
	}

	#[test]
	fn test_predict_unknown_context_uses_lower_orders() {
		let model = trained("abcabcabd", 3, 2);
		// "zz" and "z" unseen, order 1 ranks by raw count
		let prediction = model.predict_next_chars("zz", 2);
		assert_eq!(prediction.chars().count(), 2);
		assert!(prediction.contains('a') || prediction.contains('b'));
	}

	#[test]
	fn test_untrained_model_predicts_nothing() {
		let model = NGramModel::new(ModelConfig::default());
		assert_eq!(model.predict_next_chars("anything", 3), "");
	}

	#[test]
	fn test_empty_training_data() {
		let model = trained("", 3, 3);
		assert!(model.vocab().is_empty());
		assert!(model.top_unigrams().is_empty());
		assert_eq!(model.predict_next_chars("abc", 3), "");
		assert_eq!(model.predict_next_chars("", 3), "");
	}

	#[test]
	fn test_unigram_fallback() {
		let mut model = trained("aab", 2, 3);
		// Tables only know "" and "a"; remove them to force the fallback
		model.models.clear();
		assert_eq!(model.predict_next_chars("q", 3), "ab");
	}

	#[test]
	fn test_top_k_is_per_call() {
		// Default top_k only drives run_pred; single calls honor their own
		let model = trained("the quick brown fox jumps", 3, 2);
		assert_eq!(model.predict_next_chars("th", 10).chars().count(), 10);
		assert_eq!(model.predict_next_chars("th", 1).chars().count(), 1);
		assert_eq!(model.predict_next_chars("th", 0), "");
		assert_eq!(model.run_pred(&["th".to_owned()])[0].chars().count(), 2);
	}

	#[test]
	fn test_single_character_text_uses_unigram_fallback() {
		// Every window is empty, only the unigram list knows 'a'
		let model = trained("a", 3, 3);
		for n in 1..=3 {
			assert!(model.table(n).unwrap().is_empty());
		}
		assert_eq!(model.top_unigrams(), &['a']);
		assert_eq!(model.predict_next_chars("zz", 3), "a");
	}

	#[test]
	fn test_top_k_larger_than_vocab() {
		let model = trained("abab", 2, 50);
		let prediction = model.predict_next_chars("a", 50);
		assert!(prediction.chars().count() <= model.vocab().len());
	}

	#[test]
	fn test_context_is_normalized() {
		let config = ModelConfig::new(3, 10, 1).unwrap();
		let mut model = NGramModel::new(config);
		model.train("hello ");
		assert_eq!(model.predict_next_chars("HEL", 1), "l");
	}

	#[test]
	fn test_train_replaces_state() {
		let mut model = trained("aaaa", 2, 3);
		model.train("bbbb");
		assert!(!model.vocab().contains(&'a'));
		assert_eq!(model.predict_next_chars("b", 1), "b");
	}

	#[test]
	fn test_rank_unigrams_ties_first_seen() {
		let ranked = NGramModel::<IdentityNormalizer>::rank_unigrams(&['c', 'a', 'b', 'a', 'b'], 3);
		assert_eq!(ranked, vec!['a', 'b', 'c']);
		let ranked = NGramModel::<IdentityNormalizer>::rank_unigrams(&['c', 'a', 'b', 'a', 'b'], 1);
		assert_eq!(ranked, vec!['a']);
	}

	#[test]
	fn test_trailing() {
		let context: Vec<char> = "hello".chars().collect();
		assert_eq!(NGramModel::<IdentityNormalizer>::trailing(&context, 2), "lo");
		assert_eq!(NGramModel::<IdentityNormalizer>::trailing(&context, 9), "hello");
		assert_eq!(NGramModel::<IdentityNormalizer>::trailing(&context, 0), "");
	}

	#[test]
	fn test_run_pred_keeps_order() {
		let model = trained("hello hello help ", 3, 1);
		let contexts: Vec<String> = ["hel", "he", "hell", "", "xyz"].iter().map(|s| s.to_string()).collect();
		let predictions = model.run_pred(&contexts);
		assert_eq!(predictions.len(), contexts.len());
		for (context, prediction) in contexts.iter().zip(&predictions) {
			assert_eq!(prediction, &model.predict_next_chars(context, 1));
		}
		assert!(model.run_pred(&[]).is_empty());
	}

	#[test]
	fn test_summary() {
		let model = trained("hello ", 3, 3);
		let summary = model.summary();
		assert_eq!(summary.max_n, 3);
		assert_eq!(summary.vocab_size, 5);
		assert_eq!(summary.contexts.get(&3), Some(&3));
		assert!(summary.top_unigrams.starts_with('l'));
	}
}
