use crate::error::{ModelError, Result};

/// Default highest n-gram order.
pub const DEFAULT_MAX_GRAMS: usize = 5;

/// Default number of characters kept in the fallback unigram list.
pub const DEFAULT_UNIGRAM_FALLBACK_SIZE: usize = 10;

/// Default number of characters predicted per context by batch prediction.
pub const DEFAULT_TOP_K: usize = 3;

/// Parameters of an `NGramModel`.
///
/// Passed once at construction and honored for the model's whole life.
/// A loaded model takes `max_grams` from the persisted record.
///
/// # Invariants
/// - `max_grams >= 1`
/// - `default_top_k >= 1`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelConfig {
	/// Highest n-gram order (context length is `max_grams - 1`).
	max_grams: usize,

	/// Size of the top-unigrams list used when backoff runs dry.
	unigram_fallback_size: usize,

	/// `top_k` used by `run_pred`. Single predictions take `top_k` per call.
	default_top_k: usize,
}

impl Default for ModelConfig {
	fn default() -> Self {
		Self {
			max_grams: DEFAULT_MAX_GRAMS,
			unigram_fallback_size: DEFAULT_UNIGRAM_FALLBACK_SIZE,
			default_top_k: DEFAULT_TOP_K,
		}
	}
}

impl ModelConfig {
	/// Creates a validated configuration.
	///
	/// # Errors
	/// Returns an error if `max_grams` or `default_top_k` is zero.
	pub fn new(max_grams: usize, unigram_fallback_size: usize, default_top_k: usize) -> Result<Self> {
		let mut config = Self::default();
		config.set_max_grams(max_grams)?;
		config.set_default_top_k(default_top_k)?;
		config.unigram_fallback_size = unigram_fallback_size;
		Ok(config)
	}

	/// Returns the highest n-gram order.
	pub fn max_grams(&self) -> usize {
		self.max_grams
	}

	/// Returns the fallback unigram list size.
	pub fn unigram_fallback_size(&self) -> usize {
		self.unigram_fallback_size
	}

	/// Returns the `top_k` used for batch prediction.
	pub fn default_top_k(&self) -> usize {
		self.default_top_k
	}

	/// Sets the highest n-gram order.
	///
	/// # Errors
	/// Returns an error if `max_grams` is zero.
	pub fn set_max_grams(&mut self, max_grams: usize) -> Result<()> {
		if max_grams == 0 {
			return Err(ModelError::invalid_config("max_grams must be >= 1"));
		}
		self.max_grams = max_grams;
		Ok(())
	}

	/// Sets the fallback unigram list size. Zero disables the fallback.
	pub fn set_unigram_fallback_size(&mut self, size: usize) {
		self.unigram_fallback_size = size;
	}

	/// Sets the `top_k` used for batch prediction.
	///
	/// # Errors
	/// Returns an error if `default_top_k` is zero.
	pub fn set_default_top_k(&mut self, default_top_k: usize) -> Result<()> {
		if default_top_k == 0 {
			return Err(ModelError::invalid_config("top_k must be >= 1"));
		}
		self.default_top_k = default_top_k;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default() {
		let config = ModelConfig::default();
		assert_eq!(config.max_grams(), DEFAULT_MAX_GRAMS);
		assert_eq!(config.unigram_fallback_size(), DEFAULT_UNIGRAM_FALLBACK_SIZE);
		assert_eq!(config.default_top_k(), DEFAULT_TOP_K);
	}

	#[test]
	fn test_new_rejects_zero() {
		assert!(matches!(ModelConfig::new(0, 10, 3), Err(ModelError::InvalidConfig { .. })));
		assert!(matches!(ModelConfig::new(3, 10, 0), Err(ModelError::InvalidConfig { .. })));
		assert!(ModelConfig::new(1, 0, 1).is_ok());
	}

	#[test]
	fn test_setters_keep_value_on_error() {
		let mut config = ModelConfig::new(4, 5, 2).unwrap();
		assert!(config.set_max_grams(0).is_err());
		assert_eq!(config.max_grams(), 4);
		assert!(config.set_default_top_k(0).is_err());
		assert_eq!(config.default_top_k(), 2);
		config.set_unigram_fallback_size(0);
		assert_eq!(config.unigram_fallback_size(), 0);
	}
}
