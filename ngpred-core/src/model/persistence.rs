use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::config::ModelConfig;
use super::frequency_table::{Distribution, FrequencyTable};
use super::ngram_model::NGramModel;
use crate::error::{ModelError, Result};
use crate::io::model_path;
use crate::normalize::{BasicNormalizer, Normalizer};

/// Persisted layout, borrowed from a live model for encoding.
///
/// Field order and types must stay in sync with `ModelRecord`: postcard
/// is not self-describing.
#[derive(Serialize)]
struct ModelRecordRef<'a> {
	max_n: usize,
	models: BTreeMap<usize, &'a HashMap<String, Distribution>>,
	top_unigrams: &'a [char],
	vocab: Vec<char>,
}

/// Persisted layout, decoded.
#[derive(Deserialize)]
struct ModelRecord {
	max_n: usize,
	models: BTreeMap<usize, HashMap<String, Distribution>>,
	top_unigrams: Vec<char>,
	vocab: Vec<char>,
}

impl ModelRecord {
	/// Checks every model invariant before the record is used.
	fn validate(&self) -> Result<()> {
		if self.max_n == 0 {
			return Err(ModelError::corrupt("max_n must be >= 1"));
		}

		// max_n comes from the file: compare lazily, never allocate from it
		if self.models.len() != self.max_n || !self.models.keys().copied().eq(1..=self.max_n) {
			return Err(ModelError::corrupt(format!(
				"expected orders 1..={}, found {:?}",
				self.max_n,
				self.models.keys().collect::<Vec<_>>()
			)));
		}

		let vocab: HashSet<char> = self.vocab.iter().copied().collect();
		if vocab.len() != self.vocab.len() {
			return Err(ModelError::corrupt("vocabulary has duplicate characters"));
		}

		for (n, contexts) in &self.models {
			for distribution in contexts.values() {
				for (c, count) in distribution.iter() {
					if count == 0 {
						return Err(ModelError::corrupt(format!("zero count for {c:?} in order {n}")));
					}
					if !vocab.contains(&c) {
						return Err(ModelError::corrupt(format!("{c:?} in order {n} is not in the vocabulary")));
					}
				}
			}
		}

		let mut unigrams = HashSet::new();
		for c in &self.top_unigrams {
			if !vocab.contains(c) || !unigrams.insert(*c) {
				return Err(ModelError::corrupt(format!("invalid top unigram {c:?}")));
			}
		}

		Ok(())
	}
}

impl NGramModel<BasicNormalizer> {
	/// Loads a model from `<work_dir>/model.sda` with the default normalizer.
	///
	/// # Errors
	/// - `ModelNotFound` if the file does not exist
	/// - `Io` / `Serialization` if it cannot be read or decoded
	/// - `Corrupt` if the decoded record breaks a model invariant
	pub fn load<P: AsRef<Path>>(work_dir: P) -> Result<Self> {
		Self::load_with_normalizer(work_dir, BasicNormalizer)
	}
}

impl<N: Normalizer> NGramModel<N> {
	/// Loads a model from `<work_dir>/model.sda`.
	///
	/// The whole record is decoded and validated before a model is built,
	/// so a failed load never yields partial state.
	pub fn load_with_normalizer<P: AsRef<Path>>(work_dir: P, normalizer: N) -> Result<Self> {
		let path = model_path(work_dir);
		if !path.exists() {
			return Err(ModelError::ModelNotFound { path });
		}

		let bytes = fs::read(&path)?;
		let record: ModelRecord = postcard::from_bytes(&bytes)?;
		record.validate()?;

		let mut models = BTreeMap::new();
		for (n, contexts) in record.models {
			let table = FrequencyTable::from_contexts(n, contexts).map_err(ModelError::corrupt)?;
			models.insert(n, table);
		}

		let mut config = ModelConfig::default();
		config.set_max_grams(record.max_n)?;
		config.set_unigram_fallback_size(record.top_unigrams.len());

		log::info!(
			"Loaded {}-gram model from {} ({} characters in vocabulary)",
			record.max_n,
			path.display(),
			record.vocab.len()
		);

		Ok(Self {
			config,
			models,
			top_unigrams: record.top_unigrams,
			vocab: record.vocab.into_iter().collect::<BTreeSet<char>>(),
			normalizer,
		})
	}

	/// Saves the learned state to `<work_dir>/model.sda`.
	///
	/// The blob is written to a temporary file first and renamed over the
	/// destination, so readers never observe a half-written model.
	///
	/// # Errors
	/// Returns an error if encoding fails or the directory is not writable.
	pub fn save<P: AsRef<Path>>(&self, work_dir: P) -> Result<PathBuf> {
		let path = model_path(work_dir);

		let record = ModelRecordRef {
			max_n: self.config.max_grams(),
			models: self.models.iter().map(|(n, table)| (*n, table.as_map())).collect(),
			top_unigrams: &self.top_unigrams,
			vocab: self.vocab.iter().copied().collect(),
		};
		let bytes = postcard::to_stdvec(&record)?;

		let tmp_path = path.with_extension("sda.tmp");
		fs::write(&tmp_path, &bytes)?;
		if let Err(e) = fs::rename(&tmp_path, &path) {
			let _ = fs::remove_file(&tmp_path);
			return Err(e.into());
		}

		log::info!("Saved model to {} ({} bytes)", path.display(), bytes.len());
		Ok(path)
	}
}
