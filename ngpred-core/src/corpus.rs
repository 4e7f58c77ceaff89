use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::io::read_lines;
use crate::normalize::Normalizer;

/// Matches the text payload of every turn in a stringified conversation,
/// e.g. `[{'from': 'human', 'value': 'hi there'}, ...]`.
static VALUE_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?s)'value'\s*:\s*'(.*?)'").expect("valid value pattern"));

/// Number of conversations between two progress logs.
const PROGRESS_EVERY: usize = 1000;

/// Number of characters shown in the training text preview.
const PREVIEW_LEN: usize = 200;

/// Extracts every `'value'` payload of one conversation record, raw.
pub fn extract_values(record: &str) -> Vec<&str> {
	VALUE_PATTERN
		.captures_iter(record)
		.filter_map(|captures| captures.get(1))
		.map(|m| m.as_str())
		.collect()
}

/// Extracts and normalizes the texts of all records, one entry per turn.
pub fn normalize_conversations<S, N>(records: &[S], normalizer: &N) -> Vec<String>
where
	S: AsRef<str>,
	N: Normalizer,
{
	records
		.iter()
		.flat_map(|record| extract_values(record.as_ref()))
		.map(|text| normalizer.normalize(text))
		.collect()
}

/// Builds the flat training text: every normalized turn, each prefixed by a
/// single space, concatenated in record order.
pub fn build_training_text<S, N>(records: &[S], normalizer: &N) -> String
where
	S: AsRef<str>,
	N: Normalizer,
{
	let mut data = String::new();
	for (i, text) in normalize_conversations(records, normalizer).iter().enumerate() {
		data.push(' ');
		data.push_str(text);
		if i % PROGRESS_EVERY == 0 {
			log::info!("Conversation #{}", i);
		}
	}

	let preview: String = data.chars().take(PREVIEW_LEN).collect();
	log::info!("Normalized data preview: {:?}", preview);
	data
}

/// Reads a dataset file with one conversation record per line and builds
/// the training text from it.
///
/// # Errors
/// Returns an error if the file cannot be read (missing, not UTF-8).
pub fn load_training_text<P, N>(path: P, normalizer: &N) -> Result<String>
where
	P: AsRef<Path>,
	N: Normalizer,
{
	let records = read_lines(&path)?;
	log::info!("Loaded {} records from {}", records.len(), path.as_ref().display());
	Ok(build_training_text(&records, normalizer))
}
