use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the persisted model inside a working directory.
pub const MODEL_FILENAME: &str = "model.sda";

/// Reads one context (or record) per line.
///
/// Only the line terminator (`\n` / `\r\n`) is stripped: trailing spaces
/// are meaningful prediction context.
pub fn read_lines<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	Ok(fs::read_to_string(filename)?.lines().map(String::from).collect())
}

/// Writes one prediction per line.
pub fn write_predictions<P: AsRef<Path>>(predictions: &[String], filename: P) -> io::Result<()> {
	let mut writer = BufWriter::new(File::create(filename)?);
	for prediction in predictions {
		writeln!(writer, "{prediction}")?;
	}
	writer.flush()
}

/// Builds the model path inside a working directory.
///
/// Example:
/// `work` → `work/model.sda`
pub fn model_path<P: AsRef<Path>>(work_dir: P) -> PathBuf {
	work_dir.as_ref().join(MODEL_FILENAME)
}
