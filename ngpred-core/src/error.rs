use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors surfaced by training, persistence and configuration.
///
/// Prediction never fails: missing contexts and unknown characters are
/// absorbed by the backoff cascade and the unigram fallback.
#[derive(Debug, Error)]
pub enum ModelError {
	/// I/O error while reading or writing a file.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// The persisted blob could not be encoded or decoded.
	#[error("serialization error: {0}")]
	Serialization(#[from] postcard::Error),

	/// No persisted model exists at the expected location.
	#[error("model not found: {path}")]
	ModelNotFound { path: PathBuf },

	/// The persisted record decoded but violates a model invariant.
	#[error("corrupt model: {reason}")]
	Corrupt { reason: String },

	/// A configuration value is out of range.
	#[error("invalid configuration: {reason}")]
	InvalidConfig { reason: String },
}

impl ModelError {
	/// Create a new corrupt model error.
	#[must_use]
	pub fn corrupt(reason: impl Into<String>) -> Self {
		Self::Corrupt { reason: reason.into() }
	}

	/// Create a new invalid configuration error.
	#[must_use]
	pub fn invalid_config(reason: impl Into<String>) -> Self {
		Self::InvalidConfig { reason: reason.into() }
	}
}
